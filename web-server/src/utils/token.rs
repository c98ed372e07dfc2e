// web-server/src/utils/token.rs
use rand::distributions::Alphanumeric;
use rand::rngs::OsRng;
use rand::Rng;

/// 43 alphanumerics carry a little over 256 bits
pub const SESSION_ID_LENGTH: usize = 43;

/// Fresh session identifier drawn straight from the OS random source
pub fn new_session_id() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(SESSION_ID_LENGTH)
        .map(char::from)
        .collect()
}
