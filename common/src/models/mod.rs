pub mod counter;
pub mod session;
pub mod user;

pub use counter::CounterKind;
pub use session::{SessionId, SessionState};
pub use user::UserRecord;
