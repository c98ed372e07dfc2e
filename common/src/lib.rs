pub mod config;
pub mod credentials;
pub mod error;
pub mod kdf;
pub mod messages;
pub mod models;
pub mod session;
pub mod store;
pub mod utils;

pub use self::config::*;
pub use credentials::CredentialStore;
pub use error::*;
pub use kdf::Kdf;
pub use messages::*;
pub use session::{Access, SessionBackend, SessionGate};
pub use utils::*;
