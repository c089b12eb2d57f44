pub mod accounts;
pub mod credentials;
pub mod error;
pub mod users;

pub use accounts::{AccountError, Accounts, LoginGrant};
pub use error::CoreError;
pub use users::{JsonFileBackend, MemoryBackend, UserBackend, UserRecord};
