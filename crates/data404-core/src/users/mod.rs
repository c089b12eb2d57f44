//! User records and the storage backends that hold them.
//!
//! [`UserBackend`] is the seam between account logic and persistence:
//! [`JsonFileBackend`] keeps every record in one JSON document on disk,
//! [`MemoryBackend`] keeps them in a map for tests and ephemeral runs.

mod backend;
mod json_file;
mod memory;
mod types;

pub use backend::UserBackend;
pub use json_file::JsonFileBackend;
pub use memory::MemoryBackend;
pub use types::UserRecord;
