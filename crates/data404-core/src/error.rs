use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("user store parse error in {}: {message}", .path.display())]
    StoreParse { path: PathBuf, message: String },

    #[error("user store encode error: {0}")]
    StoreEncode(String),

    #[error("user store lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
