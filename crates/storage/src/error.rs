/// All errors that can be returned by a StateStore implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A backend-specific storage error (serialization, lock poisoning, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}
