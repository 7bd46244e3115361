use thiserror::Error;

/// Failures surfaced by repository implementations
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// A uniqueness constraint rejected the write
    #[error("conflict: {0}")]
    Conflict(String),

    /// Transport or query failure in the underlying store
    #[error("database error: {0}")]
    Database(String),

    /// Stored data could not be mapped back into the domain
    #[error("corrupt record: {0}")]
    Corrupt(String),
}
