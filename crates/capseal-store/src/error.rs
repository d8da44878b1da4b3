//! Error types for the artifact store.

use thiserror::Error;

/// Errors surfaced by artifact allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The artifact byte budget is exhausted.
    ///
    /// Fatal to the caller: the store never truncates a blob to fit.
    #[error("artifact storage exhausted: {requested} bytes requested, {remaining} remaining")]
    Exhausted { requested: usize, remaining: usize },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
