//! Error types for the pending permit container.

use thiserror::Error;

/// Internal-consistency failures of the permit container.
///
/// Both variants indicate a bookkeeping bug in the surrounding loader (a
/// declared permit count that disagrees with the permits supplied); they
/// are never expected from a correct caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PermitError {
    /// Index past the live permit count.
    #[error("permit index {index} out of range for container of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Append into a container whose fixed backing size is already full.
    #[error("permit container capacity {capacity} exceeded")]
    CapacityExceeded { capacity: usize },
}

/// Result type for permit container operations.
pub type Result<T> = std::result::Result<T, PermitError>;
