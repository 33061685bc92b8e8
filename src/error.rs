//! Error types for selector compilation

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CompileError>;

/// Malformed selector text
///
/// Raised by the selector compiler, and by every traversal that was handed
/// selector text as a filter or boundary. Failures are never cached.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid selector {selector:?} at {position}: {reason}")]
pub struct CompileError {
    /// The full selector text that failed to compile
    pub selector: String,
    /// Byte offset of the offending token
    pub position: usize,
    /// What the parser expected or rejected
    pub reason: String,
}

impl CompileError {
    pub fn new(selector: &str, position: usize, reason: impl Into<String>) -> Self {
        CompileError {
            selector: selector.to_string(),
            position,
            reason: reason.into(),
        }
    }
}
