//! Error types for the simulation core.

use thiserror::Error;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all simulation errors.
///
/// Production itself never errors: `produce` reports failure through its
/// boolean return and leaves the world untouched. These errors cover the
/// surrounding machinery - data parsing, snapshots, actor lookup.
#[derive(Debug, Error)]
pub enum GameError {
    /// Data file parsing error.
    #[error("Failed to parse {context}: {message}")]
    DataParse {
        /// What was being parsed (e.g. a file name or data section).
        context: String,
        /// Error message from the parser.
        message: String,
    },

    /// Invalid actor reference.
    #[error("Actor not found: {0}")]
    ActorNotFound(u64),

    /// World snapshot serialization or restore failure.
    #[error("Snapshot failed: {0}")]
    Snapshot(String),

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
