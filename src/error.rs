/// Errors raised at the wire boundary.
///
/// Editing and integration never fail: out-of-range edits are clamped or
/// dropped, operations with missing dependencies are deferred and replays
/// are ignored. Only decoding foreign input can go wrong.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The JSON payload could not be encoded or decoded.
    #[cfg(feature = "serde")]
    #[error("malformed operation payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload decoded but describes an operation no replica can emit.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

/// Result alias used by the wire helpers.
pub type Result<T> = core::result::Result<T, Error>;
