//! Stable error codes shared by every component error type.

/// Machine-readable error classification, logged next to the error text.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    /// Informational only. Nothing in the core retries automatically.
    fn retryable(&self) -> bool {
        false
    }
}
