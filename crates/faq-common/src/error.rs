/// Error types shared across the FAQ crates.
///
/// These errors represent failures in host integrations (clipboard, page URL) that
/// never stop rendering. Application-specific errors are defined in each binary
/// crate and wrap `CommonError` via `#[from]`.

#[derive(Debug, thiserror::Error)]
pub enum CommonError {
    #[error("clipboard error: {0}")]
    Clipboard(String),

    #[error("clipboard unavailable")]
    ClipboardUnavailable,

    #[error("malformed url: {0}")]
    Url(String),
}
