use thiserror::Error;

/// Fatal rendering errors.
#[derive(Debug, Error)]
pub enum Error {
    /// A token or value about to be interpolated into generated source
    /// contains characters that could break out of the target syntax.
    /// Rendering aborts rather than emitting the text.
    #[error("untrusted metadata: expected a clean token, received: {value}")]
    UntrustedMetadata { value: String },
}
