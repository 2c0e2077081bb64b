/// Errors from `TodoClient`. A 404 is kept apart from other statuses.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server returned 404. Carries the `error` field of the JSON body
    /// when there is one.
    #[error("not found: {}", .0.as_deref().unwrap_or("no message"))]
    NotFound(Option<String>),

    #[error("HTTP {status}: {body}")]
    HttpError { status: u16, body: String },

    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    #[error("serialization failed: {0}")]
    SerializationError(String),
}
