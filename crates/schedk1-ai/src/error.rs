use thiserror::Error;

/// Failure to reach the model or to read its response envelope.
#[derive(Error, Debug)]
pub enum TransportError {
    #[cfg(feature = "http")]
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("transport error: {0}")]
    Other(String),
}

/// The model answered, but the answer could not be turned into fields.
#[derive(Error, Debug)]
pub enum ContentError {
    #[error("response has no message content")]
    MissingContent,
    #[error("response is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),
    #[error("required field {0} is missing")]
    MissingField(String),
    #[error("field {field} has invalid value: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("extraction failed after {attempts} attempt(s): {source}")]
    Transport {
        attempts: u32,
        #[source]
        source: TransportError,
    },
}
