use thiserror::Error;

/// Errors returned by credit-pay operations.
#[derive(Debug, Error)]
pub enum CreditPayError {
    #[error("config error: {0}")]
    Config(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("ambiguous sign params: {0}")]
    AmbiguousParams(String),

    #[error("http error: {0}")]
    Http(String),

    #[error("gateway rejected request ({status}): {message}")]
    Gateway { status: u16, message: String },

    #[error("failed to decode gateway response: {0}")]
    Decode(String),

    #[error("invalid callback: {0}")]
    InvalidCallback(String),

    #[error("signature mismatch")]
    SignatureMismatch,

    #[error("completion trigger failed: {0}")]
    Trigger(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}
