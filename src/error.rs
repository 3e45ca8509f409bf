use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeilaoError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("event stream closed by server")]
    StreamClosed,

    #[error("maximum reconnection attempts exceeded")]
    MaxReconnectsExceeded,

    #[error("metrics server error: {0}")]
    Metrics(String),
}
