//! Error types for the futures testnet client.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The exchange refused the request as a whole (bad symbol, margin, key...).
    #[error("APIError(code={code}): {message}")]
    Api {
        code: i64,
        message: String,
        status: Option<u16>,
    },

    /// The exchange refused the order because of its parameters.
    #[error("OrderError(code={code}): {message}")]
    OrderRejected { code: i64, message: String },

    /// Non-2xx reply that did not carry an exchange error body.
    #[error("Unexpected response ({status}): {body}")]
    UnexpectedResponse { status: u16, body: String },

    #[error("Signing error: {message}")]
    Signing { message: String },
}

impl Error {
    /// Binance error code carried by an exchange rejection, if any.
    pub fn code(&self) -> Option<i64> {
        match self {
            Error::Api { code, .. } | Error::OrderRejected { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
