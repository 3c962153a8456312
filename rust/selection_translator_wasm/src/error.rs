use thiserror::Error;

pub const RATE_LIMITED_MESSAGE: &str = "Translation limit reached, please wait a moment...";
pub const FAILED_MESSAGE: &str = "Translation failed";
pub const NOT_FOUND_MESSAGE: &str = "Translation not found";

/// Why a translation did not produce text.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TranslateError {
    /// Backend answered 429. The cooldown has already been waited out.
    #[error("translation backend rate limited the request")]
    RateLimited,
    #[error("HTTP error! status: {0}")]
    Http(u16),
    #[error("network error: {0}")]
    Network(String),
    #[error("could not parse translation response: {0}")]
    Parse(String),
}

impl TranslateError {
    pub fn user_message(&self) -> &'static str {
        match self {
            TranslateError::RateLimited => RATE_LIMITED_MESSAGE,
            TranslateError::Http(_) | TranslateError::Network(_) | TranslateError::Parse(_) => {
                FAILED_MESSAGE
            }
        }
    }
}

/// Failure reported by a host transport before any HTTP status was seen.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<TransportError> for TranslateError {
    fn from(err: TransportError) -> Self {
        TranslateError::Network(err.0)
    }
}

/// Flattens a translation result into the text a tooltip shows.
pub fn display_text(result: Result<String, TranslateError>) -> String {
    match result {
        Ok(text) => text,
        Err(err) => err.user_message().to_string(),
    }
}
