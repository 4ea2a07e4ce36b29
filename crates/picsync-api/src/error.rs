use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API key contains characters that cannot be sent as a header")]
    InvalidApiKey,
}
