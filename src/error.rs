#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("invalid username: {0}")]
    InvalidUsername(String),
    #[error("token bundle error: {0}")]
    TokenBundle(String),
    #[error("claims error: {0}")]
    Claims(#[from] serde_json::Error),
}
