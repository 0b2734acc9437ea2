use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to parse map data: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, MapError>;
