use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("GET {url} failed with status {status}")]
    Http { url: String, status: u16 },
    #[error("Pagination error: {0}")]
    Pagination(String),
    #[error("Payload error: {0}")]
    Payload(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
