use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Malformed frame dimensions: {0:?}")]
    MalformedDimensions(String),

    #[error("Invalid size: {0}")]
    InvalidSize(String),
}

pub type Result<T> = std::result::Result<T, Error>;
