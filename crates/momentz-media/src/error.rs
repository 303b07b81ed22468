use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Please select an image file (got {0})")]
    UnsupportedType(String),

    #[error("Image too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("Could not decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Could not encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Invalid quality {0}: expected a value in (0, 1]")]
    InvalidQuality(f32),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image worker failed: {0}")]
    Worker(String),
}
