use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode JPEG: {0}")]
    Encode(#[source] image::ImageError),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Nothing to export: the batch has no compressed results")]
    NothingToExport,

    #[error("Invalid quality value: {0}. Must be between 1 and 100")]
    InvalidQuality(u8),

    #[error("Invalid image dimensions: {0}x{1}. Maximum allowed: {2}x{2}")]
    InvalidDimensions(u32, u32, u32),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to create output directory: {0}")]
    DirectoryCreationFailed(PathBuf),

    #[error("No image files found in input path: {0}")]
    NoImageFilesFound(String),

    #[error("Walkdir error: {0}")]
    WalkdirError(#[from] walkdir::Error),

    #[error("Operation not allowed while batch is {0}")]
    InvalidState(&'static str),

    #[error("No pending image at index {0} (batch has {1})")]
    IndexOutOfRange(usize, usize),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),

    #[error("Worker panicked: {0}")]
    Panicked(String),

    #[error("Crop area {0} does not overlap the {1}x{2} image")]
    InvalidCrop(String, u32, u32),

    #[error("Memory limit exceeded: largest image needs ~{0}MB to decode, maximum allowed {1}MB")]
    BatchMemoryLimitExceeded(u64, u64),

    #[error("Batch file count limit exceeded: {0} files, maximum allowed {1}")]
    BatchFileLimitExceeded(usize, usize),

    #[error(
        "Insufficient available memory: largest image requires {0}MB, but only {1}MB available"
    )]
    InsufficientMemory(u64, u64),
}

pub type Result<T> = std::result::Result<T, CompressionError>;
