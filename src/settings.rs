use crate::constants::{
    DEFAULT_QUALITY, MAX_BATCH_FILES, MAX_BATCH_MEMORY_MIB, MAX_FILE_SIZE, MAX_IMAGE_DIMENSION,
    MAX_QUALITY, MIN_QUALITY,
};
use crate::error::{CompressionError, Result};

/// Quality applied uniformly to every image of a compression run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionSettings {
    quality: u8,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
        }
    }
}

impl CompressionSettings {
    /// Strict constructor for callers that want out-of-range input reported.
    pub fn new(quality: Option<u8>) -> Result<Self> {
        let quality = quality.unwrap_or(DEFAULT_QUALITY);
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            return Err(CompressionError::InvalidQuality(quality));
        }
        Ok(Self { quality })
    }

    /// Lenient constructor: any integer is clamped into 1..=100.
    pub fn clamped(percent: i64) -> Self {
        let quality = percent.clamp(MIN_QUALITY as i64, MAX_QUALITY as i64) as u8;
        Self { quality }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn set_quality(&mut self, percent: i64) -> u8 {
        *self = Self::clamped(percent);
        self.quality
    }
}

/// Resource limits enforced at intake and before a batch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    pub max_file_size: u64,
    pub max_dimension: u32,
    pub max_files: usize,
    pub max_memory_mib: u64,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            max_dimension: MAX_IMAGE_DIMENSION,
            max_files: MAX_BATCH_FILES,
            max_memory_mib: MAX_BATCH_MEMORY_MIB,
        }
    }
}
