pub const DEFAULT_QUALITY: u8 = 60;
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;

/// Per-file intake limit (100 MiB)
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;
pub const MAX_IMAGE_DIMENSION: u32 = 16_384;

pub const MAX_BATCH_FILES: usize = 1_000;
pub const MAX_BATCH_MEMORY_MIB: u64 = 8 * 1024;
pub const MIN_AVAILABLE_MEMORY_MIB: u64 = 64;
pub const LARGE_IMAGE_THRESHOLD_MIB: f64 = 64.0;
pub const MAX_CONCURRENT_LARGE_IMAGES: usize = 2;

pub const ACCEPTED_MIME_PREFIX: &str = "image/";
pub const OUTPUT_MIME_TYPE: &str = "image/jpeg";
pub const OUTPUT_EXTENSION: &str = "jpg";
pub const ARCHIVE_MIME_TYPE: &str = "application/zip";
pub const ARCHIVE_FILE_NAME: &str = "compressed_images.zip";
pub const CONVERTED_ARCHIVE_FILE_NAME: &str = "converted_images.zip";
pub const COMPRESSED_SUFFIX: &str = "_compressed";
pub const COMPRESSED_PREFIX: &str = "compressed_";
pub const CROPPED_SUFFIX: &str = "_cropped";

/// Fixed quality of the format converter
pub const CONVERT_QUALITY: u8 = 90;
/// Browsers encode JPEG at 0.92 when no quality is given
pub const CROP_QUALITY: u8 = 92;
/// Share of each side covered by the default crop area
pub const DEFAULT_CROP_FRACTION: f64 = 0.8;

pub const SIZE_UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

/// Camera raw and HEIF types that browsers report as `image/*` but generic
/// extension tables tend to miss.
pub const EXTRA_IMAGE_MIME_TYPES: &[(&str, &str)] = &[
    ("heic", "image/heic"),
    ("heif", "image/heif"),
    ("dng", "image/x-adobe-dng"),
    ("cr2", "image/x-canon-cr2"),
    ("nef", "image/x-nikon-nef"),
    ("arw", "image/x-sony-arw"),
];

pub const PROGRESS_SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

// Common output message prefixes
pub const ORIGINAL_SIZE_PREFIX: &str = "📊 Original size:";
pub const COMPRESSED_SIZE_PREFIX: &str = "📈 Compressed size:";
pub const COMPRESSION_RATIO_PREFIX: &str = "🎯 Compression ratio:";
pub const SUCCESS_PREFIX: &str = "✅";
pub const INFO_PREFIX: &str = "📋";
