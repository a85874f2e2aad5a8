use crate::error::{CompressionError, Result};
use crate::format::calculate_compression_ratio;
use crate::preview::PreviewHandle;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageReader, Limits};
use std::io::Cursor;
use std::sync::Arc;

/// One accepted file of the pending batch.
#[derive(Debug, Clone)]
pub struct SourceImage {
    raw_bytes: Arc<[u8]>,
    display_name: String,
    byte_size: u64,
    preview: PreviewHandle,
}

impl SourceImage {
    pub(crate) fn new(display_name: String, raw_bytes: Arc<[u8]>, preview: PreviewHandle) -> Self {
        Self {
            byte_size: raw_bytes.len() as u64,
            raw_bytes,
            display_name,
            preview,
        }
    }

    pub fn raw_bytes(&self) -> &[u8] {
        &self.raw_bytes
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    pub fn preview(&self) -> PreviewHandle {
        self.preview
    }
}

/// Re-encoded payload of one source image.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedResult {
    display_name: String,
    original_byte_size: u64,
    compressed_byte_size: u64,
    compression_ratio_percent: f64,
    width: u32,
    height: u32,
    encoded: Vec<u8>,
}

impl CompressedResult {
    pub fn new(
        display_name: impl Into<String>,
        original_byte_size: u64,
        (width, height): (u32, u32),
        encoded: Vec<u8>,
    ) -> Self {
        let compressed_byte_size = encoded.len() as u64;
        Self {
            display_name: display_name.into(),
            original_byte_size,
            compressed_byte_size,
            compression_ratio_percent: calculate_compression_ratio(
                original_byte_size,
                compressed_byte_size,
            ),
            width,
            height,
            encoded,
        }
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn original_byte_size(&self) -> u64 {
        self.original_byte_size
    }

    pub fn compressed_byte_size(&self) -> u64 {
        self.compressed_byte_size
    }

    /// Negative when re-encoding grew the file.
    pub fn compression_ratio_percent(&self) -> f64 {
        self.compression_ratio_percent
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }
}

/// Decodes raw file bytes into pixels, sniffing the format from the content.
///
/// Images wider or taller than `max_dimension` are refused from their header,
/// before any pixel buffer is allocated.
pub fn decode_image(bytes: &[u8], max_dimension: u32) -> Result<DynamicImage> {
    let reader = || ImageReader::new(Cursor::new(bytes)).with_guessed_format();

    // Unreadable headers fall through so the decoder reports the real error.
    if let Ok((width, height)) = reader()?.into_dimensions() {
        if width > max_dimension || height > max_dimension {
            return Err(CompressionError::InvalidDimensions(
                width,
                height,
                max_dimension,
            ));
        }
    }

    let mut limits = Limits::default();
    limits.max_image_width = Some(max_dimension);
    limits.max_image_height = Some(max_dimension);

    let mut reader = reader()?;
    reader.limits(limits);
    reader.decode().map_err(CompressionError::Decode)
}

/// Encodes pixels as baseline JPEG. Alpha is discarded.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    rgb.write_with_encoder(encoder)
        .map_err(CompressionError::Encode)?;
    Ok(buffer.into_inner())
}

/// Decode then re-encode one source at `quality`.
pub fn compress_source(
    source: &SourceImage,
    quality: u8,
    max_dimension: u32,
) -> Result<CompressedResult> {
    let img = decode_image(source.raw_bytes(), max_dimension)?;
    let dimensions = img.dimensions();
    let encoded = encode_jpeg(&img, quality)?;

    crate::verbose!(
        "{}: {}x{} {} -> {} bytes",
        source.display_name(),
        dimensions.0,
        dimensions.1,
        source.byte_size(),
        encoded.len()
    );

    Ok(CompressedResult::new(
        source.display_name(),
        source.byte_size(),
        dimensions,
        encoded,
    ))
}
