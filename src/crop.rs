//! Cutting a rectangle out of one image and re-encoding it as JPEG.

use crate::compress::{decode_image, encode_jpeg, CompressedResult, SourceImage};
use crate::error::{CompressionError, Result};
use image::GenericImageView;
use std::fmt;
use std::str::FromStr;

/// Crop area in source pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Centered area covering `fraction` of each side.
    pub fn centered(width: u32, height: u32, fraction: f64) -> Self {
        let side = |full: u32| ((full as f64 * fraction).round() as u32).clamp(1, full.max(1));
        let (w, h) = (side(width), side(height));
        Self::new(width.saturating_sub(w) / 2, height.saturating_sub(h) / 2, w, h)
    }

    /// The part of this area inside a `width`x`height` image, or `None` when
    /// they do not overlap.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<Self> {
        if self.width == 0 || self.height == 0 || self.x >= width || self.y >= height {
            return None;
        }
        Some(Self::new(
            self.x,
            self.y,
            self.width.min(width - self.x),
            self.height.min(height - self.y),
        ))
    }
}

impl fmt::Display for CropRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

impl FromStr for CropRect {
    type Err = String;

    /// Parses `X,Y,WIDTH,HEIGHT`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|part| part.trim().parse::<u32>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| format!("invalid crop area '{}': {}", s, e))?;

        match parts.as_slice() {
            &[x, y, width, height] if width > 0 && height > 0 => {
                Ok(Self::new(x, y, width, height))
            }
            &[_, _, _, _] => Err(format!("crop area '{}' has zero width or height", s)),
            _ => Err(format!("expected X,Y,WIDTH,HEIGHT, got '{}'", s)),
        }
    }
}

/// Crops one source and re-encodes the area at `quality`.
///
/// Without an explicit area the centered default covers `default_fraction`
/// of each side. An area reaching past the image edge is clipped to it.
pub fn crop_source(
    source: &SourceImage,
    rect: Option<CropRect>,
    default_fraction: f64,
    quality: u8,
    max_dimension: u32,
) -> Result<CompressedResult> {
    let img = decode_image(source.raw_bytes(), max_dimension)?;
    let (width, height) = img.dimensions();

    let requested = rect.unwrap_or_else(|| CropRect::centered(width, height, default_fraction));
    let area = requested
        .clamp_to(width, height)
        .ok_or_else(|| CompressionError::InvalidCrop(requested.to_string(), width, height))?;

    let cropped = img.crop_imm(area.x, area.y, area.width, area.height);
    let encoded = encode_jpeg(&cropped, quality)?;

    crate::verbose!(
        "{}: cropped {}x{} to {} ({} bytes)",
        source.display_name(),
        width,
        height,
        area,
        encoded.len()
    );

    Ok(CompressedResult::new(
        source.display_name(),
        source.byte_size(),
        (area.width, area.height),
        encoded,
    ))
}
