use crate::batch::{estimate_image_memory_usage, BatchSession};
use crate::compress::SourceImage;
use crate::constants::INFO_PREFIX;
use crate::format::format_file_size;
use image::{ImageFormat, ImageReader};
use std::io::Cursor;

/// What the pending view shows for one source, read from the header only.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    pub index: usize,
    pub display_name: String,
    pub byte_size: u64,
    pub format: Option<ImageFormat>,
    pub dimensions: Option<(u32, u32)>,
    pub estimated_memory_mib: f64,
}

impl SourceInfo {
    pub fn from_source(index: usize, source: &SourceImage) -> Self {
        let reader = ImageReader::new(Cursor::new(source.raw_bytes())).with_guessed_format();
        let format = reader.as_ref().ok().and_then(|r| r.format());
        let dimensions = reader.ok().and_then(|r| r.into_dimensions().ok());

        Self {
            index,
            display_name: source.display_name().to_string(),
            byte_size: source.byte_size(),
            format,
            dimensions,
            estimated_memory_mib: estimate_image_memory_usage(
                source.byte_size(),
                source.display_name(),
            ),
        }
    }

    /// Quality range worth trying for a file of this size.
    pub fn suggested_quality(&self) -> (u8, u8) {
        if self.byte_size > 5 * 1024 * 1024 {
            (60, 80)
        } else if self.byte_size > 1024 * 1024 {
            (70, 85)
        } else {
            (85, 95)
        }
    }
}

pub fn inspect_batch(session: &BatchSession) -> Vec<SourceInfo> {
    session
        .sources()
        .iter()
        .enumerate()
        .map(|(index, source)| SourceInfo::from_source(index, source))
        .collect()
}

pub fn print_source_info(infos: &[SourceInfo]) {
    println!("{} Pending images: {}", INFO_PREFIX, infos.len());
    for info in infos {
        let dimensions = info
            .dimensions
            .map(|(w, h)| format!("{}x{}", w, h))
            .unwrap_or_else(|| "unreadable".to_string());
        let format = info
            .format
            .map(|f| f.to_mime_type())
            .unwrap_or("unknown");
        let (low, high) = info.suggested_quality();

        println!(
            "  [{}] {} - {} ({}), {}, ~{:.2} MiB decoded, suggested quality {}-{}",
            info.index,
            info.display_name,
            format_file_size(info.byte_size),
            format,
            dimensions,
            info.estimated_memory_mib,
            low,
            high
        );
    }

    let total: u64 = infos.iter().map(|i| i.byte_size).sum();
    println!("  📦 Total: {}", format_file_size(total));
}
