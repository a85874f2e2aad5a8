//! Export of compressed results as single files or one zip archive.

use crate::compress::CompressedResult;
use crate::constants::{
    ARCHIVE_FILE_NAME, ARCHIVE_MIME_TYPE, COMPRESSED_PREFIX, COMPRESSED_SUFFIX,
    CONVERTED_ARCHIVE_FILE_NAME, CROPPED_SUFFIX, OUTPUT_EXTENSION, OUTPUT_MIME_TYPE,
};
use crate::error::{CompressionError, Result};
use std::collections::HashSet;
use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// How an exported file is named after its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntryNaming {
    /// `photo.png` -> `photo_compressed.png`
    #[default]
    Suffixed,
    /// `photo.png` -> `compressed_photo.png`
    Prefixed,
    /// `photo.png` -> `photo.jpg`, for the format converter
    Converted,
    /// `photo.png` -> `photo_cropped.png`
    Cropped,
}

impl EntryNaming {
    /// Name of the archive that bundles entries named this way.
    pub fn archive_file_name(&self) -> &'static str {
        match self {
            EntryNaming::Converted => CONVERTED_ARCHIVE_FILE_NAME,
            _ => ARCHIVE_FILE_NAME,
        }
    }
}

/// A downloadable payload: file name, MIME type and raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub data: Vec<u8>,
}

impl Artifact {
    /// Writes the artifact into `dir`, creating the directory if needed.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)
            .map_err(|_| CompressionError::DirectoryCreationFailed(dir.to_path_buf()))?;
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.data)?;
        Ok(path)
    }
}

/// File name of the exported copy of `display_name`.
///
/// The original extension is kept even though the payload is JPEG; names
/// without an extension get `jpg`. Path separators are replaced so the name
/// is always a single archive entry.
pub fn output_file_name(display_name: &str, naming: EntryNaming) -> String {
    let safe_name = display_name.replace(['/', '\\'], "_");
    match naming {
        EntryNaming::Prefixed => format!("{}{}", COMPRESSED_PREFIX, safe_name),
        EntryNaming::Suffixed => with_suffix(&safe_name, COMPRESSED_SUFFIX),
        EntryNaming::Cropped => with_suffix(&safe_name, CROPPED_SUFFIX),
        EntryNaming::Converted => {
            let (stem, _) = split_extension(&safe_name);
            format!("{}.{}", stem, OUTPUT_EXTENSION)
        }
    }
}

fn with_suffix(name: &str, suffix: &str) -> String {
    let (stem, extension) = split_extension(name);
    format!(
        "{}{}.{}",
        stem,
        suffix,
        extension.unwrap_or(OUTPUT_EXTENSION)
    )
}

/// Splits `name` into stem and extension. Trailing dots belong to neither.
fn split_extension(name: &str) -> (&str, Option<&str>) {
    let trimmed = name.trim_end_matches('.');
    let name = if trimmed.is_empty() { name } else { trimmed };
    match name.rfind('.') {
        Some(dot) if dot > 0 && dot + 1 < name.len() => (&name[..dot], Some(&name[dot + 1..])),
        _ => (name, None),
    }
}

/// Appends `_2`, `_3`, ... to the stem until the name is unused.
fn unique_name(name: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.clone()) {
        return name;
    }

    let (stem, extension) = split_extension(&name);
    let mut counter = 2;
    loop {
        let candidate = match extension {
            Some(ext) => format!("{}_{}.{}", stem, counter, ext),
            None => format!("{}_{}", stem, counter),
        };
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        counter += 1;
    }
}

/// The single-file download of one result.
pub fn download_one(result: &CompressedResult, naming: EntryNaming) -> Artifact {
    Artifact {
        file_name: output_file_name(result.display_name(), naming),
        mime_type: OUTPUT_MIME_TYPE,
        data: result.encoded().to_vec(),
    }
}

/// Single-file downloads for a whole result set, with names made unique so
/// they can share one directory.
pub fn download_each<'a, I>(results: I, naming: EntryNaming) -> Vec<Artifact>
where
    I: IntoIterator<Item = &'a CompressedResult>,
{
    let mut taken = HashSet::new();
    results
        .into_iter()
        .map(|result| {
            let mut artifact = download_one(result, naming);
            artifact.file_name = unique_name(artifact.file_name, &mut taken);
            artifact
        })
        .collect()
}

/// Packs every result into one zip, one stored entry each.
///
/// The archive is `converted_images.zip` for converter naming and
/// `compressed_images.zip` otherwise.
///
/// Entry names follow `naming` and are made unique. An empty result set is
/// refused rather than producing an empty archive.
pub fn download_all_as_archive<'a, I>(results: I, naming: EntryNaming) -> Result<Artifact>
where
    I: IntoIterator<Item = &'a CompressedResult>,
{
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let mut taken = HashSet::new();

    for result in results {
        let entry_name = unique_name(output_file_name(result.display_name(), naming), &mut taken);
        crate::verbose!("Adding {} ({} bytes)", entry_name, result.compressed_byte_size());
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        zip.start_file(entry_name, options)?;
        zip.write_all(result.encoded()).map_err(ZipError::Io)?;
    }

    if taken.is_empty() {
        return Err(CompressionError::NothingToExport);
    }

    let data = zip.finish()?.into_inner();
    Ok(Artifact {
        file_name: naming.archive_file_name().to_string(),
        mime_type: ARCHIVE_MIME_TYPE,
        data,
    })
}
