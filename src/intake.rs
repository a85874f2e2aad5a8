use crate::constants::{ACCEPTED_MIME_PREFIX, EXTRA_IMAGE_MIME_TYPES};
use crate::error::{CompressionError, Result};
use crate::settings::BatchLimits;
use glob::glob;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file handed to the workflow by the intake control, before filtering.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub display_name: String,
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl IncomingFile {
    /// Builds an incoming file, deriving the MIME type from the name's
    /// extension.
    pub fn new(display_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let display_name = display_name.into();
        let mime_type = mime_type_for_name(&display_name).map(str::to_string);
        Self {
            display_name,
            mime_type,
            bytes,
        }
    }

    pub fn with_mime_type(mut self, mime_type: Option<&str>) -> Self {
        self.mime_type = mime_type.map(str::to_string);
        self
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CompressionError::FileNotFound(path.to_path_buf()));
        }
        let bytes = fs::read(path)?;
        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Ok(Self::new(display_name, bytes))
    }

    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    NotAnImage(Option<String>),
    TooLarge(u64, u64),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::NotAnImage(Some(mime)) => write!(f, "not an image ({})", mime),
            RejectReason::NotAnImage(None) => write!(f, "not an image (unknown type)"),
            RejectReason::TooLarge(size, max) => {
                write!(f, "file too large ({} bytes, maximum {} bytes)", size, max)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    pub display_name: String,
    pub reason: RejectReason,
}

/// MIME type a browser would report for this file name.
///
/// Anything tagged `image/*` is reported even when no decoder exists for it;
/// those files are accepted at intake and fail at decode time instead.
pub fn mime_type_for_name(name: &str) -> Option<&'static str> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    EXTRA_IMAGE_MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|&(_, mime)| mime)
        .or_else(|| mime_guess::from_ext(&ext).first_raw())
}

/// Whether a path on disk would pass the `image/*` filter.
pub fn is_image_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| accepts_mime(mime_type_for_name(name)))
        .unwrap_or(false)
}

/// The `image/*` filter of the intake control.
pub fn accepts_mime(mime_type: Option<&str>) -> bool {
    mime_type
        .map(|mime| mime.to_ascii_lowercase().starts_with(ACCEPTED_MIME_PREFIX))
        .unwrap_or(false)
}

/// Splits incoming files into accepted images and rejected files, keeping
/// the relative order of both.
pub fn partition_incoming(
    files: Vec<IncomingFile>,
    limits: &BatchLimits,
) -> (Vec<IncomingFile>, Vec<RejectedFile>) {
    let mut accepted = Vec::with_capacity(files.len());
    let mut rejected = Vec::new();

    for file in files {
        if !accepts_mime(file.mime_type.as_deref()) {
            rejected.push(RejectedFile {
                reason: RejectReason::NotAnImage(file.mime_type.clone()),
                display_name: file.display_name,
            });
        } else if file.byte_size() > limits.max_file_size {
            rejected.push(RejectedFile {
                reason: RejectReason::TooLarge(file.byte_size(), limits.max_file_size),
                display_name: file.display_name,
            });
        } else {
            accepted.push(file);
        }
    }

    (accepted, rejected)
}

/// Resolves CLI inputs (files, directories, glob patterns) to file paths.
///
/// Explicit files are returned as-is so the MIME filter can report them;
/// directory and glob matches are pre-filtered by image extension.
pub fn collect_input_paths(inputs: &[String], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for input in inputs {
        let found = collect_image_files(input, recursive)?;
        if found.is_empty() {
            crate::warn!("No image files found in {}", input);
        }
        paths.extend(found);
    }
    Ok(paths)
}

pub fn collect_image_files(input: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let mut image_files = Vec::new();
    let input_path = Path::new(input);

    if input_path.is_file() {
        image_files.push(input_path.to_path_buf());
    } else if input_path.is_dir() {
        let walker = if recursive {
            WalkDir::new(input_path).into_iter()
        } else {
            WalkDir::new(input_path).max_depth(1).into_iter()
        };

        let visible = |e: &walkdir::DirEntry| {
            e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.')
        };
        for entry in walker.filter_entry(visible) {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && is_image_file(path) {
                image_files.push(path.to_path_buf());
            }
        }
        image_files.sort();
    } else if let Ok(glob_pattern) = glob(input) {
        for entry in glob_pattern.flatten() {
            if entry.is_file() && is_image_file(&entry) {
                image_files.push(entry);
            }
        }
    } else {
        return Err(CompressionError::NoImageFilesFound(input.to_string()));
    }

    Ok(image_files)
}

/// Reads every path into an `IncomingFile`.
pub fn read_incoming(paths: &[PathBuf]) -> Result<Vec<IncomingFile>> {
    paths.iter().map(|path| IncomingFile::from_path(path)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_mime_type_for_name() {
        assert_eq!(mime_type_for_name("photo.jpg"), Some("image/jpeg"));
        assert_eq!(mime_type_for_name("photo.JPEG"), Some("image/jpeg"));
        assert_eq!(mime_type_for_name("icon.png"), Some("image/png"));
        assert_eq!(mime_type_for_name("anim.gif"), Some("image/gif"));
        assert_eq!(mime_type_for_name("README"), None);
    }

    #[test]
    fn test_mime_type_for_browser_image_types() {
        assert_eq!(mime_type_for_name("logo.svg"), Some("image/svg+xml"));
        assert_eq!(mime_type_for_name("phone.heic"), Some("image/heic"));
        assert_eq!(mime_type_for_name("phone.HEIC"), Some("image/heic"));
        assert_eq!(mime_type_for_name("raw.dng"), Some("image/x-adobe-dng"));
        assert_eq!(mime_type_for_name("raw.nef"), Some("image/x-nikon-nef"));
        assert_eq!(mime_type_for_name("notes.txt"), Some("text/plain"));
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("test.jpg")));
        assert!(is_image_file(Path::new("test.JPEG")));
        assert!(is_image_file(Path::new("test.png")));
        assert!(is_image_file(Path::new("test.webp")));
        assert!(is_image_file(Path::new("test.bmp")));
        assert!(is_image_file(Path::new("test.tif")));
        assert!(is_image_file(Path::new("test.gif")));
        assert!(is_image_file(Path::new("test.svg")));
        assert!(is_image_file(Path::new("dir/test.heic")));

        assert!(!is_image_file(Path::new("test.txt")));
        assert!(!is_image_file(Path::new("test")));
        assert!(!is_image_file(Path::new("test.doc")));
    }

    #[test]
    fn test_svg_and_heic_pass_intake() {
        let files = vec![
            IncomingFile::new("logo.svg", b"<svg/>".to_vec()),
            IncomingFile::new("phone.heic", vec![0; 16]),
        ];

        let (accepted, rejected) = partition_incoming(files, &BatchLimits::default());
        assert_eq!(accepted.len(), 2);
        assert!(rejected.is_empty());
        assert_eq!(accepted[1].mime_type.as_deref(), Some("image/heic"));
    }

    #[test]
    fn test_accepts_mime() {
        assert!(accepts_mime(Some("image/jpeg")));
        assert!(accepts_mime(Some("image/svg+xml")));
        assert!(accepts_mime(Some("IMAGE/PNG")));
        assert!(!accepts_mime(Some("text/plain")));
        assert!(!accepts_mime(Some("application/pdf")));
        assert!(!accepts_mime(None));
    }

    #[test]
    fn test_partition_incoming() {
        let files = vec![
            IncomingFile::new("a.jpg", vec![1, 2, 3]),
            IncomingFile::new("notes.txt", vec![4]),
            IncomingFile::new("b.png", vec![5]),
            IncomingFile::new("blob", vec![6]).with_mime_type(Some("application/octet-stream")),
        ];

        let (accepted, rejected) = partition_incoming(files, &BatchLimits::default());

        let names: Vec<_> = accepted.iter().map(|f| f.display_name.as_str()).collect();
        assert_eq!(names, ["a.jpg", "b.png"]);
        assert_eq!(rejected.len(), 2);
        assert_eq!(rejected[0].display_name, "notes.txt");
        assert_eq!(
            rejected[0].reason,
            RejectReason::NotAnImage(Some("text/plain".to_string()))
        );
        assert_eq!(
            rejected[1].reason,
            RejectReason::NotAnImage(Some("application/octet-stream".to_string()))
        );
    }

    #[test]
    fn test_partition_rejects_oversized() {
        let limits = BatchLimits {
            max_file_size: 2,
            ..BatchLimits::default()
        };
        let files = vec![IncomingFile::new("big.jpg", vec![0; 3])];

        let (accepted, rejected) = partition_incoming(files, &limits);
        assert!(accepted.is_empty());
        assert_eq!(rejected[0].reason, RejectReason::TooLarge(3, 2));
    }

    #[test]
    fn test_from_path_not_found() {
        let result = IncomingFile::from_path(Path::new("nonexistent.jpg"));
        assert!(matches!(result, Err(CompressionError::FileNotFound(_))));
    }

    #[test]
    fn test_from_path_reads_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("shot.png");
        File::create(&path).unwrap().write_all(b"data").unwrap();

        let file = IncomingFile::from_path(&path).unwrap();
        assert_eq!(file.display_name, "shot.png");
        assert_eq!(file.mime_type.as_deref(), Some("image/png"));
        assert_eq!(file.bytes, b"data");
    }

    #[test]
    fn test_collect_image_files_single_file() {
        let temp_dir = TempDir::new().unwrap();
        let test_file = temp_dir.path().join("notes.txt");
        File::create(&test_file).unwrap();

        let files = collect_image_files(&test_file.to_string_lossy(), false).unwrap();
        assert_eq!(files, vec![test_file]);
    }

    #[test]
    fn test_collect_image_files_directory() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("b.jpg")).unwrap();
        File::create(temp_dir.path().join("a.png")).unwrap();
        File::create(temp_dir.path().join("not_image.txt")).unwrap();
        File::create(temp_dir.path().join(".hidden.jpg")).unwrap();

        let files = collect_image_files(&temp_dir.path().to_string_lossy(), false).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.png", "b.jpg"]);
    }

    #[test]
    fn test_collect_image_files_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("subdir");
        std::fs::create_dir(&subdir).unwrap();
        File::create(temp_dir.path().join("test1.jpg")).unwrap();
        File::create(subdir.join("test2.png")).unwrap();

        let flat = collect_image_files(&temp_dir.path().to_string_lossy(), false).unwrap();
        assert_eq!(flat.len(), 1);

        let deep = collect_image_files(&temp_dir.path().to_string_lossy(), true).unwrap();
        assert_eq!(deep.len(), 2);
    }

    #[test]
    fn test_collect_image_files_glob_pattern() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("test1.jpg")).unwrap();
        File::create(temp_dir.path().join("test2.png")).unwrap();
        File::create(temp_dir.path().join("other.txt")).unwrap();

        let pattern = format!("{}/*.jpg", temp_dir.path().to_string_lossy());
        let files = collect_image_files(&pattern, false).unwrap();
        assert_eq!(files.len(), 1);
    }
}
