pub mod batch;
pub mod cli;
pub mod compress;
pub mod constants;
pub mod crop;
pub mod error;
pub mod export;
pub mod format;
pub mod info;
pub mod intake;
pub mod logger;
pub mod preview;
pub mod settings;

pub use batch::{BatchSession, BatchState, BatchSummary, ItemFailure, ItemOutcome};
pub use compress::{compress_source, decode_image, encode_jpeg, CompressedResult, SourceImage};
pub use crop::{crop_source, CropRect};
pub use error::{CompressionError, Result};
pub use export::{download_all_as_archive, download_each, download_one, Artifact, EntryNaming};
pub use format::{calculate_compression_ratio, format_file_size, format_percent};
pub use info::{inspect_batch, print_source_info, SourceInfo};
pub use intake::{
    collect_input_paths, is_image_file, read_incoming, IncomingFile, RejectReason, RejectedFile,
};
pub use preview::{PreviewHandle, PreviewRegistry};
pub use settings::{BatchLimits, CompressionSettings};
