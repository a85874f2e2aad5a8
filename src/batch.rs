use crate::compress::{compress_source, CompressedResult, SourceImage};
use crate::constants::{
    LARGE_IMAGE_THRESHOLD_MIB, MAX_CONCURRENT_LARGE_IMAGES, MIN_AVAILABLE_MEMORY_MIB,
};
use crate::error::{CompressionError, Result};
use crate::format::calculate_compression_ratio;
use crate::intake::{partition_incoming, IncomingFile, RejectedFile};
use crate::preview::PreviewRegistry;
use crate::settings::{BatchLimits, CompressionSettings};
use image::ImageFormat;
use rayon::prelude::*;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use sysinfo::{MemoryRefreshKind, RefreshKind, System};
use thiserror::Error;

/// Lifecycle of one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Empty,
    Pending,
    Compressing,
    Compressed,
}

impl BatchState {
    fn label(&self) -> &'static str {
        match self {
            BatchState::Empty => "empty",
            BatchState::Pending => "pending",
            BatchState::Compressing => "compressing",
            BatchState::Compressed => "compressed",
        }
    }
}

impl fmt::Display for BatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Why one item of a run produced no result.
#[derive(Debug, Error)]
#[error("{display_name}: {error}")]
pub struct ItemFailure {
    pub index: usize,
    pub display_name: String,
    #[source]
    pub error: CompressionError,
}

/// Outcome of one source image in a run, stored at the source's index.
pub type ItemOutcome = std::result::Result<CompressedResult, ItemFailure>;

/// Totals over the successful results of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchSummary {
    pub total_original_bytes: u64,
    pub total_compressed_bytes: u64,
    pub overall_ratio_percent: f64,
    pub compressed_count: usize,
    pub failed_count: usize,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[ItemOutcome]) -> Self {
        let (total_original_bytes, total_compressed_bytes, compressed_count) = outcomes
            .iter()
            .filter_map(|outcome| outcome.as_ref().ok())
            .fold((0u64, 0u64, 0usize), |(orig, comp, n), result| {
                (
                    orig + result.original_byte_size(),
                    comp + result.compressed_byte_size(),
                    n + 1,
                )
            });

        Self {
            total_original_bytes,
            total_compressed_bytes,
            overall_ratio_percent: calculate_compression_ratio(
                total_original_bytes,
                total_compressed_bytes,
            ),
            compressed_count,
            failed_count: outcomes.len() - compressed_count,
        }
    }
}

/// Session-scoped state of the compression workflow.
///
/// Owns the pending sources, the quality setting, the preview handles and the
/// outcome of the last run. All mutation goes through the methods below.
#[derive(Debug)]
pub struct BatchSession {
    state: BatchState,
    sources: Vec<SourceImage>,
    settings: CompressionSettings,
    limits: BatchLimits,
    threads: Option<usize>,
    previews: PreviewRegistry,
    outcomes: Vec<ItemOutcome>,
    summary: Option<BatchSummary>,
}

impl Default for BatchSession {
    fn default() -> Self {
        Self::new(CompressionSettings::default())
    }
}

impl BatchSession {
    pub fn new(settings: CompressionSettings) -> Self {
        Self {
            state: BatchState::Empty,
            sources: Vec::new(),
            settings,
            limits: BatchLimits::default(),
            threads: None,
            previews: PreviewRegistry::new(),
            outcomes: Vec::new(),
            summary: None,
        }
    }

    pub fn with_limits(mut self, limits: BatchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Worker count for `compress_all`; `None` uses the CPU count.
    pub fn with_threads(mut self, threads: Option<usize>) -> Self {
        self.threads = threads.filter(|&n| n > 0);
        self
    }

    /// Replaces the batch with the image files among `files`.
    ///
    /// Previous sources release their preview handles and any previous
    /// results are discarded. Files failing the `image/*` filter or the size
    /// limit are returned instead of being added.
    pub fn ingest(&mut self, files: Vec<IncomingFile>) -> Vec<RejectedFile> {
        let (accepted, rejected) = partition_incoming(files, &self.limits);

        let released = self.previews.revoke_all();
        if released > 0 {
            crate::verbose!("Released {} preview handles", released);
        }
        self.outcomes.clear();
        self.summary = None;

        self.sources.clear();
        self.add_sources(accepted);

        for file in &rejected {
            crate::verbose!("Skipped {}: {}", file.display_name, file.reason);
        }

        rejected
    }

    /// Adds the image files among `files` after the pending sources.
    ///
    /// Unlike `ingest` the current batch is kept. Only valid before a run.
    pub fn append(&mut self, files: Vec<IncomingFile>) -> Result<Vec<RejectedFile>> {
        if matches!(self.state, BatchState::Compressing | BatchState::Compressed) {
            return Err(CompressionError::InvalidState(self.state.label()));
        }

        let (accepted, rejected) = partition_incoming(files, &self.limits);
        self.add_sources(accepted);
        Ok(rejected)
    }

    fn add_sources(&mut self, files: Vec<IncomingFile>) {
        for file in files {
            let bytes: Arc<[u8]> = Arc::from(file.bytes);
            let preview = self.previews.create(bytes.clone());
            self.sources.push(SourceImage::new(file.display_name, bytes, preview));
        }

        self.state = if self.sources.is_empty() {
            BatchState::Empty
        } else {
            BatchState::Pending
        };
    }

    /// Drops one pending source before compression.
    pub fn remove(&mut self, index: usize) -> Result<SourceImage> {
        if self.state != BatchState::Pending {
            return Err(CompressionError::InvalidState(self.state.label()));
        }
        if index >= self.sources.len() {
            return Err(CompressionError::IndexOutOfRange(index, self.sources.len()));
        }

        let removed = self.sources.remove(index);
        self.previews.revoke(removed.preview());
        if self.sources.is_empty() {
            self.state = BatchState::Empty;
        }
        Ok(removed)
    }

    /// Sets the quality for the next run, clamped to 1..=100.
    pub fn set_quality(&mut self, percent: i64) -> u8 {
        self.settings.set_quality(percent)
    }

    pub fn quality(&self) -> u8 {
        self.settings.quality()
    }

    /// Re-encodes every pending source concurrently and waits for all of them.
    ///
    /// Outcome `i` always belongs to source `i`. A source that fails to decode
    /// or encode, or whose decoder panics, yields an `ItemFailure` in its slot;
    /// the others still finish.
    pub fn compress_all(&mut self) -> Result<&BatchSummary> {
        if self.state != BatchState::Pending {
            return Err(CompressionError::InvalidState(self.state.label()));
        }

        let estimates: Vec<f64> = self
            .sources
            .iter()
            .map(|s| estimate_image_memory_usage(s.byte_size(), s.display_name()))
            .collect();
        let requested = self.threads.unwrap_or_else(num_cpus::get);
        let plan = plan_run(&estimates, requested, &self.limits, available_memory_mib())?;
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(plan.workers)
            .build()
            .map_err(|e| CompressionError::ThreadPool(e.to_string()))?;

        crate::info!(
            "🗜️  Compressing {} images at quality {} ({} threads, ~{:.1} MiB in flight)",
            self.sources.len(),
            self.settings.quality(),
            plan.workers,
            plan.in_flight_mib
        );
        crate::verbose!(
            "Largest image needs ~{} MiB to decode",
            plan.largest_item_mib
        );

        self.state = BatchState::Compressing;
        let start_time = Instant::now();
        let quality = self.settings.quality();
        let max_dimension = self.limits.max_dimension;
        let progress = crate::logger::batch_progress(self.sources.len() as u64);

        let sources = &self.sources;
        let outcomes: Vec<ItemOutcome> = pool.install(|| {
            sources
                .par_iter()
                .enumerate()
                .map(|(index, source)| {
                    let outcome = run_isolated(index, source.display_name(), || {
                        compress_source(source, quality, max_dimension)
                    });
                    progress.inc(1);
                    outcome
                })
                .collect()
        });
        progress.finish_and_clear();

        let summary = BatchSummary::from_outcomes(&outcomes);
        crate::verbose!(
            "Batch finished in {:?}: {} compressed, {} failed",
            start_time.elapsed(),
            summary.compressed_count,
            summary.failed_count
        );

        self.outcomes = outcomes;
        self.state = BatchState::Compressed;
        let summary: &BatchSummary = self.summary.insert(summary);
        Ok(summary)
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn sources(&self) -> &[SourceImage] {
        &self.sources
    }

    /// Bytes behind a pending source's preview handle.
    pub fn preview(&self, index: usize) -> Option<Arc<[u8]>> {
        let source = self.sources.get(index)?;
        self.previews.resolve(source.preview())
    }

    pub fn live_previews(&self) -> usize {
        self.previews.live_count()
    }

    /// One entry per source of the last run, in source order.
    pub fn outcomes(&self) -> &[ItemOutcome] {
        &self.outcomes
    }

    pub fn results(&self) -> Vec<&CompressedResult> {
        self.outcomes.iter().filter_map(|o| o.as_ref().ok()).collect()
    }

    pub fn failures(&self) -> Vec<&ItemFailure> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err()).collect()
    }

    pub fn summary(&self) -> Option<&BatchSummary> {
        self.summary.as_ref()
    }
}

/// Estimated decode memory for one encoded image, in MiB.
///
/// Decoded pixels are typically several times the encoded size for
/// compressed formats and about the same for raw ones.
pub fn estimate_image_memory_usage(byte_size: u64, display_name: &str) -> f64 {
    let file_size_mib = byte_size as f64 / (1024.0 * 1024.0);

    let multiplier = match ImageFormat::from_path(Path::new(display_name)) {
        Ok(ImageFormat::Jpeg) => 4.0,
        Ok(ImageFormat::Png) => 3.0,
        Ok(ImageFormat::WebP) => 3.5,
        Ok(ImageFormat::Bmp) | Ok(ImageFormat::Tiff) => 1.2,
        Ok(ImageFormat::Gif) => 2.0,
        _ => 3.0,
    };

    file_size_mib * multiplier
}

/// Runs one item, turning both an error and a panic into its `ItemFailure`.
fn run_isolated<F>(index: usize, display_name: &str, job: F) -> ItemOutcome
where
    F: FnOnce() -> Result<CompressedResult>,
{
    let result = match panic::catch_unwind(AssertUnwindSafe(job)) {
        Ok(result) => result,
        Err(payload) => Err(CompressionError::Panicked(panic_message(payload.as_ref()))),
    };
    result.map_err(|error| ItemFailure {
        index,
        display_name: display_name.to_string(),
        error,
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Worker count and memory footprint chosen for one run.
#[derive(Debug, Clone, Copy, PartialEq)]
struct RunPlan {
    workers: usize,
    largest_item_mib: u64,
    in_flight_mib: f64,
}

/// Checks the batch limits and sizes the worker pool.
///
/// Memory limits apply to what is decoded at the same time, not to the whole
/// batch: the run is refused only when the largest single image cannot fit.
/// Otherwise the worker count shrinks until `workers * largest` fits both
/// `max_memory_mib` and the host's available memory.
fn plan_run(
    estimates: &[f64],
    requested_workers: usize,
    limits: &BatchLimits,
    available_mib: Option<u64>,
) -> Result<RunPlan> {
    if estimates.len() > limits.max_files {
        return Err(CompressionError::BatchFileLimitExceeded(
            estimates.len(),
            limits.max_files,
        ));
    }

    let largest = estimates.iter().copied().fold(0.0f64, f64::max);
    let largest_item_mib = (largest.ceil() as u64).max(1);
    if largest_item_mib > limits.max_memory_mib {
        return Err(CompressionError::BatchMemoryLimitExceeded(
            largest_item_mib,
            limits.max_memory_mib,
        ));
    }

    let mut workers = requested_workers.min(estimates.len()).max(1);

    let large_image_count = estimates
        .iter()
        .filter(|&&mib| mib > LARGE_IMAGE_THRESHOLD_MIB)
        .count();
    if large_image_count >= MAX_CONCURRENT_LARGE_IMAGES {
        workers = workers.min(MAX_CONCURRENT_LARGE_IMAGES);
    }

    workers = workers.min((limits.max_memory_mib / largest_item_mib) as usize);

    if let Some(available) = available_mib {
        let budget = available.saturating_sub(MIN_AVAILABLE_MEMORY_MIB);
        if largest_item_mib > budget {
            return Err(CompressionError::InsufficientMemory(
                largest_item_mib,
                available,
            ));
        }
        workers = workers.min((budget / largest_item_mib) as usize);
    }

    let workers = workers.max(1);
    Ok(RunPlan {
        workers,
        largest_item_mib,
        in_flight_mib: largest * workers as f64,
    })
}

/// Host memory available for decoding, or `None` when it cannot be read.
fn available_memory_mib() -> Option<u64> {
    let mut sys =
        System::new_with_specifics(RefreshKind::new().with_memory(MemoryRefreshKind::everything()));
    sys.refresh_memory();
    match sys.available_memory() / (1024 * 1024) {
        0 => None,
        mib => Some(mib),
    }
}
