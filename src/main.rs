use anyhow::{bail, Context, Result};
use clap::Parser;
use img_compressor::cli::{Args, Commands, ExportMode};
use img_compressor::constants::{
    COMPRESSED_SIZE_PREFIX, COMPRESSION_RATIO_PREFIX, CONVERT_QUALITY, DEFAULT_CROP_FRACTION,
    MAX_IMAGE_DIMENSION, ORIGINAL_SIZE_PREFIX, SUCCESS_PREFIX,
};
use img_compressor::{
    collect_input_paths, crop_source, download_all_as_archive, download_each, download_one,
    format_file_size, format_percent, inspect_batch, logger, print_source_info, read_incoming,
    Artifact, BatchSession, BatchState, BatchSummary, CompressionError, CompressionSettings,
    EntryNaming, IncomingFile,
};
use std::path::{Path, PathBuf};

fn main() {
    let args = Args::parse();
    logger::init(args.quiet, args.verbose);

    if let Err(e) = run(args.command) {
        img_compressor::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Compress {
            inputs,
            output,
            quality,
            recursive,
            exclude,
            export,
            naming,
            threads,
        } => {
            let settings = CompressionSettings::new(Some(quality))?;
            let mut session = BatchSession::new(settings).with_threads(threads);
            if !load_batch(&mut session, &inputs, recursive)? {
                return Ok(());
            }
            remove_excluded(&mut session, exclude)?;
            if session.state() == BatchState::Empty {
                img_compressor::warn!("Every image was excluded, nothing to compress");
                return Ok(());
            }

            let summary = *session.compress_all()?;
            report_outcomes(&session, &summary);
            export_results(&session, &output, export, naming.into())?;
        }
        Commands::Convert {
            inputs,
            output,
            recursive,
            exclude,
            export,
            threads,
        } => {
            let settings = CompressionSettings::new(Some(CONVERT_QUALITY))?;
            let mut session = BatchSession::new(settings).with_threads(threads);
            if !load_batch(&mut session, &inputs, recursive)? {
                return Ok(());
            }
            remove_excluded(&mut session, exclude)?;
            if session.state() == BatchState::Empty {
                img_compressor::warn!("Every image was excluded, nothing to convert");
                return Ok(());
            }

            let summary = *session.compress_all()?;
            report_outcomes(&session, &summary);
            export_results(&session, &output, export, EntryNaming::Converted)?;
        }
        Commands::Crop {
            input,
            output,
            area,
            quality,
        } => {
            let settings = CompressionSettings::new(Some(quality))?;
            let mut session = BatchSession::new(settings);
            let file = IncomingFile::from_path(&input)?;
            if let Some(rejected) = session.ingest(vec![file]).first() {
                bail!("cannot crop {}: {}", rejected.display_name, rejected.reason);
            }

            let source = session.sources().first().context("no image to crop")?;
            let result = crop_source(
                source,
                area,
                DEFAULT_CROP_FRACTION,
                session.quality(),
                MAX_IMAGE_DIMENSION,
            )
            .with_context(|| format!("failed to crop {}", input.display()))?;

            let (width, height) = result.dimensions();
            img_compressor::info!(
                "✂️  Cropped {} to {}x{} ({})",
                result.display_name(),
                width,
                height,
                format_file_size(result.compressed_byte_size())
            );
            let path = download_one(&result, EntryNaming::Cropped)
                .save_to(&output)
                .with_context(|| format!("failed to write result to {}", output.display()))?;
            img_compressor::success!("Saved {}", path.display());
        }
        Commands::Inspect { inputs, recursive } => {
            let mut session = BatchSession::default();
            if load_batch(&mut session, &inputs, recursive)? {
                print_source_info(&inspect_batch(&session));
            }
        }
    }

    Ok(())
}

/// Appends every input to `session` in order. Returns `false` when nothing
/// was accepted.
fn load_batch(session: &mut BatchSession, inputs: &[String], recursive: bool) -> Result<bool> {
    let groups = inputs
        .iter()
        .map(|input| collect_input_paths(std::slice::from_ref(input), recursive))
        .collect::<img_compressor::Result<Vec<_>>>()?;
    if groups.iter().all(|paths| paths.is_empty()) {
        img_compressor::warn!("No image files found in the input paths");
        return Ok(false);
    }

    let spinner = logger::spinner("Loading images...");
    let mut rejected = Vec::new();
    for paths in &groups {
        let files = read_incoming(paths).context("failed to read input files")?;
        rejected.extend(session.append(files)?);
    }
    spinner.finish_and_clear();

    for file in &rejected {
        img_compressor::warn!("Skipping {}: {}", file.display_name, file.reason);
    }
    img_compressor::info!(
        "📁 Loaded {} images ({} skipped)",
        session.sources().len(),
        rejected.len()
    );

    if session.state() == BatchState::Empty {
        img_compressor::warn!("No images left after filtering");
        return Ok(false);
    }
    Ok(true)
}

/// Removes pending positions given on the command line. Positions refer to
/// the batch as loaded, so they are removed from the highest down.
fn remove_excluded(session: &mut BatchSession, mut exclude: Vec<usize>) -> Result<()> {
    exclude.sort_unstable_by(|a, b| b.cmp(a));
    exclude.dedup();
    for index in exclude {
        let removed = session
            .remove(index)
            .with_context(|| format!("cannot exclude image {}", index))?;
        img_compressor::verbose!("Excluded [{}] {}", index, removed.display_name());
    }
    Ok(())
}

fn report_outcomes(session: &BatchSession, summary: &BatchSummary) {
    for outcome in session.outcomes() {
        match outcome {
            Ok(result) => img_compressor::info!(
                "  {} {}: {} → {} ({}%)",
                SUCCESS_PREFIX,
                result.display_name(),
                format_file_size(result.original_byte_size()),
                format_file_size(result.compressed_byte_size()),
                format_percent(result.compression_ratio_percent())
            ),
            Err(failure) => img_compressor::error!("Failed to compress {}", failure),
        }
    }

    img_compressor::info!("\n📊 Batch Compression Summary:");
    img_compressor::info!(
        "  {} {}",
        ORIGINAL_SIZE_PREFIX,
        format_file_size(summary.total_original_bytes)
    );
    img_compressor::info!(
        "  {} {}",
        COMPRESSED_SIZE_PREFIX,
        format_file_size(summary.total_compressed_bytes)
    );
    img_compressor::info!(
        "  {} {}%",
        COMPRESSION_RATIO_PREFIX,
        format_percent(summary.overall_ratio_percent)
    );
    if summary.failed_count > 0 {
        img_compressor::warn!("Failed images: {}", summary.failed_count);
    }
}

fn export_results(
    session: &BatchSession,
    output: &Path,
    mode: ExportMode,
    naming: EntryNaming,
) -> Result<()> {
    let results = session.results();
    if results.is_empty() {
        return Err(CompressionError::NothingToExport.into());
    }
    let artifacts: Vec<Artifact> = match (mode, results.len()) {
        (ExportMode::Auto, 1) => vec![download_one(results[0], naming)],
        (ExportMode::Files, _) => download_each(results, naming),
        _ => vec![download_all_as_archive(results, naming).context("failed to build archive")?],
    };

    let saved: Vec<PathBuf> = artifacts
        .iter()
        .map(|artifact| artifact.save_to(output))
        .collect::<img_compressor::Result<_>>()
        .with_context(|| format!("failed to write results to {}", output.display()))?;

    for (artifact, path) in artifacts.iter().zip(&saved) {
        img_compressor::success!(
            "Saved {} ({}, {})",
            path.display(),
            artifact.mime_type,
            format_file_size(artifact.data.len() as u64)
        );
    }
    Ok(())
}
