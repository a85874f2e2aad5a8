mod common;

use common::incoming;
use image::{GenericImageView, ImageFormat};
use img_compressor::{
    download_all_as_archive, BatchSession, BatchState, CompressionSettings, EntryNaming,
    IncomingFile,
};
use std::collections::HashSet;
use std::io::Cursor;
use zip::ZipArchive;

fn session_with(files: Vec<IncomingFile>, quality: u8) -> BatchSession {
    let mut session =
        BatchSession::new(CompressionSettings::new(Some(quality)).unwrap()).with_threads(Some(4));
    let rejected = session.ingest(files);
    assert!(rejected.is_empty());
    session
}

#[test]
fn test_two_images_at_quality_sixty() {
    let a = incoming("beach.bmp", 160, 120, ImageFormat::Bmp);
    let b = incoming("forest.bmp", 120, 90, ImageFormat::Bmp);
    let total_original = a.byte_size() + b.byte_size();

    let mut session = session_with(vec![a, b], 60);
    let summary = *session.compress_all().unwrap();

    assert_eq!(session.results().len(), 2);
    assert_eq!(summary.total_original_bytes, total_original);
    assert!(summary.total_compressed_bytes < total_original);
    assert!(summary.overall_ratio_percent > 0.0);
}

#[test]
fn test_dimensions_survive_recompression() {
    let sources = vec![
        incoming("a.png", 33, 17, ImageFormat::Png),
        incoming("b.bmp", 64, 48, ImageFormat::Bmp),
        incoming("c.jpg", 20, 80, ImageFormat::Jpeg),
    ];
    let expected = [(33, 17), (64, 48), (20, 80)];

    let mut session = session_with(sources, 35);
    session.compress_all().unwrap();

    for (result, dims) in session.results().into_iter().zip(expected) {
        let decoded = image::load_from_memory(result.encoded()).unwrap();
        assert_eq!(decoded.dimensions(), dims);
        assert_eq!(result.dimensions(), dims);
        assert_eq!(
            image::guess_format(result.encoded()).unwrap(),
            ImageFormat::Jpeg
        );
    }
}

#[test]
fn test_removal_reduces_count_without_changing_other_results() {
    let files = || {
        vec![
            incoming("one.png", 40, 30, ImageFormat::Png),
            incoming("two.png", 50, 20, ImageFormat::Png),
            incoming("three.png", 30, 30, ImageFormat::Png),
        ]
    };

    let mut full = session_with(files(), 70);
    full.compress_all().unwrap();
    let full_sizes: Vec<(String, u64)> = full
        .results()
        .into_iter()
        .map(|r| (r.display_name().to_string(), r.compressed_byte_size()))
        .collect();

    let mut reduced = session_with(files(), 70);
    reduced.remove(1).unwrap();
    reduced.compress_all().unwrap();
    let reduced_sizes: Vec<(String, u64)> = reduced
        .results()
        .into_iter()
        .map(|r| (r.display_name().to_string(), r.compressed_byte_size()))
        .collect();

    assert_eq!(reduced_sizes.len(), full_sizes.len() - 1);
    assert_eq!(reduced_sizes[0], full_sizes[0]);
    assert_eq!(reduced_sizes[1], full_sizes[2]);
}

#[test]
fn test_archive_of_batch_results() {
    let mut session = session_with(
        vec![
            incoming("shot.png", 24, 24, ImageFormat::Png),
            incoming("shot.png", 24, 24, ImageFormat::Png),
            incoming("scan.bmp", 24, 24, ImageFormat::Bmp),
        ],
        50,
    );
    session.compress_all().unwrap();

    let artifact = download_all_as_archive(session.results(), EntryNaming::Suffixed).unwrap();
    let mut archive = ZipArchive::new(Cursor::new(artifact.data)).unwrap();
    assert_eq!(archive.len(), 3);

    let names: HashSet<String> = archive.file_names().map(str::to_string).collect();
    assert_eq!(names.len(), 3);
    assert!(names.contains("shot_compressed.png"));
    assert!(names.contains("shot_compressed_2.png"));
    assert!(names.contains("scan_compressed.bmp"));

    let first = session.results()[0].encoded().to_vec();
    let mut entry = archive.by_name("shot_compressed.png").unwrap();
    let mut stored = Vec::new();
    std::io::Read::read_to_end(&mut entry, &mut stored).unwrap();
    assert_eq!(stored, first);
}

#[test]
fn test_new_ingest_restarts_cycle() {
    let mut session = session_with(vec![incoming("a.png", 8, 8, ImageFormat::Png)], 60);
    session.compress_all().unwrap();
    assert_eq!(session.state(), BatchState::Compressed);

    session.ingest(vec![
        incoming("b.png", 8, 8, ImageFormat::Png),
        incoming("c.png", 8, 8, ImageFormat::Png),
    ]);
    assert_eq!(session.state(), BatchState::Pending);
    assert!(session.summary().is_none());

    session.set_quality(90);
    let summary = *session.compress_all().unwrap();
    assert_eq!(summary.compressed_count, 2);
    assert_eq!(session.outcomes().len(), 2);
}

#[test]
fn test_corrupt_item_is_isolated() {
    let mut session = BatchSession::default();
    session.ingest(vec![
        incoming("good.png", 16, 16, ImageFormat::Png),
        IncomingFile::new("truncated.png", vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A]),
    ]);

    let summary = *session.compress_all().unwrap();
    assert_eq!(session.outcomes().len(), 2);
    assert_eq!(summary.compressed_count, 1);
    assert_eq!(summary.failed_count, 1);
    assert_eq!(session.failures()[0].display_name, "truncated.png");
}

#[test]
fn test_browser_image_types_fail_per_item() {
    let mut session = BatchSession::default();
    let rejected = session.ingest(vec![
        IncomingFile::new("logo.svg", b"<svg/>".to_vec()),
        incoming("ok.png", 8, 8, ImageFormat::Png),
        IncomingFile::new("phone.heic", vec![0; 32]),
    ]);
    assert!(rejected.is_empty());

    let summary = *session.compress_all().unwrap();
    assert_eq!(summary.compressed_count, 1);
    assert_eq!(summary.failed_count, 2);
    let failed: Vec<&str> = session
        .failures()
        .into_iter()
        .map(|f| f.display_name.as_str())
        .collect();
    assert_eq!(failed, ["logo.svg", "phone.heic"]);
}

#[test]
fn test_convert_batch_appends_and_names_jpg() {
    let mut session = BatchSession::new(CompressionSettings::new(Some(90)).unwrap());
    session
        .append(vec![incoming("first.png", 12, 12, ImageFormat::Png)])
        .unwrap();
    session
        .append(vec![incoming("second.tif", 12, 12, ImageFormat::Tiff)])
        .unwrap();
    assert_eq!(session.sources().len(), 2);

    session.compress_all().unwrap();
    let artifact = download_all_as_archive(session.results(), EntryNaming::Converted).unwrap();
    assert_eq!(artifact.file_name, "converted_images.zip");

    let archive = ZipArchive::new(Cursor::new(artifact.data)).unwrap();
    let names: HashSet<&str> = archive.file_names().collect();
    assert_eq!(names, HashSet::from(["first.jpg", "second.jpg"]));
}
