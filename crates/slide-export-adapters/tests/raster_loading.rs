//! Filesystem slide source tests against real files.

#![allow(clippy::unwrap_used)]

use slide_export_adapters::FsSlideSource;
use slide_export_core::domain::BatchItem;
use slide_export_core::ports::SlideSource;
use slide_export_test_support::SyntheticSlideBuilder;

#[test]
fn test_collects_supported_files_sorted() {
    let dir = tempfile::tempdir().unwrap();
    SyntheticSlideBuilder::uniform_gray_image(4, 4, 10)
        .save(dir.path().join("b.png"))
        .unwrap();
    SyntheticSlideBuilder::uniform_gray_image(4, 4, 20)
        .save(dir.path().join("a.tif"))
        .unwrap();
    std::fs::write(dir.path().join("notes.txt"), "not a slide").unwrap();

    let source = FsSlideSource::new(vec![dir.path().to_path_buf()], false);
    let items = source.items();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].name, "a");
    assert_eq!(items[1].name, "b");
}

#[test]
fn test_recursion_is_opt_in() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("nested");
    std::fs::create_dir(&nested).unwrap();
    SyntheticSlideBuilder::uniform_gray_image(4, 4, 10)
        .save(nested.join("deep.png"))
        .unwrap();

    let flat = FsSlideSource::new(vec![dir.path().to_path_buf()], false);
    assert!(flat.items().is_empty());

    let recursive = FsSlideSource::new(vec![dir.path().to_path_buf()], true);
    assert_eq!(recursive.items().len(), 1);
}

#[test]
fn test_open_reads_descriptor_and_pixels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gradient.png");
    SyntheticSlideBuilder::gradient_gray_image(16, 4)
        .save(&path)
        .unwrap();

    let source = FsSlideSource::new(vec![path.clone()], false);
    let items = source.items();
    let mut handle = source.open(&items[0]).unwrap();

    let descriptor = handle.descriptor().clone();
    assert_eq!(descriptor.width, 16);
    assert_eq!(descriptor.channel_count(), 1);
    assert_eq!(descriptor.bit_depth, 8);
    assert!(!descriptor.is_float);

    let region = handle.read_region(2.0).unwrap();
    assert_eq!(region.width, 8);
    assert_eq!(region.channels, 1);

    handle.close().unwrap();
    assert!(handle.read_region(1.0).is_err());
}

#[test]
fn test_rgb_slide_reports_three_channels() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rgb.png");
    SyntheticSlideBuilder::rgb_image(8, 8, [200, 100, 50])
        .save(&path)
        .unwrap();

    let source = FsSlideSource::new(vec![path.clone()], false);
    let mut handle = source.open(&source.items()[0]).unwrap();

    assert_eq!(handle.descriptor().channel_count(), 3);
    assert_eq!(handle.descriptor().channels[1].name, "Green");

    let region = handle.read_region(1.0).unwrap();
    assert!((region.sample(0, 0) - 200.0).abs() < f64::EPSILON);
    assert!((region.sample(0, 2) - 50.0).abs() < f64::EPSILON);
    handle.close().unwrap();
}

#[test]
fn test_open_missing_file_fails() {
    let source = FsSlideSource::new(vec![], false);
    let item = BatchItem::new("/nonexistent/slide.tif", "slide");
    assert!(source.open(&item).is_err());
}
