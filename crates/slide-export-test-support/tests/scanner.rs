//! Range scanner behavior tests against the port mocks.

#![allow(clippy::unwrap_used)]

use slide_export_core::domain::{BatchItem, PixelBuffer, Region};
use slide_export_core::scan::{RangeScanner, CONTINUOUS_BIN_COUNT};
use slide_export_test_support::{
    CountingProgressSink, MockSlideSource, SlideBehavior, SyntheticSlideBuilder,
};

fn items(names: &[&str]) -> Vec<BatchItem> {
    names
        .iter()
        .map(|n| BatchItem::new(format!("/data/{n}.tif"), *n))
        .collect()
}

#[test]
fn test_empty_batch_returns_empty_ranges() {
    let source = MockSlideSource::new();
    let scanner = RangeScanner::new(&source);
    assert!(scanner.compute_global_ranges(&[], 1.0, 8.0).is_empty());
}

#[test]
fn test_discrete_batch_zero_clip() {
    // Two 8-bit slides: value 100 twice, value 200 once.
    let (descriptor_a, region_a) = SyntheticSlideBuilder::from_samples_u8(2, 1, vec![100, 100]);
    let (descriptor_b, region_b) = SyntheticSlideBuilder::from_samples_u8(1, 1, vec![200]);
    let source = MockSlideSource::new()
        .with_slide("a", descriptor_a, region_a)
        .with_slide("b", descriptor_b, region_b);
    let scanner = RangeScanner::new(&source);

    let ranges = scanner.compute_global_ranges(&items(&["a", "b"]), 0.0, 1.0);

    assert_eq!(ranges.len(), 1);
    assert_eq!(ranges[0].name, "Gray");
    assert!((ranges[0].min_display - 100.0).abs() < f64::EPSILON);
    assert!((ranges[0].max_display - 200.0).abs() < f64::EPSILON);
}

#[test]
fn test_sixteen_bit_slides_use_wide_histogram() {
    let descriptor = SyntheticSlideBuilder::gray16_descriptor(2, 1);
    let region = Region {
        width: 2,
        height: 1,
        channels: 1,
        pixels: PixelBuffer::U16(vec![1_000, 40_000]),
    };
    let source = MockSlideSource::new().with_slide("wide", descriptor, region);
    let scanner = RangeScanner::new(&source);

    let ranges = scanner.compute_global_ranges(&items(&["wide"]), 0.0, 1.0);

    assert!((ranges[0].min_display - 1_000.0).abs() < f64::EPSILON);
    assert!((ranges[0].max_display - 40_000.0).abs() < f64::EPSILON);
}

#[test]
fn test_continuous_two_pass_with_nan_dropped() {
    let (descriptor, region) =
        SyntheticSlideBuilder::from_samples_f32(4, 1, vec![-1.0, 3.0, 0.5, f32::NAN]);
    let source = MockSlideSource::new().with_slide("f", descriptor, region);
    let scanner = RangeScanner::new(&source);

    let ranges = scanner.compute_global_ranges(&items(&["f"]), 0.0, 1.0);

    assert_eq!(ranges.len(), 1);
    let width = 4.0 / CONTINUOUS_BIN_COUNT as f64;
    assert!((ranges[0].min_display - -1.0).abs() < 1e-9);
    assert!((ranges[0].max_display - 3.0).abs() < width + 1e-9);
}

#[test]
fn test_continuous_progress_spans_two_passes() {
    let (descriptor_a, region_a) = SyntheticSlideBuilder::from_samples_f32(1, 1, vec![0.0]);
    let (descriptor_b, region_b) = SyntheticSlideBuilder::from_samples_f32(1, 1, vec![1.0]);
    let source = MockSlideSource::new()
        .with_slide("a", descriptor_a, region_a)
        .with_slide("b", descriptor_b, region_b);
    let progress = CountingProgressSink::new();
    let scanner = RangeScanner::new(&source).with_progress(&progress);

    scanner.compute_global_ranges(&items(&["a", "b"]), 1.0, 4.0);

    // One callback per image per pass, denominated in total*2 units.
    assert_eq!(progress.updates(), vec![(1, 4), (2, 4), (3, 4), (4, 4)]);
}

#[test]
fn test_discrete_progress_is_single_pass() {
    let (descriptor_a, region_a) = SyntheticSlideBuilder::uniform_u8(2, 2, 10);
    let (descriptor_b, region_b) = SyntheticSlideBuilder::uniform_u8(2, 2, 20);
    let source = MockSlideSource::new()
        .with_slide("a", descriptor_a, region_a)
        .with_slide("b", descriptor_b, region_b);
    let progress = CountingProgressSink::new();
    let scanner = RangeScanner::new(&source).with_progress(&progress);

    scanner.compute_global_ranges(&items(&["a", "b"]), 1.0, 4.0);

    assert_eq!(progress.updates(), vec![(1, 2), (2, 2)]);
}

#[test]
fn test_unreadable_slide_is_skipped_not_fatal() {
    let (descriptor_a, region_a) = SyntheticSlideBuilder::from_samples_u8(2, 1, vec![50, 60]);
    let descriptor_bad = SyntheticSlideBuilder::gray_descriptor(2, 1);
    let source = MockSlideSource::new()
        .with_slide("good", descriptor_a, region_a)
        .with_behavior(
            "bad",
            SlideBehavior::FailRead {
                descriptor: descriptor_bad,
            },
        );
    let scanner = RangeScanner::new(&source);

    let ranges = scanner.compute_global_ranges(&items(&["good", "bad"]), 0.0, 1.0);

    assert_eq!(ranges.len(), 1);
    assert!((ranges[0].min_display - 50.0).abs() < f64::EPSILON);
    assert!((ranges[0].max_display - 60.0).abs() < f64::EPSILON);
    // The unreadable slide was still closed after its failed read.
    assert_eq!(source.close_count("bad"), 1);
}

#[test]
fn test_reference_open_failure_aborts_scan() {
    let (descriptor, region) = SyntheticSlideBuilder::uniform_u8(2, 2, 100);
    let source = MockSlideSource::new()
        .with_behavior("first", SlideBehavior::FailOpen)
        .with_slide("second", descriptor, region);
    let scanner = RangeScanner::new(&source);

    let ranges = scanner.compute_global_ranges(&items(&["first", "second"]), 0.0, 1.0);

    assert!(ranges.is_empty());
}

#[test]
fn test_channel_count_capped_at_reference() {
    // Reference slide has one channel; a later slide carries three.
    let (descriptor_ref, region_ref) = SyntheticSlideBuilder::from_samples_u8(1, 1, vec![10]);
    let descriptor_rgb = SyntheticSlideBuilder::gray_descriptor(1, 1);
    let region_rgb = Region {
        width: 1,
        height: 1,
        channels: 3,
        pixels: PixelBuffer::U8(vec![250, 7, 7]),
    };
    let source = MockSlideSource::new()
        .with_slide("ref", descriptor_ref, region_ref)
        .with_slide("rgb", descriptor_rgb, region_rgb);
    let scanner = RangeScanner::new(&source);

    let ranges = scanner.compute_global_ranges(&items(&["ref", "rgb"]), 0.0, 1.0);

    // Only the first channel contributes: samples 10 and 250.
    assert_eq!(ranges.len(), 1);
    assert!((ranges[0].min_display - 10.0).abs() < f64::EPSILON);
    assert!((ranges[0].max_display - 250.0).abs() < f64::EPSILON);
}

#[test]
fn test_scan_closes_every_slide_it_opens() {
    let (descriptor_a, region_a) = SyntheticSlideBuilder::uniform_u8(2, 2, 1);
    let (descriptor_b, region_b) = SyntheticSlideBuilder::uniform_u8(2, 2, 2);
    let source = MockSlideSource::new()
        .with_slide("a", descriptor_a, region_a)
        .with_slide("b", descriptor_b, region_b);
    let scanner = RangeScanner::new(&source);

    scanner.compute_global_ranges(&items(&["a", "b"]), 1.0, 4.0);

    // Slide "a" is opened once for metadata discovery and once for the
    // histogram pass.
    assert_eq!(source.close_count("a"), 2);
    assert_eq!(source.close_count("b"), 1);
}
