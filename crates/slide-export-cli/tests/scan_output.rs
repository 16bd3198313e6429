//! Scan command output tests.

#![allow(clippy::unwrap_used)]
#![allow(deprecated)] // cargo_bin deprecation

use assert_cmd::Command;
use serde_json::Value;
use slide_export_test_support::SyntheticSlideBuilder;

#[test]
fn test_scan_reports_channel_ranges_as_json() {
    let dir = tempfile::tempdir().unwrap();
    SyntheticSlideBuilder::uniform_gray_image(8, 8, 100)
        .save(dir.path().join("a.png"))
        .unwrap();
    SyntheticSlideBuilder::uniform_gray_image(8, 8, 200)
        .save(dir.path().join("b.png"))
        .unwrap();

    let mut cmd = Command::cargo_bin("slide-export").unwrap();
    cmd.arg("scan")
        .arg("--quiet")
        .arg("--clip")
        .arg("0")
        .arg("--downsample")
        .arg("1")
        .arg(dir.path());

    let assert = cmd.assert().code(0);
    let ranges: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();

    let ranges = ranges.as_array().unwrap();
    assert_eq!(ranges.len(), 1);
    assert_eq!(ranges[0]["name"], "Gray");
    assert_eq!(ranges[0]["min_display"], 100.0);
    assert_eq!(ranges[0]["max_display"], 200.0);
}

#[test]
fn test_scan_of_rgb_slide_yields_three_ranges() {
    let dir = tempfile::tempdir().unwrap();
    SyntheticSlideBuilder::rgb_image(8, 8, [10, 120, 240])
        .save(dir.path().join("rgb.png"))
        .unwrap();

    let mut cmd = Command::cargo_bin("slide-export").unwrap();
    cmd.arg("scan")
        .arg("--quiet")
        .arg("--clip")
        .arg("0")
        .arg("--downsample")
        .arg("1")
        .arg(dir.path());

    let assert = cmd.assert().code(0);
    let ranges: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();

    let ranges = ranges.as_array().unwrap();
    assert_eq!(ranges.len(), 3);
    assert_eq!(ranges[0]["name"], "Red");
    assert_eq!(ranges[1]["name"], "Green");
    assert_eq!(ranges[2]["name"], "Blue");
    // Flat channels degenerate to a one-unit range instead of zero width.
    assert_eq!(ranges[0]["min_display"], 10.0);
    assert_eq!(ranges[0]["max_display"], 11.0);
}

#[test]
fn test_scan_empty_directory_prints_empty_array() {
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = Command::cargo_bin("slide-export").unwrap();
    cmd.arg("scan").arg("--quiet").arg(dir.path());

    let assert = cmd.assert().code(0);
    let ranges: Value = serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(ranges.as_array().unwrap().len(), 0);
}

#[test]
fn test_scan_pretty_output_is_indented() {
    let dir = tempfile::tempdir().unwrap();
    SyntheticSlideBuilder::uniform_gray_image(4, 4, 1)
        .save(dir.path().join("s.png"))
        .unwrap();

    let mut cmd = Command::cargo_bin("slide-export").unwrap();
    cmd.arg("scan").arg("--quiet").arg("--pretty").arg(dir.path());

    let assert = cmd.assert().code(0);
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(stdout.contains("\n  "));
}
