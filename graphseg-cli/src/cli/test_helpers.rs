//! Small helpers shared across CLI tests.
//!
//! Tests write tiny images into a temporary directory and drive the command
//! pipeline directly.

use std::path::PathBuf;

use image::{GrayImage, Luma, Rgb, RgbImage};
use tempfile::TempDir;

use super::{CliError, SegmentCommand, commands::run_command};

pub(super) fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

/// Writes a `width x height` PNG whose left half is red and right half blue.
pub(super) fn write_halves(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
    let image = RgbImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgb([255, 0, 0])
        } else {
            Rgb([0, 0, 255])
        }
    });
    save(image.save(dir.path().join(name)), dir, name)
}

/// Writes a uniformly grey PNG.
pub(super) fn write_flat(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
    let image = RgbImage::from_pixel(width, height, Rgb([128, 128, 128]));
    save(image.save(dir.path().join(name)), dir, name)
}

/// Writes a depth PNG: `near` on the top half, `far` on the bottom half.
pub(super) fn write_depth(
    dir: &TempDir,
    name: &str,
    width: u32,
    height: u32,
    (near, far): (u8, u8),
) -> PathBuf {
    let image = GrayImage::from_fn(width, height, |_, y| {
        Luma([if y < height / 2 { near } else { far }])
    });
    save(image.save(dir.path().join(name)), dir, name)
}

fn save(outcome: image::ImageResult<()>, dir: &TempDir, name: &str) -> PathBuf {
    if let Err(err) = outcome {
        panic!("failed to write fixture {name}: {err}");
    }
    dir.path().join(name)
}

/// A `segment` command with deterministic, test-friendly parameters.
pub(super) fn command(image: PathBuf) -> SegmentCommand {
    SegmentCommand {
        image,
        depth: None,
        depth_weight: 1.0,
        granularity: 10.0,
        min_size: 1,
        sigma: 0.0,
        connectivity: super::ConnectivityArg::Four,
        overlay: None,
        boundaries: false,
    }
}

pub(super) fn run_command_expecting_error(command: SegmentCommand, panic_msg: &str) -> CliError {
    match run_command(command) {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}
