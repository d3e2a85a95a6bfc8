//! Command-line interface orchestration for graphseg.
//!
//! The `segment` command loads an image (plus an optional depth map), runs the
//! segmentation engine and reports per-segment statistics, optionally writing
//! a colour overlay.

mod commands;

pub use commands::{
    Cli, CliError, Command, ConnectivityArg, SegmentCommand, SegmentReport, SegmentationSummary,
    render_summary, run_cli,
};

#[cfg(test)]
mod test_helpers;
