//! Support library for the graphseg CLI binary.
//!
//! Exposes the command pipeline and logging setup so doctests and unit tests
//! can drive segmentation without spawning a subprocess.

pub mod cli;
pub mod logging;
