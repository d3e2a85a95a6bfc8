//! Benchmark support crate for graphseg.
//!
//! Provides seeded synthetic images and parameter labels used by the
//! Criterion benchmarks for edge construction and full segmentation.

pub mod params;
pub mod synthetic;
