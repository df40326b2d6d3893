//! Stand-in image tools for toolprobe's end-to-end tests.
//!
//! The binaries in this crate mimic the process-level contract of a real
//! checker, preview generator and info tool, but read and write the
//! [`image`] text format instead of a binary container:
//!
//! - `toolprobe-fake-check [-m|-t|-s|-c] file`
//! - `toolprobe-fake-preview [-w width] [-e exposure] [-v] infile outfile`
//! - `toolprobe-fake-info [-v] file`
//!
//! Each prints a `Usage: ` banner to stderr and exits 1 on bad arguments.

// Test fixtures crate - error variants and fields are self-describing
#![allow(missing_docs)]

pub mod helpers;
pub mod image;

pub use helpers::{write_sample, write_standard_assets, GRAY_RAMPS, STANDARD_SAMPLES};
pub use image::{parse, FakeImage, ImageError, Parsed};
