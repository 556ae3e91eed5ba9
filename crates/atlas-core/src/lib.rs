//! Core types for Atlas: the data model shared by the script reader, the
//! incremental loaders, and anything that renders their output.
//!
//! This crate does no I/O. Loaders in `atlas-loader` produce
//! [`LoadResult`] values built from these types.

/// Color attachments, HSV conversion, and 24-bit color packing.
pub mod color;
/// Country and country-tag records.
pub mod country;
/// Error types used throughout the crate.
pub mod error;
/// Points, zones, and bounding-box helpers for map geometry.
pub mod geometry;
/// The uniform result value every loader produces.
pub mod load_result;
/// Non-fatal diagnostics attached to a load.
pub mod warning;

/// Re-export color types and conversions.
pub use color::{ColorAttachment, ColorSpace, Rgb, convert_color, format_color, hsv_to_rgb};
/// Re-export country records.
pub use country::{Country, Tag};
/// Re-export error types.
pub use error::{AtlasError, AtlasResult};
/// Re-export geometry types.
pub use geometry::{Point, Zone};
/// Re-export load result types and merge helpers.
pub use load_result::{LoadResult, merge_dependencies, merge_warnings};
/// Re-export warning types.
pub use warning::{Warning, WarningSource};
