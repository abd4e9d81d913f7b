//! Intrinsic image metadata probing

use image::ImageReader;
use std::io::Cursor;

/// Probe pixel dimensions from encoded image bytes, reading only as much of
/// the payload as the format header requires.
///
/// Probing failure is non-fatal by contract: vector formats (SVG) and
/// malformed rasters yield `None`, and ingestion proceeds with absent
/// dimensions.
pub fn probe_dimensions(data: &[u8]) -> Option<(u32, u32)> {
    ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}
