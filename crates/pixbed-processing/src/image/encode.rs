//! Format-preserving re-encoding
//!
//! Delivery re-encodes with the stored format's own encoder. JPEG and WebP
//! take the requested quality; PNG and GIF have no quality knob and are
//! written losslessly.

use anyhow::{anyhow, Result};
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// Raster formats this service can re-encode. SVG has no raster encoder and
/// never reaches this module (its transforms fall back to the original
/// bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
}

impl EncodeFormat {
    pub fn from_mime(content_type: &str) -> Option<Self> {
        match content_type {
            "image/jpeg" | "image/jpg" => Some(EncodeFormat::Jpeg),
            "image/png" => Some(EncodeFormat::Png),
            "image/gif" => Some(EncodeFormat::Gif),
            "image/webp" => Some(EncodeFormat::WebP),
            _ => None,
        }
    }
}

/// Encode an image in the given format. `quality` is 1-100 and only
/// meaningful for JPEG and WebP.
pub fn encode(img: &DynamicImage, format: EncodeFormat, quality: u8) -> Result<Bytes> {
    match format {
        EncodeFormat::Jpeg => {
            // JPEG has no alpha channel; flatten before encoding.
            let rgb = img.to_rgb8();
            let mut buffer = Vec::new();
            let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
            encoder.encode_image(&rgb)?;
            Ok(Bytes::from(buffer))
        }
        EncodeFormat::Png => {
            let mut buffer = Vec::new();
            img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)?;
            Ok(Bytes::from(buffer))
        }
        EncodeFormat::Gif => {
            let mut buffer = Vec::new();
            img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Gif)?;
            Ok(Bytes::from(buffer))
        }
        EncodeFormat::WebP => {
            let rgba = img.to_rgba8();
            let (width, height) = rgba.dimensions();
            let encoder = webp::Encoder::from_rgba(&rgba, width, height);
            let webp_data = encoder
                .encode_simple(false, quality as f32)
                .map_err(|e| anyhow!("WebP encoding failed: {:?}", e))?;
            Ok(Bytes::copy_from_slice(&webp_data))
        }
    }
}
