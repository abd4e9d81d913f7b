//! Image transformer - decode, fit, re-encode
//!
//! The delivery transform is a pure function of (bytes, stored content type,
//! target box, quality): identical inputs always produce identical output
//! bytes.

use anyhow::{anyhow, Result};
use bytes::Bytes;
use image::{GenericImageView, ImageReader};
use std::io::Cursor;

use crate::image::encode::{encode, EncodeFormat};
use crate::image::resize::{fit_within, resize_image, ResizeTarget};

pub struct ImageTransformer;

impl ImageTransformer {
    /// Resize `data` to fit inside `target` (never enlarging) and re-encode
    /// it with the stored format's encoder at the given quality.
    ///
    /// Errors here are recovered by the caller, which falls back to serving
    /// the original bytes; a resize bug must never break a delivery.
    pub fn transform(
        data: &[u8],
        content_type: &str,
        target: ResizeTarget,
        quality: u8,
    ) -> Result<Bytes> {
        let format = EncodeFormat::from_mime(content_type)
            .ok_or_else(|| anyhow!("No raster encoder for content type {}", content_type))?;

        let img = ImageReader::new(Cursor::new(data))
            .with_guessed_format()?
            .decode()?;

        let (orig_width, orig_height) = img.dimensions();
        let output = match fit_within(orig_width, orig_height, target) {
            Some((width, height)) => resize_image(&img, width, height),
            None => img,
        };

        encode(&output, format, quality)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 128, 255])
        });
        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .unwrap();
        buffer
    }

    fn decoded_dimensions(data: &[u8]) -> (u32, u32) {
        ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .unwrap()
            .decode()
            .unwrap()
            .dimensions()
    }

    fn target(width: Option<u32>, height: Option<u32>) -> ResizeTarget {
        ResizeTarget { width, height }
    }

    #[test]
    fn test_resize_width_only() {
        let data = png_bytes(100, 60);
        let out =
            ImageTransformer::transform(&data, "image/png", target(Some(50), None), 85).unwrap();
        assert_eq!(decoded_dimensions(&out), (50, 30));
    }

    #[test]
    fn test_resize_height_only() {
        let data = png_bytes(100, 60);
        let out =
            ImageTransformer::transform(&data, "image/png", target(None, Some(30)), 85).unwrap();
        assert_eq!(decoded_dimensions(&out), (50, 30));
    }

    #[test]
    fn test_box_larger_than_original_never_enlarges() {
        let data = png_bytes(100, 60);
        let out = ImageTransformer::transform(&data, "image/png", target(Some(400), Some(400)), 85)
            .unwrap();
        let (w, h) = decoded_dimensions(&out);
        assert!(w <= 100 && h <= 60);
        assert_eq!((w, h), (100, 60));
    }

    #[test]
    fn test_fit_inside_box() {
        let data = png_bytes(200, 100);
        let out = ImageTransformer::transform(&data, "image/png", target(Some(80), Some(80)), 85)
            .unwrap();
        assert_eq!(decoded_dimensions(&out), (80, 40));
    }

    #[test]
    fn test_transform_is_deterministic() {
        let data = png_bytes(100, 60);
        let a = ImageTransformer::transform(&data, "image/png", target(Some(40), None), 70).unwrap();
        let b = ImageTransformer::transform(&data, "image/png", target(Some(40), None), 70).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_transform_garbage_fails() {
        let result =
            ImageTransformer::transform(b"not an image", "image/png", target(Some(10), None), 85);
        assert!(result.is_err());
    }

    #[test]
    fn test_transform_svg_fails() {
        // No raster encoder: the caller falls back to the original bytes.
        let svg = b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>";
        let result =
            ImageTransformer::transform(svg, "image/svg+xml", target(Some(10), None), 85);
        assert!(result.is_err());
    }

    #[test]
    fn test_transform_keeps_stored_format() {
        let data = png_bytes(64, 64);
        let out =
            ImageTransformer::transform(&data, "image/png", target(Some(32), None), 85).unwrap();
        // PNG magic bytes
        assert_eq!(&out[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }
}
