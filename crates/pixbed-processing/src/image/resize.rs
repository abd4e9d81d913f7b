//! Resize geometry and filtering
//!
//! Delivery resizes with a "fit inside, never enlarge" policy: the output
//! never exceeds the requested box in either dimension and never exceeds the
//! original. A missing dimension is completed from the original aspect
//! ratio, rounded to the nearest pixel.

use image::{DynamicImage, GenericImageView};

/// Requested output box. At most the box is filled; aspect ratio is always
/// preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResizeTarget {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ResizeTarget {
    pub fn is_empty(&self) -> bool {
        self.width.is_none() && self.height.is_none()
    }
}

/// Compute the output dimensions for fitting `(orig_width, orig_height)`
/// inside `target` without enlarging. Returns `None` when no resize is
/// needed (no target, or the original already fits).
pub fn fit_within(orig_width: u32, orig_height: u32, target: ResizeTarget) -> Option<(u32, u32)> {
    if orig_width == 0 || orig_height == 0 {
        return None;
    }

    let scale = match (target.width, target.height) {
        (None, None) => return None,
        (Some(w), None) => w as f64 / orig_width as f64,
        (None, Some(h)) => h as f64 / orig_height as f64,
        (Some(w), Some(h)) => {
            (w as f64 / orig_width as f64).min(h as f64 / orig_height as f64)
        }
    }
    .min(1.0);

    let out_width = ((orig_width as f64 * scale).round() as u32).max(1);
    let out_height = ((orig_height as f64 * scale).round() as u32).max(1);

    if (out_width, out_height) == (orig_width, orig_height) {
        None
    } else {
        Some((out_width, out_height))
    }
}

/// Select the interpolation filter based on the downscale ratio: cheap
/// filters for heavy reductions, Lanczos for near-1:1 work.
pub fn select_filter(
    orig_width: u32,
    orig_height: u32,
    new_width: u32,
    new_height: u32,
) -> image::imageops::FilterType {
    let width_ratio = orig_width as f32 / new_width as f32;
    let height_ratio = orig_height as f32 / new_height as f32;
    let max_ratio = width_ratio.max(height_ratio);

    if max_ratio > 2.0 {
        image::imageops::FilterType::Triangle
    } else if max_ratio > 1.5 {
        image::imageops::FilterType::CatmullRom
    } else {
        image::imageops::FilterType::Lanczos3
    }
}

/// Resize to exact output dimensions with a ratio-appropriate filter.
pub fn resize_image(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
    let (orig_width, orig_height) = img.dimensions();
    let filter = select_filter(orig_width, orig_height, width, height);
    img.resize_exact(width, height, filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn target(width: Option<u32>, height: Option<u32>) -> ResizeTarget {
        ResizeTarget { width, height }
    }

    #[test]
    fn test_fit_within_no_target() {
        assert_eq!(fit_within(100, 100, target(None, None)), None);
    }

    #[test]
    fn test_fit_within_width_only_preserves_aspect() {
        // 100x60 at w=50 -> 50x30
        assert_eq!(fit_within(100, 60, target(Some(50), None)), Some((50, 30)));
        // rounding to nearest: 100x75 at w=50 -> 50x38 (37.5 rounds up)
        assert_eq!(fit_within(100, 75, target(Some(50), None)), Some((50, 38)));
    }

    #[test]
    fn test_fit_within_height_only_preserves_aspect() {
        assert_eq!(fit_within(100, 60, target(None, Some(30))), Some((50, 30)));
    }

    #[test]
    fn test_fit_within_box_fits_inside() {
        // 100x60 into a 50x50 box -> limited by width: 50x30
        assert_eq!(
            fit_within(100, 60, target(Some(50), Some(50))),
            Some((50, 30))
        );
        // 60x100 into a 50x50 box -> limited by height: 30x50
        assert_eq!(
            fit_within(60, 100, target(Some(50), Some(50))),
            Some((30, 50))
        );
    }

    #[test]
    fn test_fit_within_never_enlarges() {
        assert_eq!(fit_within(100, 60, target(Some(200), None)), None);
        assert_eq!(fit_within(100, 60, target(None, Some(120))), None);
        assert_eq!(fit_within(100, 60, target(Some(500), Some(500))), None);
        // One dimension above, one below: the box still binds
        assert_eq!(
            fit_within(100, 60, target(Some(500), Some(30))),
            Some((50, 30))
        );
    }

    #[test]
    fn test_fit_within_identity_is_none() {
        assert_eq!(fit_within(100, 60, target(Some(100), Some(60))), None);
    }

    #[test]
    fn test_fit_within_minimum_one_pixel() {
        // Extreme reduction still yields at least 1px per side
        assert_eq!(fit_within(1000, 2, target(Some(10), None)), Some((10, 1)));
    }

    #[test]
    fn test_select_filter_by_ratio() {
        use image::imageops::FilterType;
        assert_eq!(select_filter(100, 100, 30, 30), FilterType::Triangle);
        assert_eq!(select_filter(100, 100, 60, 60), FilterType::CatmullRom);
        assert_eq!(select_filter(100, 100, 90, 90), FilterType::Lanczos3);
    }

    #[test]
    fn test_resize_image_exact_dims() {
        let img =
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(100, 60, Rgba([0, 128, 255, 255])));
        let resized = resize_image(&img, 50, 30);
        assert_eq!(resized.dimensions(), (50, 30));
    }
}
