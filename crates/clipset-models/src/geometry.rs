//! Crop rectangle geometry and reference-frame rescaling.
//!
//! Manifests are authored against a canonical reference resolution, while
//! the decoded sources they describe may have been re-encoded at a
//! different size. Rescaling maps the authored rectangle onto the actual
//! frame so the same manifest works against any copy of the footage.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from crop-window computation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("reference frame dimension is zero")]
    ZeroReference,

    #[error("degenerate crop window after rescaling: ({left},{top})-({right},{bottom})")]
    Degenerate {
        left: u32,
        top: u32,
        right: u32,
        bottom: u32,
    },
}

/// A crop rectangle in reference-frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropRect {
    pub fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// Map this rectangle from the reference frame onto the actual decoded
    /// frame size.
    ///
    /// Each edge scales independently as `floor(edge * actual / reference)`,
    /// horizontal edges by width and vertical edges by height. The result
    /// preserves the input rectangle exactly when the sizes match.
    ///
    /// # Errors
    ///
    /// `ZeroReference` if either reference dimension is zero, `Degenerate`
    /// if integer truncation collapses the window to zero width or height.
    pub fn rescale(
        &self,
        ref_width: u32,
        ref_height: u32,
        width: u32,
        height: u32,
    ) -> Result<CropWindow, GeometryError> {
        if ref_width == 0 || ref_height == 0 {
            return Err(GeometryError::ZeroReference);
        }

        // u64 intermediates: edge * actual can exceed u32 for large frames.
        let scale = |edge: u32, actual: u32, reference: u32| -> u32 {
            (u64::from(edge) * u64::from(actual) / u64::from(reference)) as u32
        };

        let window = CropWindow {
            left: scale(self.left, width, ref_width),
            top: scale(self.top, height, ref_height),
            right: scale(self.right, width, ref_width),
            bottom: scale(self.bottom, height, ref_height),
        };

        if window.right <= window.left || window.bottom <= window.top {
            return Err(GeometryError::Degenerate {
                left: window.left,
                top: window.top,
                right: window.right,
                bottom: window.bottom,
            });
        }

        Ok(window)
    }
}

/// A crop rectangle in actual decoded-frame pixel coordinates.
///
/// Produced by [`CropRect::rescale`]; the selected region is
/// `width() x height()` pixels with its top-left corner at (`left`, `top`),
/// matching what FFmpeg's `crop` filter expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropWindow {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropWindow {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rescale_identity() {
        let rect = CropRect::new(100, 50, 600, 400);
        let window = rect.rescale(1280, 720, 1280, 720).unwrap();
        assert_eq!(
            window,
            CropWindow {
                left: 100,
                top: 50,
                right: 600,
                bottom: 400
            }
        );
    }

    #[test]
    fn test_rescale_half_resolution() {
        let rect = CropRect::new(100, 50, 600, 400);
        let window = rect.rescale(1280, 720, 640, 360).unwrap();
        assert_eq!(
            window,
            CropWindow {
                left: 50,
                top: 25,
                right: 300,
                bottom: 200
            }
        );
    }

    #[test]
    fn test_rescale_integer_factor_is_exact() {
        let rect = CropRect::new(3, 7, 11, 13);
        for k in [2u32, 3, 5] {
            let window = rect.rescale(100, 100, 100 * k, 100 * k).unwrap();
            assert_eq!(window.left, 3 * k);
            assert_eq!(window.top, 7 * k);
            assert_eq!(window.right, 11 * k);
            assert_eq!(window.bottom, 13 * k);
        }
    }

    #[test]
    fn test_rescale_truncates_toward_zero() {
        // 3 * 2 / 4 = 1.5 -> 1
        let rect = CropRect::new(3, 3, 5, 5);
        let window = rect.rescale(4, 4, 2, 2).unwrap();
        assert_eq!(window.left, 1);
        assert_eq!(window.right, 2);
    }

    #[test]
    fn test_rescale_degenerate_window() {
        // A 1px-wide rectangle collapses when downscaled 4x.
        let rect = CropRect::new(2, 0, 3, 100);
        let err = rect.rescale(400, 400, 100, 100).unwrap_err();
        assert!(matches!(err, GeometryError::Degenerate { .. }));
    }

    #[test]
    fn test_rescale_zero_reference() {
        let rect = CropRect::new(0, 0, 10, 10);
        assert_eq!(
            rect.rescale(0, 100, 100, 100),
            Err(GeometryError::ZeroReference)
        );
        assert_eq!(
            rect.rescale(100, 0, 100, 100),
            Err(GeometryError::ZeroReference)
        );
    }

    #[test]
    fn test_rescale_large_frame_no_overflow() {
        let rect = CropRect::new(0, 0, 7680, 4320);
        let window = rect.rescale(7680, 4320, 7680, 4320).unwrap();
        assert_eq!(window.width(), 7680);
        assert_eq!(window.height(), 4320);
    }
}
