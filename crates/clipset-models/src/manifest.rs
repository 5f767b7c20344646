//! Manifest records: one clip edit instruction per line.
//!
//! A manifest is a UTF-8 text file with one comma-separated record per
//! line and no header:
//!
//! ```text
//! source_id,ref_height,ref_width,start_frame,end_frame,left,top,right,bottom
//! ```
//!
//! All fields except `source_id` are decimal integers. A record that does
//! not satisfy every invariant is rejected outright; nothing is corrected
//! silently.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::CropRect;

/// Number of comma-separated fields in a manifest record.
pub const RECORD_FIELDS: usize = 9;

/// Errors from parsing a single manifest record.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("expected {RECORD_FIELDS} comma-separated fields, found {0}")]
    FieldCount(usize),

    #[error("field `{field}` is not an unsigned integer: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("source id is empty")]
    EmptySourceId,

    #[error("end frame {end} precedes start frame {start}")]
    FrameOrder { start: u32, end: u32 },

    #[error(
        "crop rectangle ({left},{top})-({right},{bottom}) does not fit the \
         {ref_width}x{ref_height} reference frame"
    )]
    InvalidRectangle {
        left: u32,
        top: u32,
        right: u32,
        bottom: u32,
        ref_width: u32,
        ref_height: u32,
    },
}

/// One clip edit instruction from the manifest.
///
/// Immutable once parsed. Frame numbers are an inclusive range; the crop
/// rectangle is expressed in the coordinates of the reference frame size
/// the manifest was authored against (see [`crate::geometry`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipSpec {
    /// Identifier of the source recording; also the basis of every
    /// artifact name (see [`crate::naming`]).
    pub source_id: String,
    /// Height the crop coordinates were authored against.
    pub ref_height: u32,
    /// Width the crop coordinates were authored against.
    pub ref_width: u32,
    /// First frame of the segment (inclusive).
    pub start_frame: u32,
    /// Last frame of the segment (inclusive).
    pub end_frame: u32,
    /// Crop rectangle in reference-frame coordinates.
    pub crop: CropRect,
}

impl ClipSpec {
    /// Parse one manifest line.
    ///
    /// Field order is
    /// `source_id,ref_height,ref_width,start_frame,end_frame,left,top,right,bottom`.
    pub fn parse_line(line: &str) -> Result<Self, ManifestError> {
        let fields: Vec<&str> = line.trim().split(',').collect();
        if fields.len() != RECORD_FIELDS {
            return Err(ManifestError::FieldCount(fields.len()));
        }

        let source_id = fields[0].trim();
        if source_id.is_empty() {
            return Err(ManifestError::EmptySourceId);
        }

        let num = |field: &'static str, value: &str| -> Result<u32, ManifestError> {
            value.trim().parse().map_err(|_| ManifestError::InvalidNumber {
                field,
                value: value.trim().to_string(),
            })
        };

        let ref_height = num("ref_height", fields[1])?;
        let ref_width = num("ref_width", fields[2])?;
        let start_frame = num("start_frame", fields[3])?;
        let end_frame = num("end_frame", fields[4])?;
        let left = num("left", fields[5])?;
        let top = num("top", fields[6])?;
        let right = num("right", fields[7])?;
        let bottom = num("bottom", fields[8])?;

        if end_frame < start_frame {
            return Err(ManifestError::FrameOrder {
                start: start_frame,
                end: end_frame,
            });
        }

        if left >= right || right > ref_width || top >= bottom || bottom > ref_height {
            return Err(ManifestError::InvalidRectangle {
                left,
                top,
                right,
                bottom,
                ref_width,
                ref_height,
            });
        }

        Ok(Self {
            source_id: source_id.to_string(),
            ref_height,
            ref_width,
            start_frame,
            end_frame,
            crop: CropRect::new(left, top, right, bottom),
        })
    }

    /// Number of frames in the trimmed segment (inclusive range).
    pub fn frame_count(&self) -> u32 {
        self.end_frame - self.start_frame + 1
    }
}
