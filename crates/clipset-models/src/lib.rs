//! Shared data models for the clipset pipeline.
//!
//! This crate provides the pure, I/O-free core of the pipeline:
//! - Manifest records (`ClipSpec`) and their parsing rules
//! - Crop-rectangle geometry and reference-frame rescaling
//! - Deterministic artifact naming, including the two-stage
//!   audio/video naming contract

pub mod geometry;
pub mod manifest;
pub mod naming;

// Re-export common types
pub use geometry::{CropRect, CropWindow, GeometryError};
pub use manifest::{ClipSpec, ManifestError};
pub use naming::NamingError;
