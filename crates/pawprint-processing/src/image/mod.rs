//! Image processing module
//!
//! Best-effort downscaling of raster uploads to the category's bounding box,
//! re-encoded in the uploaded format at the category's quality.

pub mod transformer;

pub use transformer::{ImageTransformer, TransformError, TransformOutcome};
