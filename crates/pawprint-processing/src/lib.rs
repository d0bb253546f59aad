//! Pawprint Processing Library
//!
//! Validation, image transformation and the upload coordinator that turns a raw
//! submission into a stored, publicly addressable object.

pub mod image;
pub mod upload;
pub mod validator;

pub use crate::image::{ImageTransformer, TransformOutcome};
pub use crate::upload::{UploadCoordinator, UploadError, UploadReport, UploadState, UploadWarning};
pub use crate::validator::{UploadValidator, ValidationError};
