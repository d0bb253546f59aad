//! Upload pipeline: validate → transform → provision → key → store.
//!
//! [`UploadCoordinator`] runs one upload attempt as an explicit state machine
//! (`Idle → Validating → Transforming → Uploading → Completed | Failed | Cancelled`).
//! Only the validation and upload steps can end the run early; provisioning and
//! transformation degrade to warnings carried in the [`UploadReport`].
//! Validation runs before any network call.

pub mod coordinator;
pub mod state;
pub mod types;

pub use coordinator::UploadCoordinator;
pub use state::{UploadRun, UploadState};
pub use types::{UploadError, UploadReport, UploadWarning};
