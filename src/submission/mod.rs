//! Drive submission: validation and the staged booking pipeline.

pub mod orchestrator;
pub mod validation;

pub use orchestrator::{submit_drive, Stage, SubmissionResult};
pub use validation::{validate_drive, EquipmentUsed, RawDriveEvent, ValidatedDrive};
