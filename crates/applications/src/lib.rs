//! Applications domain module.
//!
//! A candidate applies to a published job at most once; applications are
//! immutable after creation.

pub mod application;

pub use application::{Application, ApplicationStatus, ApplyToJob, NewApplication};
