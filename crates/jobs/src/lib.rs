//! Jobs domain module.
//!
//! Business rules for job postings, implemented as deterministic domain logic
//! (no IO, no HTTP, no storage).

pub mod job;

pub use job::{JOB_TYPE_ERROR, Job, JobPatch, JobType, NewJob};
