//! Batch scheduling module
//!
//! Fans one batch of jobs out over a fixed-size worker pool and collects a
//! report per job.

mod batch;
mod report;
mod temp;


pub use batch::BatchScheduler;
pub use report::{BatchReport, JobOutcome, JobReport, JobState};
pub use temp::TempArtifact;
