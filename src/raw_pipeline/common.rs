//! Common utilities module
//!
//! This module contains the error type and stage timing helpers shared across the pipeline.

pub mod error;
pub mod timing;

pub use error::{ConversionError, Result};
pub use timing::{StageTimings, StepTiming, Timer};
