//! Raw to scene-linear EXR batch pipeline
//!
//! Input paths are resolved into job descriptors, each job is debayered by an
//! external engine into a temporary intermediate, normalized into a half-float
//! EXR by `oiiotool`, and the intermediate is removed again.

pub mod common;
pub mod config;
pub mod inputs;
pub mod process;
pub mod debayer;
pub mod normalize;
pub mod scheduler;
mod converter;

#[cfg(test)]
pub(crate) mod testing;

pub use common::{
    ConversionError,
    Result,
    StageTimings,
    Timer,
};

pub use config::{
    ColorMatrix,
    EngineKind,
    ExrCompression,
    ResizeSpec,
    ResolvedTools,
    RunConfiguration,
    RunConfigurationBuilder,
    ToolPaths,
};

pub use inputs::{
    InputResolver,
    JobDescriptor,
    ResolvedInputs,
    resolve_inputs,
    walk_root,
};

pub use process::{
    CommandOutput,
    Invocation,
    ProcessRunner,
    SystemRunner,
};

pub use debayer::{
    DebayEngine,
    DerivedProfile,
    build_engine,
    derive_ca_profile,
};

pub use normalize::Normalizer;

pub use scheduler::{
    BatchReport,
    BatchScheduler,
    JobOutcome,
    JobReport,
    JobState,
};

pub use converter::{Converter, RunSummary};
