//! Run configuration module
//!
//! Everything a run needs is captured once in an immutable [`RunConfiguration`].

mod run_config;
mod tools;
pub mod types;


pub use run_config::{RunConfiguration, RunConfigurationBuilder, ToolPaths};
pub use tools::{ResolvedTools, resolve_binary};
pub use types::{ColorMatrix, EngineKind, ExrCompression, ResizeSpec};
