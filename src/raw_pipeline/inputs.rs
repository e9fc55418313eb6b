//! Input resolution module
//!
//! Turns user supplied files and directories into sorted, deduplicated job lists.

pub mod extensions;
pub mod job;
mod resolver;

#[cfg(test)]
mod tests;

pub use extensions::{RAW_EXTENSIONS, is_raw_extension};
pub use job::{JobDescriptor, OUTPUT_EXTENSION};
pub use resolver::{InputResolver, ResolvedInputs, resolve_inputs, walk_root};
