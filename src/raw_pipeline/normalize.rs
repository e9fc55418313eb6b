//! Normalization module
//!
//! Turns an intermediate into the final half-float EXR with a single `oiiotool` call.

mod oiiotool;


pub use oiiotool::{Normalizer, OUTPUT_BIT_DEPTH, build_normalize_args};
