//! External process module
//!
//! Every engine and the normalizer talk to their tool through [`ProcessRunner`],
//! so the pipeline can be driven without the real binaries.

mod invocation;
mod runner;


pub use invocation::Invocation;
pub use runner::{CommandOutput, ProcessRunner, SystemRunner};
