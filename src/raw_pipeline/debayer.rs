//! Debayering module
//!
//! One [`DebayEngine`] implementation per external raw developer. The engine is
//! picked once at startup; every job then gets a temporary intermediate image
//! in the cache directory from it.

mod engine;
pub mod dcraw;
pub mod rawtherapee;
pub mod darktable;
pub mod profile;
pub mod intermediate;


pub use engine::{DebayEngine, build_engine, ensure_artifact};
pub use dcraw::DcrawEngine;
pub use rawtherapee::RawTherapeeEngine;
pub use darktable::DarktableEngine;
pub use profile::{DerivedProfile, derive_ca_profile};
pub use intermediate::probe_dimensions;
