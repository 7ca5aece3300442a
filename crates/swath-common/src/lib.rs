//! Common types shared across the swath-river crates and services.

pub mod bbox;
pub mod crs;
pub mod error;

pub use bbox::BoundingBox;
pub use crs::{CrsCode, Hemisphere};
pub use error::{PipelineError, PipelineResult};
