//! Foundational types shared by every Sinew crate.
//!
//! - [`errors`]: the [`SinewError`] type and the crate-wide [`Result`] alias
//! - [`bounds`]: axis-aligned [`BoundingBox`]
//! - [`math`]: float comparison helpers

pub mod bounds;
pub mod errors;
pub mod math;

pub use bounds::BoundingBox;
pub use errors::{Result, SinewError};
