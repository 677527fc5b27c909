//! Offline optimization of transform animations.
//!
//! - [`RefTable`]: identifier → object lookup used to classify channel targets
//! - [`OptimizeSettings`]: tolerances and toggles for the optimization pass
//! - [`optimize_transform_animations`]: splits combined scale/rotate/translate
//!   channels on joints into separate channels

pub mod optimize;
pub mod ref_table;
pub mod settings;

pub use optimize::{DecomposeReport, decompose_animation, optimize_transform_animations};
pub use ref_table::{RefObject, RefTable};
pub use settings::OptimizeSettings;
