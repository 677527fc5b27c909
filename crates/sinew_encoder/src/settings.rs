//! Optimization Settings
//!
//! ```rust,ignore
//! use sinew_encoder::OptimizeSettings;
//!
//! // Keep every key, but treat scales within 1e-5 of one as identity.
//! let settings = OptimizeSettings {
//!     scale_epsilon: 1e-5,
//!     remove_duplicates: false,
//! };
//! ```

use serde::{Deserialize, Serialize};
use sinew_core::math::NEAR_ONE_EPSILON;

/// Configuration for [`optimize_transform_animations`](crate::optimize_transform_animations).
///
/// | Field               | Description                                        | Default  |
/// |---------------------|----------------------------------------------------|----------|
/// | `scale_epsilon`     | Tolerance for treating a scale component as 1.0   | `1.2e-7` |
/// | `remove_duplicates` | Collapse runs of identical keys in new channels    | `true`   |
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizeSettings {
    /// A scale channel is dropped when every component satisfies
    /// `|v - 1| < scale_epsilon`.
    pub scale_epsilon: f32,

    /// Run [`AnimationChannel::remove_duplicates`](sinew_animation::AnimationChannel::remove_duplicates)
    /// on every emitted channel.
    pub remove_duplicates: bool,
}

impl Default for OptimizeSettings {
    fn default() -> Self {
        Self {
            scale_epsilon: NEAR_ONE_EPSILON,
            remove_duplicates: true,
        }
    }
}
