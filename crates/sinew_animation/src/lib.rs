//! Keyframed animation data.
//!
//! An [`Animation`] is an ordered list of [`AnimationChannel`]s. Each channel
//! animates one attribute ([`TargetAttribute`]) of one target, identified by
//! name, and stores its keys as flat `f32` arrays.

pub mod animation;
pub mod channel;
mod duplicates;
pub mod target;

pub use animation::{Animation, Animations};
pub use channel::AnimationChannel;
pub use target::{InterpolationMode, TargetAttribute};
