//! Error Types
//!
//! Sinew separates three kinds of failure:
//!
//! - **Programming errors** (an out-of-range joint index, a cloned hierarchy
//!   that no longer contains a joint) panic. They mean the caller broke a
//!   precondition and there is nothing sensible to recover.
//! - **Data-shape violations** (an animation channel whose value array does
//!   not match its key layout) are reported through [`SinewError`].
//! - **Absence** (a lookup that finds nothing) is `None`, never an error.
//!
//! ```rust,ignore
//! use sinew_core::{Result, SinewError};
//!
//! fn check(len: usize) -> Result<()> {
//!     if len % 10 != 0 {
//!         return Err(SinewError::MalformedChannel { target: "hip".into(), len, stride: 10 });
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for Sinew.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinewError {
    // ========================================================================
    // Animation Data Errors
    // ========================================================================
    /// The channel's value array is not a whole number of keys.
    #[error(
        "Malformed channel targeting '{target}': {len} key values is not a multiple of {stride}"
    )]
    MalformedChannel {
        /// Identifier of the channel's target
        target: String,
        /// Length of the key value array
        len: usize,
        /// Components per key required by the target attribute
        stride: usize,
    },

    /// The channel's value array does not match its key time array.
    #[error(
        "Channel targeting '{target}' has {times} key times but values for {values} keys"
    )]
    KeyCountMismatch {
        /// Identifier of the channel's target
        target: String,
        /// Number of key times
        times: usize,
        /// Number of keys implied by the value array
        values: usize,
    },

    // ========================================================================
    // Scene Errors
    // ========================================================================
    /// A handle no longer refers to a live object.
    #[error("Stale handle: {0}")]
    StaleHandle(String),
}

/// Alias for `Result<T, SinewError>`.
pub type Result<T> = std::result::Result<T, SinewError>;
