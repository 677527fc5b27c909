use sinew_core::math::slices_equal;
use sinew_core::{Result, SinewError};

use crate::target::{InterpolationMode, TargetAttribute};

/// A keyframed time series driving one attribute of one target.
///
/// All key data is stored flat:
/// - `key_times[i]` is the time of key `i`
/// - `key_values[i * n .. (i + 1) * n]` is its value, with
///   `n = target_attribute.components_per_key()`
/// - `tangents_in` / `tangents_out` use the same per-key grouping when present
/// - `interpolations` holds one mode per key, or a single mode for all keys
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationChannel {
    target_id: String,
    target_attribute: TargetAttribute,
    key_times: Vec<f32>,
    key_values: Vec<f32>,
    tangents_in: Vec<f32>,
    tangents_out: Vec<f32>,
    interpolations: Vec<InterpolationMode>,
}

impl AnimationChannel {
    #[must_use]
    pub fn new(target_id: impl Into<String>, target_attribute: TargetAttribute) -> Self {
        Self {
            target_id: target_id.into(),
            target_attribute,
            key_times: Vec::new(),
            key_values: Vec::new(),
            tangents_in: Vec::new(),
            tangents_out: Vec::new(),
            interpolations: Vec::new(),
        }
    }

    // === Builder-style setters ===

    #[must_use]
    pub fn with_keys(mut self, key_times: Vec<f32>, key_values: Vec<f32>) -> Self {
        self.key_times = key_times;
        self.key_values = key_values;
        self
    }

    #[must_use]
    pub fn with_tangents(mut self, tangents_in: Vec<f32>, tangents_out: Vec<f32>) -> Self {
        self.tangents_in = tangents_in;
        self.tangents_out = tangents_out;
        self
    }

    #[must_use]
    pub fn with_interpolations(mut self, interpolations: Vec<InterpolationMode>) -> Self {
        self.interpolations = interpolations;
        self
    }

    // === Accessors ===

    #[inline]
    #[must_use]
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn set_target_id(&mut self, target_id: impl Into<String>) {
        self.target_id = target_id.into();
    }

    #[inline]
    #[must_use]
    pub fn target_attribute(&self) -> TargetAttribute {
        self.target_attribute
    }

    pub fn set_target_attribute(&mut self, target_attribute: TargetAttribute) {
        self.target_attribute = target_attribute;
    }

    #[inline]
    #[must_use]
    pub fn key_times(&self) -> &[f32] {
        &self.key_times
    }

    pub fn set_key_times(&mut self, key_times: Vec<f32>) {
        self.key_times = key_times;
    }

    #[inline]
    #[must_use]
    pub fn key_values(&self) -> &[f32] {
        &self.key_values
    }

    pub fn set_key_values(&mut self, key_values: Vec<f32>) {
        self.key_values = key_values;
    }

    #[inline]
    #[must_use]
    pub fn tangents_in(&self) -> &[f32] {
        &self.tangents_in
    }

    pub fn set_tangents_in(&mut self, tangents: Vec<f32>) {
        self.tangents_in = tangents;
    }

    #[inline]
    #[must_use]
    pub fn tangents_out(&self) -> &[f32] {
        &self.tangents_out
    }

    pub fn set_tangents_out(&mut self, tangents: Vec<f32>) {
        self.tangents_out = tangents;
    }

    #[inline]
    #[must_use]
    pub fn interpolations(&self) -> &[InterpolationMode] {
        &self.interpolations
    }

    pub fn set_interpolations(&mut self, interpolations: Vec<InterpolationMode>) {
        self.interpolations = interpolations;
    }

    // === Derived data ===

    #[inline]
    #[must_use]
    pub fn components_per_key(&self) -> usize {
        self.target_attribute.components_per_key()
    }

    #[inline]
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.key_times.len()
    }

    /// Value tuple of key `index`, or `None` past the end of the value array.
    #[must_use]
    pub fn key_value(&self, index: usize) -> Option<&[f32]> {
        let stride = self.components_per_key();
        self.key_values.get(index * stride..(index + 1) * stride)
    }

    /// Time between the first and last key; zero with fewer than two keys.
    #[must_use]
    pub fn duration(&self) -> f32 {
        match (self.key_times.first(), self.key_times.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    /// Checks that the value array holds exactly one tuple per key time.
    pub fn validate(&self) -> Result<()> {
        let stride = self.components_per_key();
        let len = self.key_values.len();
        if len % stride != 0 {
            return Err(SinewError::MalformedChannel {
                target: self.target_id.clone(),
                len,
                stride,
            });
        }
        if len / stride != self.key_times.len() {
            return Err(SinewError::KeyCountMismatch {
                target: self.target_id.clone(),
                times: self.key_times.len(),
                values: len / stride,
            });
        }
        Ok(())
    }

    /// Collapses runs of identical keys.
    ///
    /// Every run of three or more consecutive keys with identical values keeps
    /// only its first and last key, so the timing of the hold is unchanged.
    /// Keys whose tangents differ are not identical, even when their values
    /// match.
    /// Returns the number of keys removed.
    pub fn remove_duplicates(&mut self) -> usize {
        let stride = self.components_per_key();
        if stride == 0 {
            return 0;
        }
        let key_count = self.key_times.len();
        let tangent_in_stride = per_key_stride(self.tangents_in.len(), key_count);
        let tangent_out_stride = per_key_stride(self.tangents_out.len(), key_count);
        let per_key_interpolation = self.interpolations.len() == key_count;

        let comparable = key_count.min(self.key_values.len() / stride);
        let runs = crate::duplicates::interior_runs(comparable, |a, b| {
            same_key(&self.key_values, stride, a, b)
                && tangent_in_stride.is_none_or(|n| same_key(&self.tangents_in, n, a, b))
                && tangent_out_stride.is_none_or(|n| same_key(&self.tangents_out, n, a, b))
        });
        if runs.is_empty() {
            return 0;
        }

        let mut removed = 0;
        // Back to front so earlier ranges keep their indices.
        for range in runs.iter().rev() {
            self.key_times.drain(range.clone());
            self.key_values.drain(range.start * stride..range.end * stride);
            if let Some(n) = tangent_in_stride {
                self.tangents_in.drain(range.start * n..range.end * n);
            }
            if let Some(n) = tangent_out_stride {
                self.tangents_out.drain(range.start * n..range.end * n);
            }
            if per_key_interpolation {
                self.interpolations.drain(range.clone());
            }
            removed += range.len();
        }

        log::trace!(
            "Removed {removed} duplicate keys from {:?} channel '{}'",
            self.target_attribute,
            self.target_id
        );
        removed
    }
}

fn same_key(array: &[f32], stride: usize, a: usize, b: usize) -> bool {
    slices_equal(&array[a * stride..(a + 1) * stride], &array[b * stride..(b + 1) * stride])
}

/// Floats per key of a per-key array, or `None` when the array is not laid
/// out per key (empty, or not evenly divisible).
fn per_key_stride(len: usize, key_count: usize) -> Option<usize> {
    if len == 0 || key_count == 0 || len % key_count != 0 {
        None
    } else {
        Some(len / key_count)
    }
}
