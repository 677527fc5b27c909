//! Transform Animation Decomposition
//!
//! Joint animations are often exported as one combined channel per joint
//! whose keys interleave scale, rotation and translation:
//!
//! ```text
//! key i: [sx, sy, sz, qx, qy, qz, qw, tx, ty, tz]
//! ```
//!
//! The optimizer replaces each such channel with separate `Scale`, `Rotate`
//! and `Translate` channels. A scale channel that never leaves 1.0 is dropped
//! entirely, and runs of identical keys in the new channels are collapsed.
//!
//! The pass runs in two phases. Qualifying channels are selected and
//! validated without touching anything; only when every one of them is well
//! formed are the replacement channels appended and the originals removed.

use std::ops::AddAssign;

use sinew_animation::{Animation, AnimationChannel, Animations, TargetAttribute};
use sinew_core::Result;
use sinew_core::math::is_almost_one;

use crate::ref_table::RefTable;
use crate::settings::OptimizeSettings;

const COMBINED_STRIDE: usize = TargetAttribute::ScaleRotateTranslate.components_per_key();
const SCALE_STRIDE: usize = TargetAttribute::Scale.components_per_key();
const ROTATE_STRIDE: usize = TargetAttribute::Rotate.components_per_key();

/// What an optimization pass changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecomposeReport {
    /// Combined channels that were split and removed.
    pub decomposed: usize,
    /// Channels appended in their place.
    pub channels_added: usize,
    /// Scale channels dropped because every component stayed at 1.0.
    pub scale_channels_elided: usize,
}

impl AddAssign for DecomposeReport {
    fn add_assign(&mut self, other: Self) {
        self.decomposed += other.decomposed;
        self.channels_added += other.channels_added;
        self.scale_channels_elided += other.scale_channels_elided;
    }
}

/// Splits every combined scale/rotate/translate channel that targets a joint
/// in `animation`.
///
/// Returns an error, leaving `animation` untouched, when any qualifying
/// channel's value array does not hold exactly ten floats per key.
pub fn decompose_animation(
    animation: &mut Animation,
    refs: &RefTable,
    settings: &OptimizeSettings,
) -> Result<DecomposeReport> {
    let selected = select_channels(animation, refs)?;
    let report = decompose_selected(animation, &selected, settings);
    log_report(&animation.id, &report);
    Ok(report)
}

/// Runs [`decompose_animation`] over every animation.
///
/// All animations are validated before any of them is changed.
pub fn optimize_transform_animations(
    animations: &mut Animations,
    refs: &RefTable,
    settings: &OptimizeSettings,
) -> Result<DecomposeReport> {
    let selections = animations
        .iter()
        .map(|animation| select_channels(animation, refs))
        .collect::<Result<Vec<_>>>()?;

    let mut total = DecomposeReport::default();
    for (animation, selected) in animations.iter_mut().zip(&selections) {
        let report = decompose_selected(animation, selected, settings);
        log_report(&animation.id, &report);
        total += report;
    }
    Ok(total)
}

// ============================================================================
// Phase 1: selection
// ============================================================================

/// Indices of the channels to split, in ascending order.
fn select_channels(animation: &Animation, refs: &RefTable) -> Result<Vec<usize>> {
    let mut selected = Vec::new();
    for (index, channel) in animation.channels().iter().enumerate() {
        if channel.target_attribute() != TargetAttribute::ScaleRotateTranslate {
            continue;
        }
        if !refs.get(channel.target_id()).is_some_and(|object| object.is_joint()) {
            continue;
        }
        channel.validate()?;
        selected.push(index);
    }
    Ok(selected)
}

// ============================================================================
// Phase 2: rewrite
// ============================================================================

fn decompose_selected(
    animation: &mut Animation,
    selected: &[usize],
    settings: &OptimizeSettings,
) -> DecomposeReport {
    let mut report = DecomposeReport::default();

    // Highest index first, so the last combined channel's replacements lead.
    for &index in selected.iter().rev() {
        let Some(channel) = animation.channel(index) else {
            continue;
        };
        let replacements = split_channel(channel, settings);

        report.decomposed += 1;
        report.channels_added += replacements.len();
        let kept_scale = replacements
            .first()
            .is_some_and(|c| c.target_attribute() == TargetAttribute::Scale);
        if !kept_scale {
            report.scale_channels_elided += 1;
        }
        for replacement in replacements {
            animation.add(replacement);
        }
    }

    // Replacements were appended after every original, so removing from the
    // back keeps the remaining indices valid.
    for &index in selected.iter().rev() {
        animation.remove(index);
    }
    report
}

/// Builds the scale (if kept), rotate and translate channels for one combined
/// channel.
fn split_channel(channel: &AnimationChannel, settings: &OptimizeSettings) -> Vec<AnimationChannel> {
    let key_count = channel.key_count();
    let mut scale = Vec::with_capacity(key_count * SCALE_STRIDE);
    let mut rotate = Vec::with_capacity(key_count * ROTATE_STRIDE);
    let mut translate = Vec::with_capacity(key_count * SCALE_STRIDE);

    for key in channel.key_values().chunks_exact(COMBINED_STRIDE) {
        let (s, rest) = key.split_at(SCALE_STRIDE);
        let (r, t) = rest.split_at(ROTATE_STRIDE);
        scale.extend_from_slice(s);
        rotate.extend_from_slice(r);
        translate.extend_from_slice(t);
    }

    // All or nothing: one component away from 1.0 keeps the whole channel.
    let keep_scale = !scale.iter().all(|&v| is_almost_one(v, settings.scale_epsilon));

    let mut out = Vec::with_capacity(3);
    if keep_scale {
        out.push(derive_channel(channel, TargetAttribute::Scale, scale, settings));
    } else {
        log::trace!("Dropping identity scale for '{}'", channel.target_id());
    }
    out.push(derive_channel(channel, TargetAttribute::Rotate, rotate, settings));
    out.push(derive_channel(channel, TargetAttribute::Translate, translate, settings));
    out
}

fn derive_channel(
    source: &AnimationChannel,
    attribute: TargetAttribute,
    values: Vec<f32>,
    settings: &OptimizeSettings,
) -> AnimationChannel {
    let mut channel = AnimationChannel::new(source.target_id(), attribute)
        .with_keys(source.key_times().to_vec(), values)
        .with_tangents(source.tangents_in().to_vec(), source.tangents_out().to_vec())
        .with_interpolations(source.interpolations().to_vec());
    if settings.remove_duplicates {
        channel.remove_duplicates();
    }
    channel
}

fn log_report(id: &str, report: &DecomposeReport) {
    if report.decomposed == 0 {
        return;
    }
    log::debug!(
        "Animation '{id}': split {} transform channels into {} ({} identity scales dropped)",
        report.decomposed,
        report.channels_added,
        report.scale_channels_elided
    );
}
