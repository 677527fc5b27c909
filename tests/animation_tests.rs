//! Animation Data Tests
//!
//! Tests for:
//! - TargetAttribute key layouts
//! - AnimationChannel validation, derived accessors and duplicate-key removal
//! - Animation / Animations containers

use sinew::{Animation, AnimationChannel, Animations, InterpolationMode, SinewError, TargetAttribute};

const EPSILON: f32 = 1e-6;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn scalar_channel(target: &str, values: &[f32]) -> AnimationChannel {
    let times = (0..values.len()).map(|i| i as f32 * 0.5).collect();
    AnimationChannel::new(target, TargetAttribute::TranslateX).with_keys(times, values.to_vec())
}

// ============================================================================
// TargetAttribute
// ============================================================================

#[test]
fn components_per_key_table() {
    use TargetAttribute::*;
    let expected = [
        (ScaleUnit, 1),
        (ScaleX, 1),
        (ScaleY, 1),
        (ScaleZ, 1),
        (TranslateX, 1),
        (TranslateY, 1),
        (TranslateZ, 1),
        (Scale, 3),
        (Rotate, 4),
        (Translate, 3),
        (RotateTranslate, 7),
        (ScaleTranslate, 6),
        (ScaleRotateTranslate, 10),
    ];
    for (attribute, n) in expected {
        assert_eq!(attribute.components_per_key(), n, "{attribute:?}");
    }
}

#[test]
fn target_attribute_serializes_by_name() {
    let json = serde_json::to_string(&TargetAttribute::ScaleRotateTranslate).unwrap();
    assert_eq!(json, "\"ScaleRotateTranslate\"");
    let mode: InterpolationMode = serde_json::from_str("\"BSpline\"").unwrap();
    assert_eq!(mode, InterpolationMode::BSpline);
}

// ============================================================================
// AnimationChannel
// ============================================================================

#[test]
fn channel_accessors() {
    let channel = scalar_channel("hip", &[1.0, 2.0, 3.0]);
    assert_eq!(channel.target_id(), "hip");
    assert_eq!(channel.key_count(), 3);
    assert_eq!(channel.components_per_key(), 1);
    assert_eq!(channel.key_value(2), Some(&[3.0][..]));
    assert!(approx(channel.duration(), 1.0));
}

#[test]
fn channel_setters_replace_data() {
    let mut channel = scalar_channel("hip", &[1.0]);
    channel.set_target_id("knee");
    channel.set_target_attribute(TargetAttribute::Translate);
    channel.set_key_times(vec![0.0, 1.0]);
    channel.set_key_values(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
    channel.set_interpolations(vec![InterpolationMode::Step]);

    assert_eq!(channel.target_id(), "knee");
    assert_eq!(channel.components_per_key(), 3);
    assert!(channel.validate().is_ok());
}

#[test]
fn validate_reports_malformed_values() -> anyhow::Result<()> {
    let ok = AnimationChannel::new("hip", TargetAttribute::Rotate)
        .with_keys(vec![0.0], vec![0.0, 0.0, 0.0, 1.0]);
    ok.validate()?;

    let bad = AnimationChannel::new("hip", TargetAttribute::ScaleRotateTranslate)
        .with_keys(vec![0.0, 1.0], vec![1.0; 15]);
    let err = bad.validate().unwrap_err();
    assert_eq!(
        err,
        SinewError::MalformedChannel {
            target: "hip".into(),
            len: 15,
            stride: 10
        }
    );
    assert!(err.to_string().contains("hip"));
    Ok(())
}

#[test]
fn remove_duplicates_collapses_interior_of_each_run() {
    let mut channel = scalar_channel("a", &[1.0, 1.0, 1.0, 2.0, 3.0, 3.0, 3.0, 3.0, 4.0]);
    let removed = channel.remove_duplicates();

    assert_eq!(removed, 3);
    assert_eq!(channel.key_values(), &[1.0, 1.0, 2.0, 3.0, 3.0, 4.0]);
    assert_eq!(channel.key_times(), &[0.0, 1.0, 1.5, 2.0, 3.5, 4.0]);
    assert!(channel.validate().is_ok());
}

#[test]
fn remove_duplicates_leaves_short_channels_alone() {
    let mut channel = scalar_channel("a", &[5.0, 5.0]);
    assert_eq!(channel.remove_duplicates(), 0);
    assert_eq!(channel.key_count(), 2);

    let mut changing = scalar_channel("a", &[1.0, 2.0, 1.0, 2.0]);
    assert_eq!(changing.remove_duplicates(), 0);
}

#[test]
fn remove_duplicates_keeps_keys_whose_tangents_differ() {
    let mut channel = AnimationChannel::new("a", TargetAttribute::ScaleUnit)
        .with_keys(vec![0.0, 1.0, 2.0], vec![5.0, 5.0, 5.0])
        .with_tangents(vec![0.0, 9.0, 0.0], vec![0.0, 0.0, 0.0])
        .with_interpolations(vec![InterpolationMode::Bezier; 3]);

    assert_eq!(channel.remove_duplicates(), 0);
    assert_eq!(channel.key_count(), 3);
    assert_eq!(channel.tangents_in(), &[0.0, 9.0, 0.0]);
}

#[test]
fn remove_duplicates_collapses_spline_hold_with_equal_tangents() {
    let mut channel = AnimationChannel::new("a", TargetAttribute::ScaleUnit)
        .with_keys(vec![0.0, 1.0, 2.0], vec![5.0, 5.0, 5.0])
        .with_tangents(vec![0.0; 3], vec![0.0; 3])
        .with_interpolations(vec![InterpolationMode::Bezier; 3]);

    assert_eq!(channel.remove_duplicates(), 1);
    assert_eq!(channel.key_times(), &[0.0, 2.0]);
    assert_eq!(channel.tangents_in(), &[0.0, 0.0]);
}

#[test]
fn remove_duplicates_compares_whole_tuples() {
    let mut channel = AnimationChannel::new("a", TargetAttribute::Scale).with_keys(
        vec![0.0, 1.0, 2.0],
        vec![1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 1.0, 1.0, 1.0],
    );
    assert_eq!(channel.remove_duplicates(), 0);
}

// ============================================================================
// Animation / Animations
// ============================================================================

#[test]
fn animation_channels_keep_insertion_order() {
    let mut animation = Animation::new("walk");
    assert_eq!(animation.add(scalar_channel("a", &[0.0])), 0);
    assert_eq!(animation.add(scalar_channel("b", &[0.0, 1.0, 2.0, 3.0])), 1);
    assert_eq!(animation.add(scalar_channel("a", &[0.0, 1.0])), 2);

    assert_eq!(animation.channel_count(), 3);
    assert_eq!(animation.channels_for("a").count(), 2);
    assert!(approx(animation.duration(), 1.5));

    animation.retain(|c| c.target_id() != "a");
    assert_eq!(animation.channel_count(), 1);
    assert_eq!(animation.channel(0).unwrap().target_id(), "b");
}

#[test]
fn animations_iterate_mutably() {
    let mut animations = Animations::new();
    animations.add(Animation::new("idle"));
    animations.add(Animation::new("run"));

    for animation in &mut animations {
        animation.add(scalar_channel("hip", &[0.0]));
    }

    assert!((&animations).into_iter().all(|a| a.channel_count() == 1));
    assert_eq!(animations.get(1).map(|a| a.id.as_str()), Some("run"));
    assert!(animations.get_mut(2).is_none());
}
