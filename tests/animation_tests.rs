//! Animation System Tests
//!
//! Tests for:
//! - KeyframeTrack construction, bracketing and blend factors
//! - Interpolatable implementations (Vec3 lerp, shortest-path Quat blend)
//! - KeyframeCursor O(1) optimization and binary search fallback
//! - AnimationClip import, channel lookup and tick wrapping
//! - AnimationAction time advance

use std::f32::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};

use myth_pose::animation::tracks::{Keyframe, KeyframeCursor, KeyframeTrack, TrackError};
use myth_pose::animation::values::{Interpolatable, blend_quat, blend_quat_normalized, lerp_vec3};
use myth_pose::animation::{AnimationClip, BoneAnimation};
use myth_pose::import::{AnimationSource, ChannelSource, QuatKey, SceneNode, SkinnedScene, VectorKey};
use myth_pose::settings::{ImportSettings, RotationBlend};
use myth_pose::{Avatar, PoseError, PoseSettings, SkinBone};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn track(times: &[f32], values: &[f32]) -> KeyframeTrack<Vec3> {
    KeyframeTrack::new(
        times.to_vec(),
        values.iter().map(|&v| Vec3::new(v, 0.0, 0.0)).collect(),
    )
    .unwrap()
}

// ============================================================================
// KeyframeTrack: Construction
// ============================================================================

#[test]
fn track_rejects_empty() {
    let err = KeyframeTrack::<Vec3>::new(vec![], vec![]).unwrap_err();
    assert_eq!(err, TrackError::Empty);
}

#[test]
fn track_rejects_length_mismatch() {
    let err = KeyframeTrack::new(vec![0.0, 1.0], vec![Vec3::ZERO]).unwrap_err();
    assert_eq!(err, TrackError::LengthMismatch { times: 2, values: 1 });
}

#[test]
fn track_rejects_decreasing_times() {
    let err = KeyframeTrack::new(vec![0.0, 2.0, 1.0], vec![Vec3::ZERO; 3]).unwrap_err();
    assert_eq!(err, TrackError::Decreasing { index: 2 });
}

#[test]
fn track_rejects_non_finite_time() {
    let err = KeyframeTrack::new(vec![0.0, f32::NAN], vec![Vec3::ZERO; 2]).unwrap_err();
    assert_eq!(err, TrackError::NonFiniteTime { index: 1 });
}

#[test]
fn track_rejects_non_finite_value() {
    let err = KeyframeTrack::new(vec![0.0, 1.0], vec![Vec3::new(f32::NAN, 0.0, 0.0), Vec3::ZERO]).unwrap_err();
    assert_eq!(err, TrackError::InvalidValue { index: 0 });
}

#[test]
fn track_rejects_zero_length_rotation() {
    let err = KeyframeTrack::new(vec![0.0, 1.0], vec![Quat::IDENTITY, Quat::from_xyzw(0.0, 0.0, 0.0, 0.0)])
        .unwrap_err();
    assert_eq!(err, TrackError::InvalidValue { index: 1 });

    let err = KeyframeTrack::constant(Quat::from_xyzw(f32::INFINITY, 0.0, 0.0, 1.0)).unwrap_err();
    assert_eq!(err, TrackError::InvalidValue { index: 0 });
}

#[test]
fn track_stores_unit_rotations() {
    let scaled = Quat::from_rotation_z(1.0) * 2.0;
    let t = KeyframeTrack::new(vec![0.0, 10.0], vec![scaled, scaled]).unwrap();
    for q in t.values() {
        assert!(approx(q.length(), 1.0), "len={}", q.length());
    }

    // Clamped samples return stored keys directly
    for time in [-5.0, 0.0, 10.0, 15.0] {
        let q = t.sample(time);
        assert!(approx(q.length(), 1.0), "t={time}: len={}", q.length());
        assert!(q.abs_diff_eq(Quat::from_rotation_z(1.0), EPSILON));
    }
}

#[test]
fn track_deduplicates_equal_times_keeping_first() {
    let _ = env_logger::builder().is_test(true).try_init();

    let t = track(&[0.0, 1.0, 1.0, 2.0], &[0.0, 10.0, 99.0, 20.0]);
    assert_eq!(t.len(), 3);
    assert_eq!(t.times(), &[0.0, 1.0, 2.0]);
    assert_eq!(t.values()[1].x, 10.0);
}

#[test]
fn track_from_keyframes() {
    let t = KeyframeTrack::from_keyframes([
        Keyframe::new(0.0, Vec3::ZERO),
        Keyframe::new(4.0, Vec3::X),
    ])
    .unwrap();
    assert_eq!(t.keyframe(1), Some(Keyframe::new(4.0, Vec3::X)));
    assert_eq!(t.keyframe(2), None);
    assert_eq!(t.end_time(), 4.0);
}

// ============================================================================
// KeyframeTrack: Bracketing
// ============================================================================

#[test]
fn bracket_interior() {
    let t = track(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 2.0, 3.0]);
    assert_eq!(t.bracket(0.5), (0, 1));
    assert_eq!(t.bracket(1.0), (1, 2));
    assert_eq!(t.bracket(2.99), (2, 3));
}

#[test]
fn bracket_before_first_collapses_to_first() {
    let t = track(&[1.0, 2.0], &[10.0, 20.0]);
    assert_eq!(t.bracket(0.5), (0, 0));
}

#[test]
fn bracket_single_keyframe() {
    let t = track(&[3.0], &[42.0]);
    assert_eq!(t.bracket(0.0), (0, 0));
    assert_eq!(t.bracket(3.0), (0, 0));
    assert_eq!(t.bracket(100.0), (0, 0));
}

#[test]
fn bracket_after_last_clamps_to_last() {
    let t = track(&[0.0, 1.0, 2.0], &[0.0, 10.0, 20.0]);
    assert_eq!(t.bracket(2.0), (2, 2));
    assert_eq!(t.bracket(50.0), (2, 2));
}

#[test]
fn blend_factor_fraction() {
    let t = track(&[2.0, 6.0], &[0.0, 1.0]);
    assert_eq!(t.blend_factor(0, 1, 3.0), Some(0.25));
    assert_eq!(t.blend_factor(0, 1, 2.0), Some(0.0));
}

#[test]
fn blend_factor_degenerate_is_none() {
    let t = track(&[2.0, 6.0], &[0.0, 1.0]);
    assert_eq!(t.blend_factor(1, 1, 6.0), None);
    assert_eq!(t.blend_factor(0, 5, 3.0), None);
}

// ============================================================================
// KeyframeTrack: Sampling
// ============================================================================

#[test]
fn sample_linear_midpoint() {
    let t = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![Vec3::ZERO, Vec3::new(10.0, 20.0, 30.0)],
    )
    .unwrap();
    let val = t.sample(0.5);
    assert!(approx(val.x, 5.0));
    assert!(approx(val.y, 10.0));
    assert!(approx(val.z, 15.0));
}

#[test]
fn sample_exact_keyframes() {
    let t = track(&[0.0, 1.0, 2.0], &[0.0, 10.0, 20.0]);
    assert_eq!(t.sample(0.0).x, 0.0);
    assert_eq!(t.sample(1.0).x, 10.0);
    assert_eq!(t.sample(2.0).x, 20.0);
}

#[test]
fn sample_clamps_outside_range() {
    let t = track(&[1.0, 2.0], &[10.0, 20.0]);
    assert_eq!(t.sample(0.0).x, 10.0);
    assert_eq!(t.sample(5.0).x, 20.0);
}

#[test]
fn sample_single_keyframe_is_constant() {
    let t = track(&[0.0], &[42.0]);
    assert_eq!(t.sample(-3.0).x, 42.0);
    assert_eq!(t.sample(7.0).x, 42.0);
}

#[test]
fn sample_quat_track_uses_shortest_path() {
    let q0 = Quat::IDENTITY;
    let q1 = -Quat::from_rotation_y(FRAC_PI_2);
    let t = KeyframeTrack::new(vec![0.0, 1.0], vec![q0, q1]).unwrap();

    let mid = t.sample(0.5);
    let expected = Quat::from_rotation_y(FRAC_PI_2 * 0.5);
    assert!(mid.angle_between(expected) < 1e-3, "angle={}", mid.angle_between(expected));
}

#[test]
fn quat_track_sample_always_normalizes() {
    let t = KeyframeTrack::new(vec![0.0, 2.0], vec![Quat::IDENTITY, Quat::from_rotation_z(FRAC_PI_2)]).unwrap();

    assert!(approx(t.sample(1.0).length(), 1.0));
    assert!(approx(t.sample_with_cursor(1.0, &mut KeyframeCursor::default()).length(), 1.0));

    // Raw blending goes through sample_by
    let raw = t.sample_by(1.0, None, |a: &Quat, b: &Quat, f| RotationBlend::Raw.blend(*a, *b, f));
    assert!(raw.length() < 0.99, "len={}", raw.length());
}

// ============================================================================
// KeyframeCursor: O(1) Sequential Access
// ============================================================================

#[test]
fn cursor_matches_stateless_sampling() {
    let t = track(&[0.0, 1.0, 2.0, 3.0, 4.0], &[0.0, 10.0, 5.0, 20.0, 15.0]);
    let mut cursor = KeyframeCursor::default();
    for i in 0..=50 {
        let time = i as f32 * 0.1;
        assert_eq!(
            t.bracket_with_cursor(time, &mut cursor),
            t.bracket(time),
            "t={time}"
        );
    }
}

#[test]
fn cursor_sequential_forward() {
    let t = track(&[0.0, 1.0, 2.0, 3.0, 4.0], &[0.0, 10.0, 20.0, 30.0, 40.0]);
    let mut cursor = KeyframeCursor::default();
    for i in 0..=20 {
        let time = i as f32 * 0.2;
        let val = t.sample_with_cursor(time, &mut cursor);
        assert!(approx(val.x, time * 10.0), "t={time}: got {}", val.x);
    }
    assert_eq!(cursor.last_index, 4);
}

#[test]
fn cursor_forward_then_jump_back() {
    let t = track(&[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0]);
    let mut cursor = KeyframeCursor::default();

    assert!(approx(t.sample_with_cursor(5.5, &mut cursor).x, 55.0));
    assert_eq!(cursor.last_index, 5);

    // Large jump back: binary search fallback
    assert!(approx(t.sample_with_cursor(0.5, &mut cursor).x, 5.0));
    assert_eq!(cursor.last_index, 0);
}

#[test]
fn cursor_short_step_back() {
    let t = track(&[0.0, 1.0, 2.0, 3.0], &[0.0, 10.0, 20.0, 30.0]);
    let mut cursor = KeyframeCursor { last_index: 2 };
    assert_eq!(t.bracket_with_cursor(1.5, &mut cursor), (1, 2));
    assert_eq!(t.bracket_with_cursor(-1.0, &mut cursor), (0, 0));
}

#[test]
fn cursor_stale_index_is_clamped() {
    let t = track(&[0.0, 1.0], &[0.0, 10.0]);
    let mut cursor = KeyframeCursor { last_index: 40 };
    assert!(approx(t.sample_with_cursor(0.5, &mut cursor).x, 5.0));
}

// ============================================================================
// Interpolatable Implementations
// ============================================================================

#[test]
fn lerp_vec3_endpoints_are_exact() {
    let a = Vec3::new(0.1, -3.7, 1e-3);
    let b = Vec3::new(0.3, 8.25, -7.1);
    assert_eq!(lerp_vec3(a, b, 0.0), a);
    assert_eq!(lerp_vec3(a, b, 1.0), b);
    assert_eq!(Vec3::interpolate_linear(&a, &b, 0.0), a);
    assert_eq!(Vec3::interpolate_linear(&a, &b, 1.0), b);
}

#[test]
fn lerp_vec3_quarter() {
    let result = lerp_vec3(Vec3::ZERO, Vec3::new(4.0, 8.0, -12.0), 0.25);
    assert_eq!(result, Vec3::new(1.0, 2.0, -3.0));
}

#[test]
fn quat_blend_flips_opposite_hemisphere() {
    let a = Quat::from_rotation_z(0.2);
    let b = Quat::from_rotation_z(0.6);
    let flipped = blend_quat(a, -b, 0.5);
    let plain = blend_quat(a, b, 0.5);
    assert!((flipped - plain).length() < 1e-6);
}

#[test]
fn quat_blend_raw_is_not_unit() {
    let raw = blend_quat(Quat::IDENTITY, Quat::from_rotation_z(FRAC_PI_2), 0.5);
    assert!(raw.length() < 0.99, "len={}", raw.length());

    let normalized = blend_quat_normalized(Quat::IDENTITY, Quat::from_rotation_z(FRAC_PI_2), 0.5);
    assert!(approx(normalized.length(), 1.0));
}

#[test]
fn quat_blend_normalizes_endpoints() {
    let a = Quat::from_xyzw(0.0, 0.0, 0.0, 2.0);
    let b = Quat::from_rotation_x(1.0) * 3.0;
    assert!(blend_quat(a, b, 0.0).abs_diff_eq(Quat::IDENTITY, 1e-6));
    assert!(blend_quat(a, b, 1.0).abs_diff_eq(Quat::from_rotation_x(1.0), 1e-6));
}

#[test]
fn quat_blend_sign_correction_is_monotonic() {
    let start = Quat::from_rotation_y(0.1);
    let end_rotation = Quat::from_rotation_y(2.5);
    // Same rotation as end_rotation, opposite sign
    let end = -end_rotation;

    for blend in [RotationBlend::Normalized, RotationBlend::Raw] {
        let mut last_from_start = -1.0_f32;
        let mut last_to_end = f32::INFINITY;
        for i in 0..=20 {
            let t = i as f32 / 20.0;
            let q = blend.blend(start, end, t).normalize();
            let from_start = q.angle_between(start);
            let to_end = q.angle_between(end_rotation);
            assert!(from_start >= last_from_start - 1e-4, "{blend:?} t={t}: {from_start} < {last_from_start}");
            assert!(to_end <= last_to_end + 1e-4, "{blend:?} t={t}: {to_end} > {last_to_end}");
            last_from_start = from_start;
            last_to_end = to_end;
        }
        assert!(last_from_start < PI / 1.2);
    }
}

// ============================================================================
// BoneAnimation
// ============================================================================

#[test]
fn channel_without_tracks_is_identity() {
    let channel = BoneAnimation::new("bone");
    assert_eq!(channel.local_transform(3.0, RotationBlend::Normalized), Mat4::IDENTITY);
}

#[test]
fn channel_composes_translation_rotation_scale() {
    let channel = BoneAnimation::new("bone")
        .with_position(KeyframeTrack::constant(Vec3::new(1.0, 2.0, 3.0)).unwrap())
        .with_rotation(KeyframeTrack::constant(Quat::from_rotation_z(FRAC_PI_2)).unwrap())
        .with_scale(KeyframeTrack::constant(Vec3::splat(2.0)).unwrap());

    let m = channel.local_transform(0.0, RotationBlend::Normalized);
    // Scale, then rotate, then translate
    let p = m.transform_point3(Vec3::X);
    assert!(p.abs_diff_eq(Vec3::new(1.0, 4.0, 3.0), 1e-5), "got {p}");
}

// ============================================================================
// AnimationClip
// ============================================================================

fn source_with_rate(ticks_per_second: f64) -> AnimationSource {
    AnimationSource {
        name: "walk".to_string(),
        duration: 50.0,
        ticks_per_second,
        channels: vec![ChannelSource {
            node_name: "hip".to_string(),
            position_keys: vec![
                VectorKey { time: 0.0, value: [0.0, 0.0, 0.0] },
                VectorKey { time: 50.0, value: [0.0, 1.0, 0.0] },
            ],
            rotation_keys: vec![QuatKey { time: 0.0, value: [0.0, 0.0, 0.0, 1.0] }],
            scaling_keys: vec![],
        }],
    }
}

#[test]
fn clip_default_ticks_per_second() {
    let clip = AnimationClip::from_source(&source_with_rate(0.0), &ImportSettings::default()).unwrap();
    assert_eq!(clip.ticks_per_second, 25.0);
    assert!(approx(clip.duration_seconds(), 2.0));
}

#[test]
fn clip_explicit_ticks_per_second() {
    let clip = AnimationClip::from_source(&source_with_rate(50.0), &ImportSettings::default()).unwrap();
    assert_eq!(clip.ticks_per_second, 50.0);
}

#[test]
fn clip_default_rate_follows_settings() {
    let settings = ImportSettings {
        default_ticks_per_second: 30.0,
        ..ImportSettings::default()
    };
    let clip = AnimationClip::from_source(&source_with_rate(0.0), &settings).unwrap();
    assert_eq!(clip.ticks_per_second, 30.0);
}

#[test]
fn clip_empty_key_arrays_become_absent_tracks() {
    let clip = AnimationClip::from_source(&source_with_rate(25.0), &ImportSettings::default()).unwrap();
    let hip = clip.channel("hip").unwrap();
    assert!(hip.position.is_some());
    assert_eq!(hip.rotation.as_ref().map(KeyframeTrack::len), Some(1));
    assert!(hip.scale.is_none());
}

#[test]
fn clip_channel_lookup_by_name() {
    let clip = AnimationClip::from_source(&source_with_rate(25.0), &ImportSettings::default()).unwrap();
    assert_eq!(clip.channel_index("hip"), Some(0));
    assert!(clip.channel("knee").is_none());
}

#[test]
fn clip_duplicate_channel_first_wins() {
    let first = BoneAnimation::new("arm").with_position(KeyframeTrack::constant(Vec3::X).unwrap());
    let second = BoneAnimation::new("arm").with_position(KeyframeTrack::constant(Vec3::Y).unwrap());
    let clip = AnimationClip::new("dup", 10.0, 1.0, vec![first, second]).unwrap();

    assert_eq!(clip.channel_index("arm"), Some(0));
    assert_eq!(clip.channel("arm").unwrap().position.as_ref().unwrap().sample(0.0), Vec3::X);
}

#[test]
fn clip_rejects_invalid_duration() {
    for duration in [0.0, -1.0, f32::NAN, f32::INFINITY] {
        let err = AnimationClip::new("bad", duration, 25.0, vec![]).unwrap_err();
        assert!(matches!(err, PoseError::ClipLoad(_)), "duration {duration}: {err}");
    }
}

#[test]
fn clip_rejects_decreasing_keyframes() {
    let mut source = source_with_rate(25.0);
    source.channels[0].position_keys.reverse();
    let err = AnimationClip::from_source(&source, &ImportSettings::default()).unwrap_err();
    match err {
        PoseError::InvalidTrack { channel, .. } => assert_eq!(channel, "hip"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn clip_rejects_zero_length_rotation_key() {
    let mut source = source_with_rate(25.0);
    source.channels[0].rotation_keys = vec![QuatKey { time: 0.0, value: [0.0, 0.0, 0.0, 0.0] }];
    let err = AnimationClip::from_source(&source, &ImportSettings::default()).unwrap_err();
    match err {
        PoseError::InvalidTrack { channel, .. } => assert_eq!(channel, "hip"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn clip_import_normalizes_rotation_keys() {
    let mut source = source_with_rate(25.0);
    source.channels[0].rotation_keys = vec![QuatKey { time: 0.0, value: [0.0, 0.0, 0.0, 3.0] }];
    let clip = AnimationClip::from_source(&source, &ImportSettings::default()).unwrap();
    let rotation = clip.channel("hip").unwrap().rotation.as_ref().unwrap();
    assert_eq!(rotation.values(), &[Quat::IDENTITY]);
}

#[test]
fn clip_from_scene_without_animations_fails() {
    let scene = SkinnedScene::default();
    let err = AnimationClip::from_scene(&scene, 0, &ImportSettings::default()).unwrap_err();
    assert!(matches!(err, PoseError::ClipLoad(_)));
}

#[test]
fn clip_from_scene_index_out_of_range_fails() {
    let scene = SkinnedScene {
        animations: vec![source_with_rate(25.0)],
        ..SkinnedScene::default()
    };
    assert!(AnimationClip::from_scene(&scene, 0, &ImportSettings::default()).is_ok());
    let err = AnimationClip::from_scene(&scene, 1, &ImportSettings::default()).unwrap_err();
    assert!(matches!(err, PoseError::ClipLoad(_)));
}

#[test]
fn clip_ticks_wrap() {
    let clip = AnimationClip::new("loop", 10.0, 2.0, vec![]).unwrap();
    assert_eq!(clip.ticks_at(0.0), 0.0);
    assert_eq!(clip.ticks_at(2.5), 5.0);
    assert_eq!(clip.ticks_at(5.0), 0.0);
    assert_eq!(clip.ticks_at(6.0), 2.0);
    // Negative times wrap backwards from the end
    assert_eq!(clip.ticks_at(-1.0), 8.0);
}

#[test]
fn clip_ticks_seam_at_fractional_rate() {
    let clip = AnimationClip::new("loop", 100.0, 30.0, vec![]).unwrap();
    for k in 1..=8 {
        let seconds = k as f32 * clip.duration_seconds();
        assert_eq!(clip.ticks_at(seconds), 0.0, "k={k}");
        assert_eq!(clip.ticks_at(-seconds), 0.0, "k=-{k}");
    }
    // Just short of the seam is still the end of the clip
    assert!(clip.ticks_at(clip.duration_seconds() - 0.01) > 99.0);
}

#[test]
fn clip_ticks_always_below_duration() {
    let clip = AnimationClip::new("loop", 3.0, 7.0, vec![]).unwrap();
    for i in -200..200 {
        let ticks = clip.ticks_at(i as f32 * 0.037);
        assert!((0.0..clip.duration).contains(&ticks), "ticks={ticks}");
    }
}

// ============================================================================
// AnimationAction
// ============================================================================

fn action_fixture() -> (Avatar, Arc<AnimationClip>) {
    let root = SceneNode::new("root", Mat4::IDENTITY)
        .with_child(SceneNode::new("hip", Mat4::IDENTITY));
    let avatar = Avatar::new(
        &root,
        &[SkinBone::new("hip", Mat4::IDENTITY)],
        PoseSettings::default(),
    )
    .unwrap();
    let clip = AnimationClip::from_source(&source_with_rate(25.0), &ImportSettings::default()).unwrap();
    (avatar, Arc::new(clip))
}

#[test]
fn action_update_advances_and_wraps() {
    let (avatar, clip) = action_fixture();
    let mut action = avatar.bind_clip(clip);

    action.update(1.5);
    assert!(approx(action.time(), 1.5));

    // Clip lasts 2 seconds
    action.update(1.0);
    assert!(approx(action.time(), 0.5), "got {}", action.time());
}

#[test]
fn action_time_scale_and_reverse() {
    let (avatar, clip) = action_fixture();
    let mut action = avatar.bind_clip(clip);

    action.time_scale = 2.0;
    action.update(0.5);
    assert!(approx(action.time(), 1.0));

    action.time_scale = -1.0;
    action.update(1.5);
    assert!(approx(action.time(), 1.5), "got {}", action.time());
}

#[test]
fn action_paused_does_not_advance() {
    let (avatar, clip) = action_fixture();
    let mut action = avatar.bind_clip(clip);
    action.set_time(0.25);
    action.paused = true;
    action.update(1.0);
    assert!(approx(action.time(), 0.25));
}
