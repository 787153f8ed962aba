use glam::{Quat, Vec3, Vec4};

use crate::settings::RotationBlend;

/// A keyframe value type that can be blended between two samples.
pub trait Interpolatable: Copy + Sized {
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self;

    /// Canonical form of a keyframe value, or `None` if it cannot be used.
    /// Applied to every value when a track is built.
    fn prepare(self) -> Option<Self>;
}

impl Interpolatable for Vec3 {
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        lerp_vec3(*start, *end, t)
    }

    fn prepare(self) -> Option<Self> {
        self.is_finite().then_some(self)
    }
}

/// Rotation keys are stored as unit quaternions; zero-length and non-finite
/// keys are rejected.
///
/// Track-level sampling ([`KeyframeTrack::sample`](crate::animation::KeyframeTrack::sample)
/// and `sample_with_cursor`) always renormalizes the blend. To honor
/// [`RotationBlend::Raw`], sample with
/// [`sample_by`](crate::animation::KeyframeTrack::sample_by) and
/// [`RotationBlend::blend`], as [`Avatar`](crate::Avatar) does.
impl Interpolatable for Quat {
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        blend_quat_normalized(*start, *end, t)
    }

    fn prepare(self) -> Option<Self> {
        let length = self.length();
        (length.is_finite() && length > 0.0).then(|| self / length)
    }
}

/// `start + t * (end - start)`, evaluated in the weighted form so both
/// endpoints are reproduced exactly: `t == 0` yields `start` and `t == 1`
/// yields `end`, bit for bit.
#[inline]
#[must_use]
pub fn lerp_vec3(start: Vec3, end: Vec3, t: f32) -> Vec3 {
    start * (1.0 - t) + end * t
}

/// Shortest-path component-wise quaternion blend, without renormalizing.
///
/// Both endpoints are normalized first. If they lie on opposite hemispheres
/// (negative dot product) `end` is negated so the blend takes the short arc.
#[must_use]
pub fn blend_quat(start: Quat, end: Quat, t: f32) -> Quat {
    let a = Vec4::from(start.normalize());
    let mut b = Vec4::from(end.normalize());

    if a.dot(b) < 0.0 {
        b = -b;
    }

    Quat::from_vec4(a * (1.0 - t) + b * t)
}

/// [`blend_quat`] followed by normalization.
#[must_use]
pub fn blend_quat_normalized(start: Quat, end: Quat, t: f32) -> Quat {
    blend_quat(start, end, t).normalize()
}

impl RotationBlend {
    #[inline]
    #[must_use]
    pub fn blend(self, start: Quat, end: Quat, t: f32) -> Quat {
        match self {
            RotationBlend::Normalized => blend_quat_normalized(start, end, t),
            RotationBlend::Raw => blend_quat(start, end, t),
        }
    }
}
