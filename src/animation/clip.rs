use glam::{Mat4, Quat, Vec3};
use rustc_hash::FxHashMap;

use crate::animation::tracks::{KeyframeCursor, KeyframeTrack, TrackError};
use crate::animation::values::Interpolatable;
use crate::errors::{PoseError, Result};
use crate::import::{AnimationSource, ChannelSource, SkinnedScene};
use crate::settings::{ImportSettings, RotationBlend};

/// Position, rotation and scale tracks targeting one bone.
///
/// A missing track samples to its identity value (no translation, no
/// rotation, unit scale).
#[derive(Debug, Clone)]
pub struct BoneAnimation {
    pub name: String,
    pub position: Option<KeyframeTrack<Vec3>>,
    pub rotation: Option<KeyframeTrack<Quat>>,
    pub scale: Option<KeyframeTrack<Vec3>>,
}

/// Per-channel cursors, one per track kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChannelCursors {
    pub position: KeyframeCursor,
    pub rotation: KeyframeCursor,
    pub scale: KeyframeCursor,
}

impl BoneAnimation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: None,
            rotation: None,
            scale: None,
        }
    }

    #[must_use]
    pub fn with_position(mut self, track: KeyframeTrack<Vec3>) -> Self {
        self.position = Some(track);
        self
    }

    #[must_use]
    pub fn with_rotation(mut self, track: KeyframeTrack<Quat>) -> Self {
        self.rotation = Some(track);
        self
    }

    #[must_use]
    pub fn with_scale(mut self, track: KeyframeTrack<Vec3>) -> Self {
        self.scale = Some(track);
        self
    }

    /// Converts one imported channel. Empty key arrays become absent tracks.
    pub fn from_source(source: &ChannelSource) -> Result<Self> {
        let name = source.node_name.as_str();

        let position = track_from_keys(
            name,
            source.position_keys.iter().map(|k| (k.time as f32, k.vec3())),
        )?;
        let rotation = track_from_keys(
            name,
            source.rotation_keys.iter().map(|k| (k.time as f32, k.quat())),
        )?;
        let scale = track_from_keys(
            name,
            source.scaling_keys.iter().map(|k| (k.time as f32, k.vec3())),
        )?;

        Ok(Self {
            name: source.node_name.clone(),
            position,
            rotation,
            scale,
        })
    }

    /// Local transform at `ticks`: `translation * rotation * scale`.
    #[must_use]
    pub fn local_transform(&self, ticks: f32, blend: RotationBlend) -> Mat4 {
        self.sample_local(ticks, None, blend)
    }

    /// [`local_transform`](Self::local_transform) reusing per-track cursors.
    pub fn local_transform_with_cursors(
        &self,
        ticks: f32,
        cursors: &mut ChannelCursors,
        blend: RotationBlend,
    ) -> Mat4 {
        self.sample_local(ticks, Some(cursors), blend)
    }

    fn sample_local(
        &self,
        ticks: f32,
        cursors: Option<&mut ChannelCursors>,
        blend: RotationBlend,
    ) -> Mat4 {
        let (pos_cursor, rot_cursor, scl_cursor) = match cursors {
            Some(c) => (Some(&mut c.position), Some(&mut c.rotation), Some(&mut c.scale)),
            None => (None, None, None),
        };

        let translation = sample_or(self.position.as_ref(), ticks, pos_cursor, Vec3::ZERO, Vec3::interpolate_linear);
        let rotation = sample_or(self.rotation.as_ref(), ticks, rot_cursor, Quat::IDENTITY, |a: &Quat, b: &Quat, t| {
            blend.blend(*a, *b, t)
        });
        let scale = sample_or(self.scale.as_ref(), ticks, scl_cursor, Vec3::ONE, Vec3::interpolate_linear);

        Mat4::from_translation(translation) * Mat4::from_quat(rotation) * Mat4::from_scale(scale)
    }
}

fn sample_or<T, F>(
    track: Option<&KeyframeTrack<T>>,
    ticks: f32,
    cursor: Option<&mut KeyframeCursor>,
    fallback: T,
    blend: F,
) -> T
where
    T: Interpolatable,
    F: FnOnce(&T, &T, f32) -> T,
{
    match track {
        Some(track) => track.sample_by(ticks, cursor, blend),
        None => fallback,
    }
}

fn track_from_keys<T: Interpolatable>(
    channel: &str,
    keys: impl ExactSizeIterator<Item = (f32, T)>,
) -> Result<Option<KeyframeTrack<T>>> {
    if keys.len() == 0 {
        return Ok(None);
    }
    let (times, values) = keys.unzip();
    KeyframeTrack::new(times, values)
        .map(Some)
        .map_err(|e| invalid_track(channel, &e))
}

fn invalid_track(channel: &str, err: &TrackError) -> PoseError {
    PoseError::InvalidTrack {
        channel: channel.to_string(),
        reason: err.to_string(),
    }
}

/// A named, looping set of bone channels.
///
/// Immutable once built; share it between avatars behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    /// Length in ticks.
    pub duration: f32,
    pub ticks_per_second: f32,
    channels: Vec<BoneAnimation>,
    channel_index: FxHashMap<String, usize>,
}

impl AnimationClip {
    /// Builds a clip. When several channels target the same bone the first one is used.
    pub fn new(
        name: impl Into<String>,
        duration: f32,
        ticks_per_second: f32,
        channels: Vec<BoneAnimation>,
    ) -> Result<Self> {
        let name = name.into();

        if !duration.is_finite() || duration <= 0.0 {
            return Err(PoseError::ClipLoad(format!(
                "clip '{name}' has invalid duration {duration}"
            )));
        }
        if !ticks_per_second.is_finite() || ticks_per_second <= 0.0 {
            return Err(PoseError::ClipLoad(format!(
                "clip '{name}' has invalid rate {ticks_per_second} ticks/s"
            )));
        }

        let mut channel_index = FxHashMap::default();
        channel_index.reserve(channels.len());
        for (i, channel) in channels.iter().enumerate() {
            if channel_index.contains_key(&channel.name) {
                log::warn!(
                    "Clip '{name}': ignoring duplicate channel for bone '{}'",
                    channel.name
                );
                continue;
            }
            channel_index.insert(channel.name.clone(), i);
        }

        log::debug!(
            "Loaded clip '{name}': {} channel(s), {duration} ticks at {ticks_per_second} ticks/s",
            channel_index.len()
        );

        Ok(Self {
            name,
            duration,
            ticks_per_second,
            channels,
            channel_index,
        })
    }

    pub fn from_source(source: &AnimationSource, settings: &ImportSettings) -> Result<Self> {
        let ticks_per_second = if source.ticks_per_second == 0.0 {
            settings.default_ticks_per_second
        } else {
            source.ticks_per_second as f32
        };

        let channels = source
            .channels
            .iter()
            .map(BoneAnimation::from_source)
            .collect::<Result<Vec<_>>>()?;

        Self::new(
            source.name.clone(),
            source.duration as f32,
            ticks_per_second,
            channels,
        )
    }

    /// Loads animation `index` of an imported scene.
    pub fn from_scene(scene: &SkinnedScene, index: usize, settings: &ImportSettings) -> Result<Self> {
        if scene.animations.is_empty() {
            return Err(PoseError::ClipLoad("scene contains no animations".to_string()));
        }
        let source = scene.animations.get(index).ok_or_else(|| {
            PoseError::ClipLoad(format!(
                "animation index {index} out of range ({} animation(s))",
                scene.animations.len()
            ))
        })?;
        Self::from_source(source, settings)
    }

    #[must_use]
    pub fn channels(&self) -> &[BoneAnimation] {
        &self.channels
    }

    #[must_use]
    pub fn channel_index(&self, bone_name: &str) -> Option<usize> {
        self.channel_index.get(bone_name).copied()
    }

    #[must_use]
    pub fn channel(&self, bone_name: &str) -> Option<&BoneAnimation> {
        self.channel_index(bone_name).map(|i| &self.channels[i])
    }

    /// Length in seconds.
    #[must_use]
    pub fn duration_seconds(&self) -> f32 {
        self.duration / self.ticks_per_second
    }

    /// Converts wall-clock seconds into looped clip ticks in `[0, duration)`.
    ///
    /// Negative times wrap backwards from the end of the clip. A time within
    /// `f32` rounding of a whole number of loops maps to tick 0, so
    /// `t + k * duration_seconds()` lands on the same tick as `t` at the seam.
    #[must_use]
    pub fn ticks_at(&self, seconds: f32) -> f32 {
        let duration = f64::from(self.duration);
        let raw = f64::from(seconds) * f64::from(self.ticks_per_second);
        let ticks = raw.rem_euclid(duration);

        // Rounding carried by an f32 time stamp, expressed in ticks
        let seam = raw.abs() * f64::from(f32::EPSILON) * 4.0;
        if ticks <= seam || duration - ticks <= seam {
            return 0.0;
        }

        let ticks = ticks as f32;
        if ticks >= self.duration { 0.0 } else { ticks }
    }
}
