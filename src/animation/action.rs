use std::sync::Arc;

use uuid::Uuid;

use crate::animation::binder::Binder;
use crate::animation::clip::{AnimationClip, ChannelCursors};
use crate::skeleton::Skeleton;

/// Playback state of one clip on one avatar.
///
/// Channels are resolved against the avatar's bones once, when the action is
/// created, and every track keeps a cursor so sequential playback finds its
/// keyframes without searching. Actions always loop.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    /// Playback position in seconds, kept within `[0, clip duration)`.
    time: f32,
    pub time_scale: f32,
    pub paused: bool,

    pub(crate) skeleton_id: Uuid,
    pub(crate) bone_channels: Vec<Option<usize>>,
    pub(crate) cursors: Vec<ChannelCursors>,
}

impl AnimationAction {
    #[must_use]
    pub fn new(skeleton: &Skeleton, clip: Arc<AnimationClip>) -> Self {
        let bone_channels = Binder::bind(skeleton, &clip);
        let channel_count = clip.channels().len();
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            paused: false,
            skeleton_id: skeleton.id,
            bone_channels,
            // One cursor set per channel
            cursors: vec![ChannelCursors::default(); channel_count],
        }
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Jumps to `seconds`, wrapped into the clip.
    pub fn set_time(&mut self, seconds: f32) {
        let length = self.clip.duration_seconds();
        let wrapped = seconds.rem_euclid(length);
        self.time = if wrapped >= length { 0.0 } else { wrapped };
    }

    /// Advances playback by `dt` seconds scaled by `time_scale`.
    pub fn update(&mut self, dt: f32) {
        if self.paused {
            return;
        }
        self.set_time(self.time + dt * self.time_scale);
    }
}
