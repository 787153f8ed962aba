pub mod values;
pub mod tracks;
pub mod clip;
pub mod action;
pub mod binder;

pub use clip::{AnimationClip, BoneAnimation, ChannelCursors};
pub use action::AnimationAction;
pub use binder::Binder;
pub use tracks::{Keyframe, KeyframeCursor, KeyframeTrack, TrackError};
pub use values::{Interpolatable, blend_quat, blend_quat_normalized, lerp_vec3};
