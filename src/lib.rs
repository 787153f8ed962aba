//! # Myth Pose
//!
//! CPU-side skeletal pose evaluation for skinned characters.
//!
//! - [`animation`]: keyframe tracks, clips and playback actions
//! - [`skeleton`]: bone hierarchy, skin bindings and vertex influences
//! - [`Avatar`]: evaluates a clip at a point in time into skinning matrices
//! - [`import`]: already-parsed scene data handed over by an asset importer
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use myth_pose::{AnimationClip, Avatar, Settings, SkinnedScene};
//!
//! let scene = SkinnedScene::from_json_str(&json)?;
//! let settings = Settings::default();
//! let clip = Arc::new(AnimationClip::from_scene(&scene, 0, &settings.import)?);
//! let mut avatar = Avatar::from_scene(&scene, 0, settings.pose)?;
//!
//! let matrices = avatar.calculate_pose(1.25, &clip);
//! queue.write_buffer(&joint_buffer, 0, bytemuck::cast_slice(matrices));
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod animation;
pub mod avatar;
pub mod errors;
pub mod import;
pub mod settings;
pub mod skeleton;

pub use animation::{AnimationAction, AnimationClip, BoneAnimation, Keyframe, KeyframeTrack};
pub use avatar::Avatar;
pub use errors::{PoseError, Result};
pub use import::{AnimationSource, ChannelSource, MeshSource, RowMatrix, SceneNode, SkinBone, SkinnedScene};
pub use settings::{ImportSettings, PoseSettings, RotationBlend, Settings};
pub use skeleton::{BoneBindings, Skeleton, VertexInfluence, pack_vertex_influences};
