//! Error Types
//!
//! This module defines the error types used throughout the crate.
//!
//! # Overview
//!
//! The main error type [`PoseError`] covers all failure modes including:
//! - Skeleton and skin loading failures
//! - Animation clip loading failures and malformed keyframe tracks
//! - Skin bone / hierarchy name mismatches
//! - Settings and scene description parsing
//!
//! Errors surface at construction time. A successfully built
//! [`Avatar`](crate::Avatar) can always evaluate a successfully built
//! [`AnimationClip`](crate::AnimationClip); the only runtime failure is
//! applying an [`AnimationAction`](crate::AnimationAction) to an avatar it was
//! not created for.
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, PoseError>`.
//!
//! ```rust,ignore
//! use myth_pose::errors::{PoseError, Result};
//!
//! fn load_clip(scene: &SkinnedScene) -> Result<AnimationClip> {
//!     AnimationClip::from_scene(scene, 0, &ImportSettings::default())
//! }
//! ```

use thiserror::Error;

/// The main error type for pose evaluation.
#[derive(Error, Debug)]
pub enum PoseError {
    // ========================================================================
    // Load Errors
    // ========================================================================
    /// The imported scene cannot produce a usable skeleton.
    #[error("Failed to load skeleton: {0}")]
    SkeletonLoad(String),

    /// The imported scene cannot produce a usable animation clip.
    #[error("Failed to load animation clip: {0}")]
    ClipLoad(String),

    /// A keyframe track violates the ordering invariant.
    #[error("Invalid keyframe track in channel '{channel}': {reason}")]
    InvalidTrack {
        /// Name of the channel (target bone) owning the track
        channel: String,
        /// What is wrong with the track
        reason: String,
    },

    // ========================================================================
    // Binding Errors
    // ========================================================================
    /// A skinned bone has no node with the same name in the bone hierarchy.
    #[error("Skin bone '{0}' has no matching node in the bone hierarchy")]
    BindingMismatch(String),

    /// A skin weight refers to a vertex the mesh does not have.
    #[error("Bone '{bone}' weights vertex {vertex}, but the mesh has only {vertex_count} vertices")]
    VertexOutOfRange {
        /// Name of the bone carrying the weight
        bone: String,
        /// The invalid vertex index
        vertex: u32,
        /// Number of vertices in the mesh
        vertex_count: usize,
    },

    /// An animation action was applied to an avatar it was not bound to.
    #[error("Animation action was bound to a different skeleton")]
    SkeletonMismatch,

    // ========================================================================
    // I/O & Parsing Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parse error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Alias for `Result<T, PoseError>`.
pub type Result<T> = std::result::Result<T, PoseError>;
