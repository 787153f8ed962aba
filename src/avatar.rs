//! Pose Evaluator
//!
//! [`Avatar`] owns a character's bone hierarchy and skin bindings and turns
//! an [`AnimationClip`] sampled at a point in time into one skinning matrix
//! per bound bone.
//!
//! For every bone the evaluator computes
//!
//! ```text
//! global = parent_global * local
//! skinning[binding] = global_inverse * global * offset
//! ```
//!
//! where `local` comes from the bone's animation channel (or its bind pose
//! when the clip does not animate it), `offset` takes a vertex from mesh bind
//! space into bone space, and `global_inverse` cancels the root node's own
//! bind transform.
//!
//! The output slice is indexed by binding, the same order
//! [`pack_vertex_influences`](crate::skeleton::pack_vertex_influences) writes
//! into vertex joint indices.

use std::sync::Arc;

use glam::Mat4;

use crate::animation::{AnimationAction, AnimationClip};
use crate::errors::{PoseError, Result};
use crate::import::{SceneNode, SkinBone, SkinnedScene};
use crate::settings::PoseSettings;
use crate::skeleton::{Bone, BoneBindings, Skeleton};

#[derive(Debug, Clone)]
pub struct Avatar {
    settings: PoseSettings,
    global_inverse: Mat4,
    skeleton: Skeleton,
    bindings: BoneBindings,
    /// Binding slot of each bone, `None` for bones no vertex is weighted to.
    bone_slots: Vec<Option<usize>>,
    offsets: Vec<Mat4>,

    // === Runtime Data ===
    globals: Vec<Mat4>,
    matrices: Vec<Mat4>,
}

impl Avatar {
    /// Builds an avatar from a node tree and the bone list of a skinned mesh.
    ///
    /// Fails if the bone list is empty, the root transform cannot be
    /// inverted, or a skin bone has no node of the same name in the tree.
    pub fn new(root: &SceneNode, skin_bones: &[SkinBone], settings: PoseSettings) -> Result<Self> {
        if skin_bones.is_empty() {
            return Err(PoseError::SkeletonLoad("mesh has no skin bones".to_string()));
        }

        let skeleton = Skeleton::from_scene_node(root)?;
        let bindings = BoneBindings::from_skin_bones(skin_bones);

        let root_transform = skeleton.root().bind_local;
        let global_inverse = root_transform.inverse();
        if root_transform.determinant() == 0.0 || !global_inverse.is_finite() {
            return Err(PoseError::SkeletonLoad(format!(
                "root node '{}' has a singular transform",
                skeleton.root().name
            )));
        }

        let mut bone_slots = vec![None; skeleton.len()];
        for (slot, binding) in bindings.iter().enumerate() {
            let bone = skeleton
                .find(&binding.name)
                .ok_or_else(|| PoseError::BindingMismatch(binding.name.clone()))?;
            bone_slots[bone] = Some(slot);
        }

        let offsets: Vec<Mat4> = bindings.iter().map(|b| b.offset).collect();

        log::debug!(
            "Created avatar: {} node(s), {} bound bone(s) from {} skin record(s)",
            skeleton.len(),
            bindings.len(),
            skin_bones.len()
        );

        Ok(Self {
            settings,
            global_inverse,
            globals: vec![Mat4::IDENTITY; skeleton.len()],
            matrices: vec![Mat4::IDENTITY; bindings.len()],
            skeleton,
            bindings,
            bone_slots,
            offsets,
        })
    }

    /// Builds an avatar for mesh `mesh_index` of an imported scene.
    pub fn from_scene(scene: &SkinnedScene, mesh_index: usize, settings: PoseSettings) -> Result<Self> {
        let root = scene
            .root
            .as_ref()
            .ok_or_else(|| PoseError::SkeletonLoad("scene has no root node".to_string()))?;

        if scene.meshes.is_empty() {
            return Err(PoseError::SkeletonLoad("scene contains no meshes".to_string()));
        }
        let mesh = scene.meshes.get(mesh_index).ok_or_else(|| {
            PoseError::SkeletonLoad(format!(
                "mesh index {mesh_index} out of range ({} mesh(es))",
                scene.meshes.len()
            ))
        })?;

        Self::new(root, &mesh.bones, settings)
    }

    // ========================================================================
    // Evaluation
    // ========================================================================

    /// Recomputes every skinning matrix for `clip` at `time` seconds.
    ///
    /// Time is converted to ticks and wrapped into the clip, so clips loop
    /// forever in both directions.
    pub fn calculate_pose(&mut self, time: f32, clip: &AnimationClip) -> &[Mat4] {
        let ticks = clip.ticks_at(time);
        let blend = self.settings.rotation_blend;

        self.propagate(|_, bone| match clip.channel(&bone.name) {
            Some(channel) => channel.local_transform(ticks, blend),
            None => bone.bind_local,
        });

        &self.matrices
    }

    /// Recomputes every skinning matrix from the bind pose alone.
    pub fn calculate_bind_pose(&mut self) -> &[Mat4] {
        self.propagate(|_, bone| bone.bind_local);
        &self.matrices
    }

    /// Creates a playback action for `clip` with its channels resolved
    /// against this avatar's bones.
    #[must_use]
    pub fn bind_clip(&self, clip: Arc<AnimationClip>) -> AnimationAction {
        AnimationAction::new(&self.skeleton, clip)
    }

    /// Evaluates `action` at its current time.
    ///
    /// Produces the same matrices as `calculate_pose(action.time(), clip)`.
    pub fn apply(&mut self, action: &mut AnimationAction) -> Result<&[Mat4]> {
        if action.skeleton_id != self.skeleton.id {
            return Err(PoseError::SkeletonMismatch);
        }

        let clip = Arc::clone(action.clip());
        let ticks = clip.ticks_at(action.time());
        let blend = self.settings.rotation_blend;
        let bone_channels = &action.bone_channels;
        let cursors = &mut action.cursors;

        self.propagate(|index, bone| match bone_channels[index] {
            Some(c) => clip.channels()[c].local_transform_with_cursors(ticks, &mut cursors[c], blend),
            None => bone.bind_local,
        });

        Ok(&self.matrices)
    }

    /// One pass over the pre-ordered bones; parents are always final before
    /// their children are visited.
    fn propagate<F>(&mut self, mut local_of: F)
    where
        F: FnMut(usize, &Bone) -> Mat4,
    {
        for (index, bone) in self.skeleton.bones().iter().enumerate() {
            let local = local_of(index, bone);
            let parent_global = bone.parent.map_or(Mat4::IDENTITY, |p| self.globals[p]);
            let global = parent_global * local;
            self.globals[index] = global;

            if let Some(slot) = self.bone_slots[index] {
                self.matrices[slot] = self.global_inverse * global * self.offsets[slot];
            }
        }
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Skinning matrices from the last evaluation, in binding order.
    #[must_use]
    pub fn bone_matrices(&self) -> &[Mat4] {
        &self.matrices
    }

    /// [`bone_matrices`](Self::bone_matrices) as raw bytes for buffer upload.
    #[must_use]
    pub fn bone_matrices_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.matrices)
    }

    #[must_use]
    pub fn bone_matrix(&self, name: &str) -> Option<Mat4> {
        let slot = self.bindings.index_of(name)? as usize;
        self.matrices.get(slot).copied()
    }

    /// Model-space transform of any hierarchy node from the last evaluation,
    /// before the global inverse and offset are applied.
    #[must_use]
    pub fn global_transform(&self, bone_index: usize) -> Option<Mat4> {
        self.globals.get(bone_index).copied()
    }

    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn bindings(&self) -> &BoneBindings {
        &self.bindings
    }

    #[must_use]
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    #[must_use]
    pub fn global_inverse_transform(&self) -> Mat4 {
        self.global_inverse
    }

    #[must_use]
    pub fn settings(&self) -> &PoseSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: PoseSettings) {
        self.settings = settings;
    }
}
