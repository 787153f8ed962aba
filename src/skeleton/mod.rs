//! Bone hierarchy, skin bindings and per-vertex influences.
//!
//! The hierarchy is stored as a flat array in depth-first pre-order, so every
//! bone's parent sits at a lower index than the bone itself. Walking the array
//! front to back visits parents before children, which is all that world
//! transform propagation needs.

mod bindings;
mod influences;

pub use bindings::{BoneBinding, BoneBindings};
pub use influences::{VertexInfluence, pack_vertex_influences};

use glam::Mat4;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use uuid::Uuid;

use crate::errors::{PoseError, Result};
use crate::import::SceneNode;

#[derive(Debug, Clone)]
pub struct Bone {
    pub name: String,
    /// Bind-pose transform relative to the parent bone.
    pub bind_local: Mat4,
    pub parent: Option<usize>,
    pub children: SmallVec<[usize; 4]>,
}

#[derive(Debug, Clone)]
pub struct Skeleton {
    pub id: Uuid,
    bones: Vec<Bone>,
    name_index: FxHashMap<String, usize>,
}

impl Skeleton {
    /// Flattens an imported node tree.
    ///
    /// Node names must be unique: they are the join key for animation
    /// channels and skin bones.
    pub fn from_scene_node(root: &SceneNode) -> Result<Self> {
        let mut bones: Vec<Bone> = Vec::new();
        let mut name_index = FxHashMap::default();

        // Explicit stack instead of recursion; children are pushed in reverse
        // so they pop (and get indices) in their original order.
        let mut stack: Vec<(&SceneNode, Option<usize>)> = vec![(root, None)];

        while let Some((node, parent)) = stack.pop() {
            let index = bones.len();

            if name_index.insert(node.name.clone(), index).is_some() {
                return Err(PoseError::SkeletonLoad(format!(
                    "duplicate node name '{}' in bone hierarchy",
                    node.name
                )));
            }

            bones.push(Bone {
                name: node.name.clone(),
                bind_local: node.transform.to_mat4(),
                parent,
                children: SmallVec::new(),
            });

            if let Some(parent) = parent {
                bones[parent].children.push(index);
            }

            for child in node.children.iter().rev() {
                stack.push((child, Some(index)));
            }
        }

        Ok(Self {
            id: Uuid::new_v4(),
            bones,
            name_index,
        })
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// All bones in pre-order. Index 0 is the root.
    #[must_use]
    pub fn bones(&self) -> &[Bone] {
        &self.bones
    }

    #[must_use]
    pub fn root(&self) -> &Bone {
        &self.bones[0]
    }

    #[must_use]
    pub fn bone(&self, index: usize) -> Option<&Bone> {
        self.bones.get(index)
    }

    #[must_use]
    pub fn find(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied()
    }

    #[must_use]
    pub fn children_of(&self, index: usize) -> &[usize] {
        self.bones.get(index).map_or(&[], |b| b.children.as_slice())
    }

    /// Number of ancestors of `index` (the root has depth 0).
    #[must_use]
    pub fn depth_of(&self, index: usize) -> Option<usize> {
        let mut current = self.bones.get(index)?;
        let mut depth = 0;
        while let Some(parent) = current.parent {
            current = &self.bones[parent];
            depth += 1;
        }
        Some(depth)
    }
}
