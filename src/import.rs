//! Imported Scene Data
//!
//! Already-parsed data handed over by an asset importer: the bone node tree,
//! skinned meshes with their bone lists, and animation tracks.
//!
//! Matrices arrive row-major, the way asset importers lay them out.
//! [`RowMatrix::to_mat4`] is the single place where they are transposed into
//! glam's column-major [`Mat4`]; everything past this module works with
//! column-major matrices only.

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// A 4×4 matrix stored row by row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowMatrix(pub [[f32; 4]; 4]);

impl RowMatrix {
    pub const IDENTITY: Self = Self([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    #[must_use]
    pub fn to_mat4(&self) -> Mat4 {
        // Rows read as columns, then transposed back.
        Mat4::from_cols_array_2d(&self.0).transpose()
    }

    #[must_use]
    pub fn from_mat4(m: Mat4) -> Self {
        Self(m.transpose().to_cols_array_2d())
    }
}

impl Default for RowMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A node of the imported scene graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    /// Bind-pose transform relative to the parent node.
    #[serde(default)]
    pub transform: RowMatrix,
    #[serde(default)]
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, transform: Mat4) -> Self {
        Self {
            name: name.into(),
            transform: RowMatrix::from_mat4(transform),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertexWeight {
    pub vertex: u32,
    pub weight: f32,
}

/// One bone record of a skinned mesh.
///
/// The same bone name may appear in more than one record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkinBone {
    pub name: String,
    /// Transforms a vertex from mesh bind space into this bone's space.
    #[serde(default)]
    pub offset: RowMatrix,
    #[serde(default)]
    pub weights: Vec<VertexWeight>,
}

impl SkinBone {
    pub fn new(name: impl Into<String>, offset: Mat4) -> Self {
        Self {
            name: name.into(),
            offset: RowMatrix::from_mat4(offset),
            weights: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_weight(mut self, vertex: u32, weight: f32) -> Self {
        self.weights.push(VertexWeight { vertex, weight });
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshSource {
    #[serde(default)]
    pub name: String,
    pub vertex_count: usize,
    #[serde(default)]
    pub bones: Vec<SkinBone>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VectorKey {
    pub time: f64,
    pub value: [f32; 3],
}

impl VectorKey {
    #[must_use]
    pub fn vec3(&self) -> Vec3 {
        Vec3::from_array(self.value)
    }
}

/// Rotation sample, quaternion components in `x, y, z, w` order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuatKey {
    pub time: f64,
    pub value: [f32; 4],
}

impl QuatKey {
    #[must_use]
    pub fn quat(&self) -> Quat {
        Quat::from_array(self.value)
    }
}

/// Keyframes for one animated node. Track lengths are independent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelSource {
    pub node_name: String,
    #[serde(default)]
    pub position_keys: Vec<VectorKey>,
    #[serde(default)]
    pub rotation_keys: Vec<QuatKey>,
    #[serde(default)]
    pub scaling_keys: Vec<VectorKey>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimationSource {
    #[serde(default)]
    pub name: String,
    /// Length in ticks.
    pub duration: f64,
    /// `0` means the file did not specify a rate.
    #[serde(default)]
    pub ticks_per_second: f64,
    #[serde(default)]
    pub channels: Vec<ChannelSource>,
}

/// Everything the importer produced for one file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkinnedScene {
    #[serde(default)]
    pub root: Option<SceneNode>,
    #[serde(default)]
    pub meshes: Vec<MeshSource>,
    #[serde(default)]
    pub animations: Vec<AnimationSource>,
}

impl SkinnedScene {
    pub fn from_json_str(json: &str) -> crate::errors::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
