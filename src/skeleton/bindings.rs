use glam::Mat4;
use rustc_hash::FxHashMap;

use crate::import::SkinBone;

#[derive(Debug, Clone, PartialEq)]
pub struct BoneBinding {
    pub name: String,
    /// Mesh bind space to bone space.
    pub offset: Mat4,
}

/// The canonical bone-index table of a skinned mesh.
///
/// Indices are assigned to bone names in the order they are first seen in
/// the mesh's bone list; later records with an already-seen name are
/// ignored. Vertex joint indices and the avatar's output matrices both
/// use this order.
#[derive(Debug, Clone, Default)]
pub struct BoneBindings {
    entries: Vec<BoneBinding>,
    index: FxHashMap<String, u32>,
}

impl BoneBindings {
    #[must_use]
    pub fn from_skin_bones(bones: &[SkinBone]) -> Self {
        let mut table = Self::default();

        for bone in bones {
            if table.index.contains_key(&bone.name) {
                log::warn!("Skin bone '{}' listed more than once; keeping first offset", bone.name);
                continue;
            }
            let slot = table.entries.len() as u32;
            table.index.insert(bone.name.clone(), slot);
            table.entries.push(BoneBinding {
                name: bone.name.clone(),
                offset: bone.offset.to_mat4(),
            });
        }

        table
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<u32> {
        self.index.get(name).copied()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&BoneBinding> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &BoneBinding> {
        self.entries.iter()
    }

    /// Bone names in binding order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|b| b.name.as_str())
    }
}
