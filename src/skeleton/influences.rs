use bytemuck::{Pod, Zeroable};

use crate::errors::{PoseError, Result};
use crate::import::MeshSource;
use crate::settings::MAX_INFLUENCES;
use crate::skeleton::BoneBindings;

/// Skinning attributes of one vertex, laid out for direct upload.
///
/// Unused slots have joint `0` and weight `0.0`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct VertexInfluence {
    pub joints: [u32; MAX_INFLUENCES],
    pub weights: [f32; MAX_INFLUENCES],
}

impl VertexInfluence {
    #[must_use]
    pub fn count(&self) -> usize {
        self.weights.iter().filter(|&&w| w > 0.0).count()
    }

    /// Scales the weights to sum to one. Unweighted vertices are left alone.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        let sum: f32 = self.weights.iter().sum();
        if sum > 0.0 {
            for w in &mut self.weights {
                *w /= sum;
            }
        }
        self
    }

    fn insert(&mut self, joint: u32, weight: f32, limit: usize) {
        let slots = &self.weights[..limit];

        // First free slot, otherwise the weakest one if the new weight beats it
        let target = match slots.iter().position(|&w| w == 0.0) {
            Some(free) => Some(free),
            None => slots
                .iter()
                .enumerate()
                .min_by(|a, b| a.1.total_cmp(b.1))
                .filter(|(_, w)| weight > **w)
                .map(|(i, _)| i),
        };

        if let Some(slot) = target {
            self.joints[slot] = joint;
            self.weights[slot] = weight;
        }
    }
}

/// Packs a mesh's skin weights into per-vertex joint/weight slots.
///
/// Joint indices come from `bindings`, so they agree with the matrices an
/// [`Avatar`](crate::Avatar) built from the same bone list produces. When a
/// vertex has more than `max_influences` weights the strongest ones are kept.
/// Weights are stored as given; call [`VertexInfluence::normalized`] to
/// rescale them.
pub fn pack_vertex_influences(
    mesh: &MeshSource,
    bindings: &BoneBindings,
    max_influences: usize,
) -> Result<Vec<VertexInfluence>> {
    let limit = max_influences.clamp(1, MAX_INFLUENCES);
    let mut influences = vec![VertexInfluence::default(); mesh.vertex_count];
    let mut dropped = 0_usize;

    for bone in &mesh.bones {
        let joint = bindings
            .index_of(&bone.name)
            .ok_or_else(|| PoseError::BindingMismatch(bone.name.clone()))?;

        for vw in &bone.weights {
            let influence = influences.get_mut(vw.vertex as usize).ok_or_else(|| {
                PoseError::VertexOutOfRange {
                    bone: bone.name.clone(),
                    vertex: vw.vertex,
                    vertex_count: mesh.vertex_count,
                }
            })?;

            if vw.weight <= 0.0 {
                continue;
            }
            if influence.count() >= limit {
                dropped += 1;
            }
            influence.insert(joint, vw.weight, limit);
        }
    }

    if dropped > 0 {
        log::warn!(
            "Mesh '{}': {dropped} weight(s) exceeded the {limit}-influence limit; kept the strongest",
            mesh.name
        );
    }

    Ok(influences)
}
