use crate::animation::clip::AnimationClip;
use crate::skeleton::Skeleton;

pub struct Binder;

impl Binder {
    /// Resolves, for every bone of `skeleton` in order, the index of the clip
    /// channel that animates it.
    pub fn bind(skeleton: &Skeleton, clip: &AnimationClip) -> Vec<Option<usize>> {
        let bindings: Vec<Option<usize>> = skeleton
            .bones()
            .iter()
            .map(|bone| clip.channel_index(&bone.name))
            .collect();

        let bound = bindings.iter().flatten().count();
        let unmatched = clip
            .channels()
            .iter()
            .filter(|c| skeleton.find(&c.name).is_none())
            .count();

        log::debug!(
            "Bound clip '{}': {bound} of {} bone(s) animated, {unmatched} channel(s) without a bone",
            clip.name,
            skeleton.len()
        );

        bindings
    }
}
