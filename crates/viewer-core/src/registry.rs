use crate::constants::PICK_MARKER;
use crate::scene::{NodeId, SceneGraph};

/// Mesh nodes the pointer can select, collected once per loaded model.
///
/// Holds ids into the scene graph, never the nodes themselves. Order is the
/// scene traversal order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PickTargetRegistry {
    targets: Vec<NodeId>,
}

impl PickTargetRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn build(scene: &SceneGraph) -> Self {
        let targets = scene
            .traverse()
            .into_iter()
            .filter(|id| {
                scene
                    .node(*id)
                    .map(|n| n.is_mesh() && is_pick_name(&n.name))
                    .unwrap_or(false)
            })
            .collect();
        Self { targets }
    }

    pub fn targets(&self) -> &[NodeId] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.targets.contains(&id)
    }

    pub fn names<'a>(&'a self, scene: &'a SceneGraph) -> impl Iterator<Item = &'a str> + 'a {
        self.targets
            .iter()
            .filter_map(move |id| scene.node(*id).map(|n| n.name.as_str()))
    }
}

#[inline]
pub fn is_pick_name(name: &str) -> bool {
    name.to_lowercase().contains(PICK_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_match_ignores_case() {
        assert!(is_pick_name("Sign_A"));
        assert!(is_pick_name("roadSIGNpost"));
        assert!(!is_pick_name("tree01"));
        assert!(!is_pick_name("sig n"));
    }
}
