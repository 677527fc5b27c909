use glam::{Affine3A, Vec3};
use sinew_core::BoundingBox;

use crate::scene::{self, Scene};
use crate::{NodeHandle, SkinKey};

impl Scene {
    /// World-space box around the skin's joints.
    ///
    /// Joint positions are gathered relative to the root joint's parent and
    /// then moved by that parent's world matrix, so animating joints below the
    /// root never requires walking above it.
    #[must_use]
    pub fn skin_bounds(&self, key: SkinKey) -> Option<BoundingBox> {
        let skin = self.skins.get(key)?;
        let parent = skin.root_joint().and_then(|j| self.parent(j));

        let local = BoundingBox::from_points(
            skin.joints()
                .iter()
                .flatten()
                .filter_map(|&joint| scene::relative_matrix(&self.nodes, joint, parent))
                .map(|m| Vec3::from(m.translation)),
        )?;

        let parent_world = parent
            .and_then(|p| scene::world_matrix(&self.nodes, p))
            .unwrap_or(Affine3A::IDENTITY);
        Some(local.transform(&parent_world))
    }

    /// Bounds of a model node, recomputed only when marked dirty.
    pub fn bounds(&mut self, node: NodeHandle) -> Option<BoundingBox> {
        let target = self.nodes.get(node)?;
        if !target.bounds_dirty {
            return target.bounds;
        }

        let skin = target.model.and_then(|m| m.skin);
        let bounds = skin.and_then(|key| self.skin_bounds(key));

        let target = &mut self.nodes[node];
        target.bounds = bounds;
        target.bounds_dirty = false;
        bounds
    }
}
