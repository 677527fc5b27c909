use glam::{Mat4, Vec4};
use slotmap::SlotMap;

use sinew_core::{Result, SinewError};

use crate::listener::Subscriber;
use crate::node::{Model, Node};
use crate::scene::{self, Scene};
use crate::{NodeHandle, SkinKey};

/// Number of `Vec4` rows stored per joint in the matrix palette.
pub const PALETTE_ROWS: usize = 3;

/// Listener tag: the parent of the skin's root joint changed.
pub const ROOT_JOINT_PARENT_CHANGED: u32 = 1;

const IDENTITY_ROWS: [Vec4; PALETTE_ROWS] = [Vec4::X, Vec4::Y, Vec4::Z];

/// Binds a mesh to a set of joints.
///
/// Joint slots and the root node hold references on their nodes; the root
/// joint and the model node are plain back references.
#[derive(Debug, Clone)]
pub struct MeshSkin {
    key: SkinKey,
    bind_shape: Mat4,

    // Slot `i` corresponds to joint index `i` in the vertex data.
    joints: Vec<Option<NodeHandle>>,

    root_joint: Option<NodeHandle>,
    // The node we registered our listener on.
    root_joint_parent: Option<NodeHandle>,
    root_node: Option<NodeHandle>,

    model_node: Option<NodeHandle>,

    // 3 rows per joint, rebuilt on every fetch.
    matrix_palette: Vec<Vec4>,
}

impl MeshSkin {
    pub(crate) fn new(key: SkinKey) -> Self {
        Self {
            key,
            bind_shape: Mat4::IDENTITY,
            joints: Vec::new(),
            root_joint: None,
            root_joint_parent: None,
            root_node: None,
            model_node: None,
            matrix_palette: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn key(&self) -> SkinKey {
        self.key
    }

    #[inline]
    #[must_use]
    pub fn bind_shape(&self) -> &Mat4 {
        &self.bind_shape
    }

    pub fn set_bind_shape(&mut self, bind_shape: Mat4) {
        self.bind_shape = bind_shape;
    }

    /// Sets the bind shape from 16 column-major floats.
    pub fn set_bind_shape_from_slice(&mut self, matrix: &[f32; 16]) {
        self.bind_shape = Mat4::from_cols_array(matrix);
    }

    #[inline]
    #[must_use]
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// The joint bound at `index`.
    ///
    /// # Panics
    /// When `index >= joint_count()`.
    #[must_use]
    pub fn joint(&self, index: usize) -> Option<NodeHandle> {
        assert!(
            index < self.joints.len(),
            "joint index {index} out of range (joint count {})",
            self.joints.len()
        );
        self.joints[index]
    }

    #[inline]
    #[must_use]
    pub fn joints(&self) -> &[Option<NodeHandle>] {
        &self.joints
    }

    /// Slot index of `joint`, if it is bound.
    #[must_use]
    pub fn joint_index(&self, joint: NodeHandle) -> Option<usize> {
        self.joints.iter().position(|&j| j == Some(joint))
    }

    #[inline]
    #[must_use]
    pub fn root_joint(&self) -> Option<NodeHandle> {
        self.root_joint
    }

    #[inline]
    #[must_use]
    pub fn root_node(&self) -> Option<NodeHandle> {
        self.root_node
    }

    /// The node whose model uses this skin.
    #[inline]
    #[must_use]
    pub fn model_node(&self) -> Option<NodeHandle> {
        self.model_node
    }

    /// The palette as last computed.
    #[inline]
    #[must_use]
    pub fn matrix_palette(&self) -> &[Vec4] {
        &self.matrix_palette
    }

    /// Number of `Vec4` rows in the palette.
    #[inline]
    #[must_use]
    pub fn matrix_palette_len(&self) -> usize {
        self.joints.len() * PALETTE_ROWS
    }

    #[inline]
    #[must_use]
    pub fn matrix_palette_size_bytes(&self) -> usize {
        self.matrix_palette_len() * std::mem::size_of::<Vec4>()
    }

    /// The palette as raw bytes, ready for upload.
    #[must_use]
    pub fn matrix_palette_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.matrix_palette)
    }

    // ========================================================================
    // Node-graph aware operations (driven by `Scene`)
    // ========================================================================

    pub(crate) fn joint_by_name(
        &self,
        nodes: &SlotMap<NodeHandle, Node>,
        name: &str,
    ) -> Option<NodeHandle> {
        if name.is_empty() {
            return None;
        }
        self.joints
            .iter()
            .flatten()
            .copied()
            .find(|&j| nodes.get(j).is_some_and(|n| n.name == name))
    }

    pub(crate) fn set_joint_count(&mut self, nodes: &mut SlotMap<NodeHandle, Node>, count: usize) {
        self.clear_joints(nodes);

        self.joints = vec![None; count];
        self.matrix_palette = IDENTITY_ROWS.repeat(count);
    }

    pub(crate) fn set_joint(
        &mut self,
        nodes: &mut SlotMap<NodeHandle, Node>,
        joint: Option<NodeHandle>,
        index: usize,
    ) {
        assert!(
            index < self.joints.len(),
            "joint index {index} out of range (joint count {})",
            self.joints.len()
        );

        // Take the new reference first so rebinding the same joint never frees it.
        let joint = match joint {
            Some(handle) if nodes.contains_key(handle) => {
                let node = &mut nodes[handle];
                assert!(
                    node.is_joint(),
                    "node '{}' bound to skin slot {index} is not a joint",
                    node.name
                );
                if let Some(data) = node.joint_mut() {
                    data.skin_count += 1;
                }
                node.ref_count += 1;
                Some(handle)
            }
            Some(_) => {
                log::warn!("Ignoring stale joint handle for skin slot {index}");
                None
            }
            None => None,
        };

        if let Some(old) = self.joints[index].take() {
            if let Some(data) = nodes.get_mut(old).and_then(Node::joint_mut) {
                data.skin_count = data.skin_count.saturating_sub(1);
            }
            scene::release_node(nodes, old);
        }

        self.joints[index] = joint;
    }

    pub(crate) fn set_root_joint(
        &mut self,
        nodes: &mut SlotMap<NodeHandle, Node>,
        joint: Option<NodeHandle>,
    ) {
        let me = Subscriber::Skin(self.key);

        if let Some(parent) = self.root_joint_parent.take()
            && let Some(node) = nodes.get_mut(parent)
        {
            node.remove_listener(me);
        }

        self.root_joint = joint;

        let parent = joint.and_then(|j| nodes.get(j)).and_then(Node::parent);
        if let Some(parent) = parent
            && let Some(node) = nodes.get_mut(parent)
        {
            node.add_listener(me, ROOT_JOINT_PARENT_CHANGED);
            self.root_joint_parent = Some(parent);
        }

        let root_node = joint
            .filter(|&j| nodes.contains_key(j))
            .map(|j| scene::top_level_ancestor(nodes, j));
        self.set_root_node(nodes, root_node);
    }

    fn set_root_node(&mut self, nodes: &mut SlotMap<NodeHandle, Node>, node: Option<NodeHandle>) {
        if self.root_node == node {
            return;
        }
        if let Some(new) = node {
            scene::retain_node(nodes, new);
        }
        if let Some(old) = self.root_node.take() {
            scene::release_node(nodes, old);
        }
        self.root_node = node;
    }

    fn clear_joints(&mut self, nodes: &mut SlotMap<NodeHandle, Node>) {
        self.set_root_joint(nodes, None);

        for slot in std::mem::take(&mut self.joints) {
            let Some(joint) = slot else {
                continue;
            };
            if let Some(data) = nodes.get_mut(joint).and_then(Node::joint_mut) {
                data.skin_count = data.skin_count.saturating_sub(1);
            }
            scene::release_node(nodes, joint);
        }
    }

    /// Drops every reference this skin holds.
    pub(crate) fn release(&mut self, nodes: &mut SlotMap<NodeHandle, Node>) {
        self.clear_joints(nodes);
        self.matrix_palette = Vec::new();
    }

    /// Recomputes every bound joint's rows. Empty or stale slots keep their
    /// previous rows.
    pub(crate) fn update_matrix_palette(&mut self, nodes: &SlotMap<NodeHandle, Node>) -> &[Vec4] {
        for (slot, rows) in self
            .joints
            .iter()
            .zip(self.matrix_palette.chunks_exact_mut(PALETTE_ROWS))
        {
            let Some(handle) = *slot else {
                continue;
            };
            let Some(joint) = nodes.get(handle).and_then(Node::joint) else {
                continue;
            };
            let Some(world) = scene::world_matrix(nodes, handle) else {
                continue;
            };
            joint.write_palette_rows(Mat4::from(world), self.bind_shape, rows);
        }
        &self.matrix_palette
    }

    /// Reacts to a transform change on a node this skin listens to.
    pub(crate) fn transform_changed(&self, nodes: &mut SlotMap<NodeHandle, Node>, tag: u32) {
        if tag == ROOT_JOINT_PARENT_CHANGED {
            // Skinned bounds are kept relative to the root joint's parent, so
            // only a change at or above it invalidates them.
            if let Some(node) = self.model_node.and_then(|h| nodes.get_mut(h)) {
                node.set_bounds_dirty();
            }
        }
    }
}

// ============================================================================
// Scene-level skin API
// ============================================================================

impl Scene {
    /// Creates an empty skin.
    pub fn create_skin(&mut self) -> SkinKey {
        self.skins.insert_with_key(MeshSkin::new)
    }

    #[inline]
    #[must_use]
    pub fn skin(&self, key: SkinKey) -> Option<&MeshSkin> {
        self.skins.get(key)
    }

    #[inline]
    pub fn skin_mut(&mut self, key: SkinKey) -> Option<&mut MeshSkin> {
        self.skins.get_mut(key)
    }

    #[inline]
    #[must_use]
    pub fn skin_count(&self) -> usize {
        self.skins.len()
    }

    /// Releases every joint and root-node reference held by the skin and
    /// removes it.
    pub fn remove_skin(&mut self, key: SkinKey) -> Option<MeshSkin> {
        let mut skin = self.skins.remove(key)?;
        skin.release(&mut self.nodes);
        if let Some(model) = skin
            .model_node
            .and_then(|h| self.nodes.get_mut(h))
            .and_then(|n| n.model.as_mut())
            && model.skin == Some(key)
        {
            model.skin = None;
        }
        Some(skin)
    }

    /// Clears all joint slots and resizes the skin to `count` empty slots with
    /// an identity palette.
    pub fn set_joint_count(&mut self, key: SkinKey, count: usize) {
        let Some(skin) = self.skins.get_mut(key) else {
            log::warn!("set_joint_count on a stale skin");
            return;
        };
        skin.set_joint_count(&mut self.nodes, count);
    }

    /// Binds `joint` (or nothing) to slot `index`.
    ///
    /// # Panics
    /// When `index` is out of range or `joint` is not a joint node.
    pub fn set_joint(&mut self, key: SkinKey, joint: Option<NodeHandle>, index: usize) {
        let Some(skin) = self.skins.get_mut(key) else {
            log::warn!("set_joint on a stale skin");
            return;
        };
        skin.set_joint(&mut self.nodes, joint, index);
    }

    /// Sets the skin's root joint, subscribes to its parent's transform
    /// changes and keeps the whole hierarchy above it alive.
    pub fn set_root_joint(&mut self, key: SkinKey, joint: Option<NodeHandle>) {
        let Some(skin) = self.skins.get_mut(key) else {
            log::warn!("set_root_joint on a stale skin");
            return;
        };
        skin.set_root_joint(&mut self.nodes, joint);
    }

    /// Finds a bound joint by name. An empty name never matches.
    #[must_use]
    pub fn skin_joint_by_name(&self, key: SkinKey, name: &str) -> Option<NodeHandle> {
        self.skins.get(key)?.joint_by_name(&self.nodes, name)
    }

    /// Recomputes and returns the skin's matrix palette.
    ///
    /// Call once per frame per skin, after animation has been applied.
    pub fn matrix_palette(&mut self, key: SkinKey) -> Option<&[Vec4]> {
        let skin = self.skins.get_mut(key)?;
        Some(skin.update_matrix_palette(&self.nodes))
    }

    /// Gives `node` a model that uses `skin`.
    pub fn set_skin_model(&mut self, node: NodeHandle, skin: SkinKey) -> Result<()> {
        if !self.nodes.contains_key(node) {
            return Err(SinewError::StaleHandle(format!("model node {node:?}")));
        }
        let Some(previous) = self.skins.get_mut(skin).map(|s| s.model_node.replace(node)) else {
            return Err(SinewError::StaleHandle(format!("skin {skin:?}")));
        };

        if let Some(previous) = previous.filter(|&p| p != node)
            && let Some(model) = self.nodes.get_mut(previous).and_then(|n| n.model.as_mut())
        {
            model.skin = None;
        }

        let target = &mut self.nodes[node];
        target.model = Some(Model { skin: Some(skin) });
        target.set_bounds_dirty();
        Ok(())
    }

    /// Clones a skin together with its joint hierarchy.
    ///
    /// The root node's subtree is deep-copied and every joint slot is rebound
    /// to the copy by name. A skin without a root joint shares its joints with
    /// the clone instead.
    ///
    /// # Panics
    /// When a bound joint cannot be found in the copied hierarchy.
    pub fn clone_skin(&mut self, key: SkinKey) -> Option<SkinKey> {
        let source = self.skins.get(key)?;
        let bind_shape = source.bind_shape;
        let source_joints = source.joints.clone();
        let hierarchy = source
            .root_node
            .zip(source.root_joint)
            .filter(|&(node, joint)| {
                self.nodes.contains_key(node) && self.nodes.contains_key(joint)
            });

        let clone_key = self.skins.insert_with_key(MeshSkin::new);
        let Self { nodes, skins, .. } = self;
        let clone = &mut skins[clone_key];
        clone.bind_shape = bind_shape;
        clone.set_joint_count(nodes, source_joints.len());

        let Some((root_node, root_joint)) = hierarchy else {
            for (index, joint) in source_joints.into_iter().enumerate() {
                clone.set_joint(nodes, joint, index);
            }
            return Some(clone_key);
        };

        let Some(copy) = scene::clone_subtree(nodes, root_node) else {
            return Some(clone_key);
        };
        let root_joint_name = nodes[root_joint].name.clone();
        let new_root_joint = if root_node == root_joint {
            copy
        } else {
            scene::find_node(nodes, copy, &root_joint_name).unwrap_or_else(|| {
                panic!("root joint '{root_joint_name}' missing from cloned hierarchy")
            })
        };

        for (index, joint) in source_joints.into_iter().enumerate() {
            let Some(joint) = joint else {
                continue;
            };
            let name = nodes.get(joint).map(|n| n.name.clone()).unwrap_or_default();
            let new_joint = scene::find_node(nodes, new_root_joint, &name)
                .or_else(|| (nodes[new_root_joint].name == name).then_some(new_root_joint))
                .unwrap_or_else(|| panic!("joint '{name}' missing from cloned hierarchy"));
            clone.set_joint(nodes, Some(new_joint), index);
        }

        clone.set_root_joint(nodes, Some(new_root_joint));
        log::debug!(
            "Cloned skin with {} joints under root joint '{root_joint_name}'",
            clone.joint_count()
        );
        Some(clone_key)
    }
}
