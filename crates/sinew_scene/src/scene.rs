use glam::{Affine3A, Mat4, Quat, Vec3};
use slotmap::SlotMap;

use crate::listener::{Subscriber, TransformListener};
use crate::node::Node;
use crate::skin::MeshSkin;
use crate::transform::Transform;
use crate::{NodeHandle, SkinKey};

/// Node arena plus the skins bound to it.
///
/// All cross-object bookkeeping (ownership counts, joint/skin counts,
/// transform listeners) goes through `Scene` so it stays consistent.
pub struct Scene {
    pub(crate) nodes: SlotMap<NodeHandle, Node>,
    pub root_nodes: Vec<NodeHandle>,
    pub(crate) skins: SlotMap<SkinKey, MeshSkin>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root_nodes: Vec::new(),
            skins: SlotMap::with_key(),
        }
    }

    // ========================================================================
    // Node creation & hierarchy
    // ========================================================================

    /// Creates a floating node: it starts with no references, so nothing frees
    /// it until it is attached, bound to a skin, or passed to
    /// [`Scene::remove_node`].
    pub fn create_node(&mut self, name: &str) -> NodeHandle {
        self.nodes.insert(Node::new(name))
    }

    /// Creates a floating joint node. See [`Scene::create_node`].
    pub fn create_joint(&mut self, name: &str, inverse_bind_pose: Mat4) -> NodeHandle {
        self.nodes.insert(Node::new_joint(name, inverse_bind_pose))
    }

    /// Adds a node at the scene root.
    ///
    /// Hierarchy links and ownership counts carried by `node` (for example a
    /// clone of a live node) are discarded.
    pub fn add_node(&mut self, node: Node) -> NodeHandle {
        let mut node = node;
        node.clear_links();
        node.ref_count = 1;
        let handle = self.nodes.insert(node);
        self.root_nodes.push(handle);
        handle
    }

    /// Adds a node as the last child of `parent`. Falls back to the scene root
    /// when `parent` is stale. Like [`Scene::add_node`], links carried by
    /// `child` are discarded.
    pub fn add_to_parent(&mut self, child: Node, parent: NodeHandle) -> NodeHandle {
        let mut child = child;
        child.clear_links();
        let handle = self.nodes.insert(child);
        if self.nodes.contains_key(parent) {
            self.attach(handle, parent);
        } else {
            log::warn!("Parent node not found, adding child to the scene root");
            if let Some(node) = self.nodes.get_mut(handle) {
                node.ref_count += 1;
            }
            self.root_nodes.push(handle);
        }
        handle
    }

    /// Makes `child` the last child of `parent`.
    ///
    /// Ownership moves with the node. Attaching a node to itself or to one of
    /// its descendants is ignored.
    pub fn attach(&mut self, child: NodeHandle, parent: NodeHandle) {
        if child == parent {
            log::warn!("Cannot attach node to itself!");
            return;
        }
        if !self.nodes.contains_key(child) || !self.nodes.contains_key(parent) {
            log::warn!("Cannot attach a stale node handle");
            return;
        }
        if is_ancestor(&self.nodes, child, parent) {
            log::warn!("Cannot attach a node to one of its descendants");
            return;
        }

        let had_owner = self.unlink(child);

        self.nodes[parent].children.push(child);
        let node = &mut self.nodes[child];
        node.parent = Some(parent);
        if !had_owner {
            node.ref_count += 1;
        }

        self.transform_changed(child);
    }

    /// Removes `node` from its parent (or the scene root) and drops that
    /// ownership. The node survives while something else still references it.
    /// A floating node that nothing references is freed.
    pub fn detach(&mut self, node: NodeHandle) {
        let had_owner = self.unlink(node);
        let floating = self.nodes.get(node).is_some_and(|n| n.ref_count == 0);
        if had_owner || floating {
            release_node(&mut self.nodes, node);
        }
    }

    /// Removes a node and, with it, every descendant that nothing else keeps
    /// alive.
    pub fn remove_node(&mut self, node: NodeHandle) {
        self.detach(node);
    }

    /// Takes an extra reference on a node.
    pub fn retain(&mut self, node: NodeHandle) {
        retain_node(&mut self.nodes, node);
    }

    /// Drops a reference taken with [`Scene::retain`].
    pub fn release(&mut self, node: NodeHandle) {
        release_node(&mut self.nodes, node);
    }

    /// Breaks the link between `node` and its owner in the hierarchy.
    /// Returns whether there was one.
    fn unlink(&mut self, node: NodeHandle) -> bool {
        let Some(parent) = self.nodes.get(node).map(|n| n.parent) else {
            return false;
        };

        match parent {
            Some(parent) => {
                if let Some(p) = self.nodes.get_mut(parent)
                    && let Some(i) = p.children.iter().position(|&c| c == node)
                {
                    p.children.remove(i);
                }
                self.nodes[node].parent = None;
                true
            }
            None => {
                if let Some(i) = self.root_nodes.iter().position(|&r| r == node) {
                    self.root_nodes.remove(i);
                    true
                } else {
                    false
                }
            }
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[inline]
    #[must_use]
    pub fn get_node(&self, handle: NodeHandle) -> Option<&Node> {
        self.nodes.get(handle)
    }

    /// Mutable access to a node. Transform edits made through this reference
    /// do not notify listeners; use [`Scene::update_transform`] for that.
    #[inline]
    pub fn get_node_mut(&mut self, handle: NodeHandle) -> Option<&mut Node> {
        self.nodes.get_mut(handle)
    }

    #[inline]
    #[must_use]
    pub fn contains_node(&self, handle: NodeHandle) -> bool {
        self.nodes.contains_key(handle)
    }

    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Every live node, in arena order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = (NodeHandle, &Node)> {
        self.nodes.iter()
    }

    #[inline]
    #[must_use]
    pub fn parent(&self, handle: NodeHandle) -> Option<NodeHandle> {
        self.nodes.get(handle)?.parent
    }

    #[must_use]
    pub fn children(&self, handle: NodeHandle) -> &[NodeHandle] {
        self.nodes.get(handle).map_or(&[], |n| n.children.as_slice())
    }

    /// Searches the descendants of `from` (not `from` itself) depth-first.
    #[must_use]
    pub fn find_node(&self, from: NodeHandle, name: &str) -> Option<NodeHandle> {
        find_node(&self.nodes, from, name)
    }

    /// The ancestor of `handle` that has no parent, or `handle` itself.
    #[must_use]
    pub fn top_level_ancestor(&self, handle: NodeHandle) -> NodeHandle {
        top_level_ancestor(&self.nodes, handle)
    }

    /// World matrix of a node, resolved through its parent chain.
    #[must_use]
    pub fn world_matrix(&self, handle: NodeHandle) -> Option<Affine3A> {
        world_matrix(&self.nodes, handle)
    }

    /// Deep-copies `root` and its descendants. The copy is floating, like a
    /// node from [`Scene::create_node`].
    pub fn clone_subtree(&mut self, root: NodeHandle) -> Option<NodeHandle> {
        clone_subtree(&mut self.nodes, root)
    }

    // ========================================================================
    // Transform updates & notification
    // ========================================================================

    /// Edits a node's transform and notifies the listeners of the node and of
    /// every descendant.
    pub fn update_transform(&mut self, handle: NodeHandle, f: impl FnOnce(&mut Transform)) {
        let Some(node) = self.nodes.get_mut(handle) else {
            log::warn!("Cannot update the transform of a stale node");
            return;
        };
        f(&mut node.transform);
        self.transform_changed(handle);
    }

    pub fn set_transform(&mut self, handle: NodeHandle, transform: Transform) {
        self.update_transform(handle, |t| *t = transform);
    }

    pub fn set_position(&mut self, handle: NodeHandle, position: Vec3) {
        self.update_transform(handle, |t| t.position = position);
    }

    pub fn set_rotation(&mut self, handle: NodeHandle, rotation: Quat) {
        self.update_transform(handle, |t| t.rotation = rotation);
    }

    pub fn set_scale(&mut self, handle: NodeHandle, scale: Vec3) {
        self.update_transform(handle, |t| t.scale = scale);
    }

    /// Fires the transform listeners of `handle` and its descendants, parents
    /// before children. Returns how many listeners were notified.
    pub fn transform_changed(&mut self, handle: NodeHandle) -> usize {
        let mut fired: Vec<TransformListener> = Vec::new();
        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            fired.extend_from_slice(&node.listeners);
            stack.extend(node.children.iter().rev().copied());
        }

        let mut notified = 0;
        for listener in fired {
            match listener.subscriber {
                Subscriber::Skin(key) => {
                    if let Some(skin) = self.skins.get(key) {
                        skin.transform_changed(&mut self.nodes, listener.tag);
                        notified += 1;
                    }
                }
            }
        }
        notified
    }
}

// ============================================================================
// Arena helpers
// ============================================================================

pub(crate) fn retain_node(nodes: &mut SlotMap<NodeHandle, Node>, handle: NodeHandle) {
    if let Some(node) = nodes.get_mut(handle) {
        node.ref_count += 1;
    }
}

/// Drops one reference. Nodes that reach zero are freed and release their
/// children in turn.
pub(crate) fn release_node(nodes: &mut SlotMap<NodeHandle, Node>, handle: NodeHandle) {
    let mut pending = vec![handle];
    while let Some(current) = pending.pop() {
        let Some(node) = nodes.get_mut(current) else {
            continue;
        };
        node.ref_count = node.ref_count.saturating_sub(1);
        if node.ref_count > 0 {
            continue;
        }

        let Some(freed) = nodes.remove(current) else {
            continue;
        };
        log::trace!("Freed node '{}'", freed.name);
        for child in freed.children {
            if let Some(c) = nodes.get_mut(child) {
                c.parent = None;
            }
            pending.push(child);
        }
    }
}

pub(crate) fn top_level_ancestor(
    nodes: &SlotMap<NodeHandle, Node>,
    handle: NodeHandle,
) -> NodeHandle {
    let mut current = handle;
    while let Some(parent) = nodes.get(current).and_then(|n| n.parent) {
        current = parent;
    }
    current
}

/// True when `ancestor` is `node` or lies on its parent chain.
fn is_ancestor(nodes: &SlotMap<NodeHandle, Node>, ancestor: NodeHandle, node: NodeHandle) -> bool {
    let mut current = Some(node);
    while let Some(c) = current {
        if c == ancestor {
            return true;
        }
        current = nodes.get(c).and_then(|n| n.parent);
    }
    false
}

pub(crate) fn world_matrix(
    nodes: &SlotMap<NodeHandle, Node>,
    handle: NodeHandle,
) -> Option<Affine3A> {
    let mut node = nodes.get(handle)?;
    let mut matrix = node.transform.local_matrix();
    while let Some(parent) = node.parent.and_then(|p| nodes.get(p)) {
        matrix = parent.transform.local_matrix() * matrix;
        node = parent;
    }
    Some(matrix)
}

/// Transform of `handle` relative to the space of `stop` (exclusive), or to
/// world space when `stop` is not an ancestor.
pub(crate) fn relative_matrix(
    nodes: &SlotMap<NodeHandle, Node>,
    handle: NodeHandle,
    stop: Option<NodeHandle>,
) -> Option<Affine3A> {
    let mut node = nodes.get(handle)?;
    let mut matrix = node.transform.local_matrix();
    while let Some(parent) = node.parent {
        if Some(parent) == stop {
            break;
        }
        let Some(parent_node) = nodes.get(parent) else {
            break;
        };
        matrix = parent_node.transform.local_matrix() * matrix;
        node = parent_node;
    }
    Some(matrix)
}

pub(crate) fn find_node(
    nodes: &SlotMap<NodeHandle, Node>,
    from: NodeHandle,
    name: &str,
) -> Option<NodeHandle> {
    let mut stack: Vec<NodeHandle> = nodes.get(from)?.children.iter().rev().copied().collect();
    while let Some(current) = stack.pop() {
        let Some(node) = nodes.get(current) else {
            continue;
        };
        if node.name == name {
            return Some(current);
        }
        stack.extend(node.children.iter().rev().copied());
    }
    None
}

pub(crate) fn clone_subtree(
    nodes: &mut SlotMap<NodeHandle, Node>,
    root: NodeHandle,
) -> Option<NodeHandle> {
    let root_copy = nodes.get(root)?.detached_copy();
    let copy_root = nodes.insert(root_copy);

    // (source, copy) pairs whose children still need copying.
    let mut pending = vec![(root, copy_root)];
    while let Some((source, copy)) = pending.pop() {
        let children = nodes.get(source).map(|n| n.children.clone()).unwrap_or_default();
        for child in children {
            let Some(child_node) = nodes.get(child) else {
                continue;
            };
            let mut child_copy = child_node.detached_copy();
            child_copy.parent = Some(copy);
            child_copy.ref_count = 1;
            let child_copy = nodes.insert(child_copy);
            nodes[copy].children.push(child_copy);
            pending.push((child, child_copy));
        }
    }
    Some(copy_root)
}
