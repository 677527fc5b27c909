use glam::Mat4;
use sinew_core::BoundingBox;
use smallvec::SmallVec;

use crate::joint::Joint;
use crate::listener::{Subscriber, TransformListener};
use crate::transform::Transform;
use crate::{NodeHandle, SkinKey};

/// What kind of object a node is.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// A plain transform node.
    Node,
    /// A skeletal joint that skins can bind to.
    Joint(Joint),
}

/// Renderable attachment of a node. Only the skin is tracked here; meshes and
/// materials are owned elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Model {
    pub skin: Option<SkinKey>,
}

/// A scene node.
///
/// # Hierarchy
///
/// Nodes form a tree through `parent`/`children`. A parent owns its children:
/// when a node is freed its children lose their parent and one owner.
///
/// # Ownership
///
/// Nodes live in the [`Scene`](crate::Scene) arena and are reference counted.
/// Being a scene root or having a parent counts as one reference; every skin
/// slot or skin root that points at the node counts as another. A node is
/// freed when its count drops to zero.
#[derive(Debug, Clone)]
pub struct Node {
    /// Identifier used for lookups; may be empty.
    pub name: String,

    // === Core Hierarchy ===
    pub(crate) parent: Option<NodeHandle>,
    pub(crate) children: Vec<NodeHandle>,

    /// Local transform. Edits through [`Scene::update_transform`](crate::Scene::update_transform)
    /// notify listeners; direct edits do not.
    pub transform: Transform,

    pub(crate) kind: NodeKind,
    pub(crate) model: Option<Model>,

    // === Bookkeeping ===
    pub(crate) listeners: SmallVec<[TransformListener; 2]>,
    pub(crate) ref_count: u32,
    pub(crate) bounds: Option<BoundingBox>,
    pub(crate) bounds_dirty: bool,
}

impl Node {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self::with_kind(name, NodeKind::Node)
    }

    #[must_use]
    pub fn new_joint(name: &str, inverse_bind_pose: Mat4) -> Self {
        Self::with_kind(name, NodeKind::Joint(Joint::new(inverse_bind_pose)))
    }

    fn with_kind(name: &str, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            children: Vec::new(),
            transform: Transform::new(),
            kind,
            model: None,
            listeners: SmallVec::new(),
            ref_count: 0,
            bounds: None,
            bounds_dirty: true,
        }
    }

    #[must_use]
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeHandle] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    #[inline]
    #[must_use]
    pub fn is_joint(&self) -> bool {
        matches!(self.kind, NodeKind::Joint(_))
    }

    #[inline]
    #[must_use]
    pub fn joint(&self) -> Option<&Joint> {
        match &self.kind {
            NodeKind::Joint(joint) => Some(joint),
            NodeKind::Node => None,
        }
    }

    #[inline]
    pub fn joint_mut(&mut self) -> Option<&mut Joint> {
        match &mut self.kind {
            NodeKind::Joint(joint) => Some(joint),
            NodeKind::Node => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// Number of owners (parent or scene root, plus skins) keeping this node alive.
    #[inline]
    #[must_use]
    pub fn ref_count(&self) -> u32 {
        self.ref_count
    }

    // === Listeners ===

    #[inline]
    #[must_use]
    pub fn listeners(&self) -> &[TransformListener] {
        &self.listeners
    }

    pub fn add_listener(&mut self, subscriber: Subscriber, tag: u32) {
        self.listeners.push(TransformListener { subscriber, tag });
    }

    /// Removes every registration of `subscriber`.
    pub fn remove_listener(&mut self, subscriber: Subscriber) {
        self.listeners.retain(|l| l.subscriber != subscriber);
    }

    // === Bounds ===

    #[inline]
    #[must_use]
    pub fn is_bounds_dirty(&self) -> bool {
        self.bounds_dirty
    }

    #[inline]
    pub fn set_bounds_dirty(&mut self) {
        self.bounds_dirty = true;
    }

    /// Drops hierarchy links, listeners and ownership counts, leaving the node
    /// as it was before it entered any scene.
    pub(crate) fn clear_links(&mut self) {
        self.parent = None;
        self.children.clear();
        self.listeners.clear();
        self.ref_count = 0;
        if let NodeKind::Joint(joint) = &mut self.kind {
            joint.skin_count = 0;
        }
    }

    /// Copy of this node without hierarchy links, listeners, models or owners.
    pub(crate) fn detached_copy(&self) -> Self {
        let kind = match &self.kind {
            NodeKind::Node => NodeKind::Node,
            NodeKind::Joint(joint) => NodeKind::Joint(Joint::new(joint.inverse_bind_pose)),
        };
        Self::with_kind(&self.name, kind).with_transform(self.transform)
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new("")
    }
}
