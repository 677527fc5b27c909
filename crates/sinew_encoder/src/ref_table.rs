use rustc_hash::FxHashMap;
use sinew_animation::Animations;
use sinew_scene::{Node, NodeHandle, Scene, SkinKey};

/// What an identifier refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RefObject {
    Node(NodeHandle),
    Joint(NodeHandle),
    Skin(SkinKey),
    /// Index into an [`Animations`] list.
    Animation(usize),
}

impl RefObject {
    #[inline]
    #[must_use]
    pub fn is_joint(&self) -> bool {
        matches!(self, Self::Joint(_))
    }
}

/// Identifier table for everything an exported file can reference by name.
///
/// The first object registered under an id wins; later registrations with the
/// same id are ignored.
#[derive(Debug, Clone, Default)]
pub struct RefTable {
    entries: FxHashMap<String, RefObject>,
}

impl RefTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `object` under `id`. Returns whether it was added.
    pub fn add(&mut self, id: impl Into<String>, object: RefObject) -> bool {
        let id = id.into();
        if id.is_empty() {
            return false;
        }
        if let Some(existing) = self.entries.get(&id) {
            log::debug!("Id '{id}' already refers to {existing:?}, ignoring {object:?}");
            return false;
        }
        self.entries.insert(id, object);
        true
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: &str) -> Option<RefObject> {
        self.entries.get(id).copied()
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
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

    pub fn iter(&self) -> impl Iterator<Item = (&str, RefObject)> {
        self.entries.iter().map(|(id, object)| (id.as_str(), *object))
    }

    /// Registers every named node of `scene`.
    ///
    /// The hierarchy under the scene roots is walked depth-first first, so
    /// duplicate names resolve to the node found earliest in the tree. Nodes
    /// outside the hierarchy (held only by skins) follow.
    pub fn index_scene(&mut self, scene: &Scene) {
        let mut stack: Vec<NodeHandle> = scene.root_nodes.iter().rev().copied().collect();
        while let Some(handle) = stack.pop() {
            let Some(node) = scene.get_node(handle) else {
                continue;
            };
            self.add_node(handle, node);
            stack.extend(node.children().iter().rev().copied());
        }

        for (handle, node) in scene.iter_nodes() {
            if !self.contains(&node.name) {
                self.add_node(handle, node);
            }
        }
    }

    /// Registers every animation by id.
    pub fn index_animations(&mut self, animations: &Animations) {
        for (index, animation) in animations.iter().enumerate() {
            self.add(animation.id.as_str(), RefObject::Animation(index));
        }
    }

    fn add_node(&mut self, handle: NodeHandle, node: &Node) {
        let object = if node.is_joint() {
            RefObject::Joint(handle)
        } else {
            RefObject::Node(handle)
        };
        self.add(node.name.as_str(), object);
    }
}
