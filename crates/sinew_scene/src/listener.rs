use crate::SkinKey;

/// Objects that can observe a node's transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subscriber {
    Skin(SkinKey),
}

/// A non-owning registration on a node: `subscriber` is told about transform
/// changes together with the `tag` it registered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransformListener {
    pub subscriber: Subscriber,
    pub tag: u32,
}
