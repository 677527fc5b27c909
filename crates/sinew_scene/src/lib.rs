//! Scene graph module
//!
//! Manages the joint hierarchy and the skins bound to it:
//! - [`Node`]: scene node (name, parent/children, transform, optional joint data)
//! - [`Joint`]: skinning data carried by joint nodes
//! - [`Transform`]: local position, rotation and scale
//! - [`Scene`]: node arena with reference-counted ownership and transform listeners
//! - [`MeshSkin`]: joint slots, bind shape and the per-frame matrix palette

mod bounds;
pub mod joint;
pub mod listener;
pub mod node;
pub mod scene;
pub mod skin;
pub mod transform;

pub use joint::Joint;
pub use listener::{Subscriber, TransformListener};
pub use node::{Model, Node, NodeKind};
pub use scene::Scene;
pub use skin::{MeshSkin, PALETTE_ROWS, ROOT_JOINT_PARENT_CHANGED};
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeHandle;
    pub struct SkinKey;
}
