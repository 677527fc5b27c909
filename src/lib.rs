//! Sinew: skeletal skinning and transform-animation optimization.
//!
//! - [`scene`]: joint hierarchy, mesh skins and matrix palettes
//! - [`animation`]: keyframed channels and animation containers
//! - [`encoder`]: offline splitting of combined transform channels
//!
//! ```rust,ignore
//! use sinew::{Node, Scene};
//! use glam::Mat4;
//!
//! let mut scene = Scene::new();
//! let hip = scene.add_node(Node::new_joint("hip", Mat4::IDENTITY));
//! let skin = scene.create_skin();
//! scene.set_joint_count(skin, 1);
//! scene.set_joint(skin, Some(hip), 0);
//! scene.set_root_joint(skin, Some(hip));
//!
//! let palette = scene.matrix_palette(skin).unwrap();
//! ```

pub use sinew_animation as animation;
pub use sinew_encoder as encoder;
pub use sinew_scene as scene;

pub use sinew_core::{BoundingBox, Result, SinewError, bounds, errors, math};

pub use animation::{Animation, AnimationChannel, Animations, InterpolationMode, TargetAttribute};
pub use encoder::{
    DecomposeReport, OptimizeSettings, RefObject, RefTable, decompose_animation,
    optimize_transform_animations,
};
pub use scene::{
    Joint, MeshSkin, Model, Node, NodeHandle, NodeKind, PALETTE_ROWS, ROOT_JOINT_PARENT_CHANGED,
    Scene, SkinKey, Subscriber, Transform, TransformListener,
};

pub use glam;
