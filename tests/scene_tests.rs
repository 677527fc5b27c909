//! Scene Integration Tests
//!
//! Tests for:
//! - Node hierarchy: attach/detach, find_node, top_level_ancestor
//! - Reference-counted ownership between the hierarchy and skins
//! - Floating nodes and nodes inserted from clones
//! - Transform-change notification and bounds-dirty propagation

use glam::{Mat4, Vec3};

use sinew::{Node, NodeHandle, Scene, SkinKey, Transform};

/// holder ─ hip ─ knee, a model node elsewhere, and a skin over hip/knee.
struct Rig {
    scene: Scene,
    holder: NodeHandle,
    hip: NodeHandle,
    knee: NodeHandle,
    model: NodeHandle,
    skin: SkinKey,
}

fn rig() -> Rig {
    init_logging();
    let mut scene = Scene::new();
    let holder = scene.add_node(Node::new("holder"));
    let hip = scene.add_to_parent(Node::new_joint("hip", Mat4::IDENTITY), holder);
    let knee = scene.add_to_parent(
        Node::new_joint("knee", Mat4::IDENTITY)
            .with_transform(Transform::from_translation(Vec3::NEG_Y)),
        hip,
    );
    let model = scene.add_node(Node::new("mesh"));

    let skin = scene.create_skin();
    scene.set_joint_count(skin, 2);
    scene.set_joint(skin, Some(hip), 0);
    scene.set_joint(skin, Some(knee), 1);
    scene.set_root_joint(skin, Some(hip));
    scene.set_skin_model(model, skin).unwrap();

    // Start every test from clean bounds.
    scene.bounds(model);

    Rig {
        scene,
        holder,
        hip,
        knee,
        model,
        skin,
    }
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn is_dirty(scene: &Scene, node: NodeHandle) -> bool {
    scene.get_node(node).unwrap().is_bounds_dirty()
}

// ============================================================================
// Hierarchy
// ============================================================================

#[test]
fn attach_moves_node_between_parents() {
    let mut scene = Scene::new();
    let a = scene.add_node(Node::new("a"));
    let b = scene.add_node(Node::new("b"));
    let c = scene.add_to_parent(Node::new("c"), a);

    scene.attach(c, b);

    assert!(scene.children(a).is_empty());
    assert_eq!(scene.children(b), [c]);
    assert_eq!(scene.parent(c), Some(b));
    assert_eq!(scene.get_node(c).unwrap().ref_count(), 1);
}

#[test]
fn attach_root_node_leaves_root_list() {
    let mut scene = Scene::new();
    let a = scene.add_node(Node::new("a"));
    let b = scene.add_node(Node::new("b"));

    scene.attach(b, a);

    assert_eq!(scene.root_nodes, [a]);
    assert_eq!(scene.get_node(b).unwrap().ref_count(), 1);
}

#[test]
fn attach_to_self_is_ignored() {
    let mut scene = Scene::new();
    let a = scene.add_node(Node::new("a"));
    scene.attach(a, a);
    assert_eq!(scene.parent(a), None);
    assert_eq!(scene.root_nodes, [a]);
}

#[test]
fn floating_node_gains_owner_on_attach() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("parent"));
    let floating = scene.create_node("floating");
    assert_eq!(scene.get_node(floating).unwrap().ref_count(), 0);

    scene.attach(floating, parent);
    assert_eq!(scene.get_node(floating).unwrap().ref_count(), 1);
}

#[test]
fn remove_node_frees_unreferenced_subtree() {
    let mut scene = Scene::new();
    let root = scene.add_node(Node::new("root"));
    let child = scene.add_to_parent(Node::new("child"), root);
    let grandchild = scene.add_to_parent(Node::new("grandchild"), child);

    scene.remove_node(root);

    assert!(!scene.contains_node(root));
    assert!(!scene.contains_node(child));
    assert!(!scene.contains_node(grandchild));
    assert_eq!(scene.node_count(), 0);
}

#[test]
fn adding_a_clone_of_a_live_node_starts_fresh() {
    let mut scene = Scene::new();
    let root = scene.add_node(Node::new("root"));
    let original = scene.add_to_parent(Node::new("a"), root);
    let child = scene.add_to_parent(Node::new("c"), original);

    let copy = scene.get_node(original).cloned().unwrap();
    let inserted = scene.add_to_parent(copy, root);

    let node = scene.get_node(inserted).unwrap();
    assert_eq!(node.ref_count(), 1);
    assert!(node.children().is_empty());
    assert_eq!(scene.parent(inserted), Some(root));
    assert_eq!(scene.parent(child), Some(original));
    assert_eq!(scene.children(original), [child]);

    scene.remove_node(inserted);
    assert!(!scene.contains_node(inserted));
    assert!(scene.contains_node(child));
}

#[test]
fn add_node_discards_carried_links() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("parent"));
    scene.add_to_parent(Node::new("child"), parent);

    let copy = scene.get_node(parent).cloned().unwrap();
    let inserted = scene.add_node(copy);

    assert_eq!(scene.get_node(inserted).unwrap().ref_count(), 1);
    assert!(scene.children(inserted).is_empty());
}

#[test]
fn removing_a_floating_node_frees_it() {
    let mut scene = Scene::new();
    let floating = scene.create_node("floating");

    scene.remove_node(floating);

    assert!(!scene.contains_node(floating));
    assert_eq!(scene.node_count(), 0);
}

#[test]
fn removing_a_floating_clone_frees_the_whole_copy() {
    let mut scene = Scene::new();
    let root = scene.add_node(Node::new("root"));
    scene.add_to_parent(Node::new("child"), root);

    let copy = scene.clone_subtree(root).unwrap();
    assert_eq!(scene.node_count(), 4);

    scene.remove_node(copy);

    assert!(!scene.contains_node(copy));
    assert_eq!(scene.node_count(), 2);
}

#[test]
fn removing_a_floating_node_held_by_a_skin_keeps_it() {
    let mut scene = Scene::new();
    let joint = scene.create_joint("j", Mat4::IDENTITY);
    let skin = scene.create_skin();
    scene.set_joint_count(skin, 1);
    scene.set_joint(skin, Some(joint), 0);

    scene.remove_node(joint);

    assert!(scene.contains_node(joint));
    assert_eq!(scene.get_node(joint).unwrap().ref_count(), 1);
}

#[test]
fn find_node_is_depth_first() {
    let mut scene = Scene::new();
    let root = scene.add_node(Node::new("root"));
    let a = scene.add_to_parent(Node::new("a"), root);
    let deep = scene.add_to_parent(Node::new("twin"), a);
    scene.add_to_parent(Node::new("twin"), root);

    assert_eq!(scene.find_node(root, "twin"), Some(deep));
    assert_eq!(scene.top_level_ancestor(deep), root);
}

// ============================================================================
// Ownership Between Hierarchy and Skins
// ============================================================================

#[test]
fn skin_keeps_removed_hierarchy_alive() {
    let mut rig = rig();

    rig.scene.remove_node(rig.holder);

    // The skin's root node reference keeps everything alive.
    assert!(rig.scene.contains_node(rig.holder));
    assert!(rig.scene.contains_node(rig.hip));
    assert!(rig.scene.contains_node(rig.knee));
    assert!(rig.scene.root_nodes.iter().all(|&r| r != rig.holder));

    rig.scene.remove_skin(rig.skin);

    assert!(!rig.scene.contains_node(rig.holder));
    assert!(!rig.scene.contains_node(rig.hip));
    assert!(!rig.scene.contains_node(rig.knee));
}

#[test]
fn joint_referenced_by_skin_survives_parent_removal() {
    let mut scene = Scene::new();
    let parent = scene.add_node(Node::new("parent"));
    let joint = scene.add_to_parent(Node::new_joint("j", Mat4::IDENTITY), parent);
    let skin = scene.create_skin();
    scene.set_joint_count(skin, 1);
    scene.set_joint(skin, Some(joint), 0);

    scene.remove_node(parent);

    assert!(!scene.contains_node(parent));
    assert!(scene.contains_node(joint));
    assert_eq!(scene.parent(joint), None);
    assert_eq!(scene.get_node(joint).unwrap().ref_count(), 1);
}

#[test]
fn retain_and_release_balance() {
    let mut scene = Scene::new();
    let node = scene.create_node("n");
    scene.retain(node);
    scene.retain(node);
    scene.release(node);
    assert!(scene.contains_node(node));
    scene.release(node);
    assert!(!scene.contains_node(node));
}

// ============================================================================
// Transform Notification & Bounds
// ============================================================================

#[test]
fn moving_root_joint_parent_dirties_model_bounds() {
    let mut rig = rig();
    assert!(!is_dirty(&rig.scene, rig.model));

    rig.scene.set_position(rig.holder, Vec3::X);

    assert!(is_dirty(&rig.scene, rig.model));
}

#[test]
fn moving_root_joint_itself_does_not_dirty_bounds() {
    let mut rig = rig();

    rig.scene.set_position(rig.hip, Vec3::X);
    rig.scene.set_position(rig.knee, Vec3::Z);

    assert!(!is_dirty(&rig.scene, rig.model));
}

#[test]
fn exactly_one_listener_on_root_joint_parent() {
    let rig = rig();
    let listeners = rig.scene.get_node(rig.holder).unwrap().listeners();
    assert_eq!(listeners.len(), 1);
    assert_eq!(listeners[0].tag, sinew::ROOT_JOINT_PARENT_CHANGED);
    assert_eq!(listeners[0].subscriber, sinew::Subscriber::Skin(rig.skin));
}

#[test]
fn parent_change_notifies_the_skin_once() {
    let mut rig = rig();

    assert_eq!(rig.scene.transform_changed(rig.holder), 1);
    assert_eq!(rig.scene.transform_changed(rig.hip), 0);
    assert_eq!(rig.scene.transform_changed(rig.knee), 0);
    assert_eq!(rig.scene.transform_changed(rig.model), 0);
    assert!(is_dirty(&rig.scene, rig.model));
}

#[test]
fn moving_an_ancestor_notifies_descendants() {
    let mut scene = Scene::new();
    let world = scene.add_node(Node::new("world"));
    let holder = scene.add_to_parent(Node::new("holder"), world);
    let hip = scene.add_to_parent(Node::new_joint("hip", Mat4::IDENTITY), holder);
    let model = scene.add_node(Node::new("mesh"));
    let skin = scene.create_skin();
    scene.set_joint_count(skin, 1);
    scene.set_joint(skin, Some(hip), 0);
    scene.set_root_joint(skin, Some(hip));
    scene.set_skin_model(model, skin).unwrap();
    scene.bounds(model);

    scene.set_scale(world, Vec3::splat(2.0));

    assert!(scene.get_node(model).unwrap().is_bounds_dirty());
}

#[test]
fn bounds_recompute_after_parent_moves() {
    let mut rig = rig();
    let before = rig.scene.bounds(rig.model).unwrap();

    rig.scene.set_position(rig.holder, Vec3::new(0.0, 0.0, 4.0));
    let after = rig.scene.bounds(rig.model).unwrap();

    assert!(after.center().abs_diff_eq(before.center() + Vec3::Z * 4.0, 1e-5));
    assert!(!is_dirty(&rig.scene, rig.model));
}

#[test]
fn removing_skin_clears_listener_and_model_link() {
    let mut rig = rig();
    rig.scene.remove_skin(rig.skin);

    assert!(rig.scene.get_node(rig.holder).unwrap().listeners().is_empty());
    assert_eq!(rig.scene.get_node(rig.model).unwrap().model().unwrap().skin, None);
}

#[test]
fn set_skin_model_rejects_stale_handles() {
    let mut scene = Scene::new();
    let node = scene.add_node(Node::new("mesh"));
    let skin = scene.create_skin();
    scene.remove_skin(skin);

    let err = scene.set_skin_model(node, skin).unwrap_err();
    assert!(matches!(err, sinew::SinewError::StaleHandle(_)));
}
