//! End-to-end behaviour through the public surface: archetype bookkeeping,
//! scene structure, the two spatial passes, picking and bubbling.

use std::any::TypeId;
use std::f32::consts::TAU;
use std::sync::{Arc, Mutex};

use tafl::ecs::{Entity, SceneTree};
use tafl::prelude::*;
use tafl::transform::propagate;

#[derive(Debug)]
struct Tag(&'static str);

fn world() -> World {
    let mut world = World::new();
    world.register_component::<Tag>("Tag").unwrap();
    world
}

fn placed_rect(world: &mut World, parent: Option<Entity>, x: f32, y: f32, w: f32, h: f32) -> Entity {
    let e = world
        .spawn((Transform::from_xy(x, y), Rect::new(w, h)))
        .unwrap();
    world.add_to_scene(e, parent).unwrap();
    e
}

#[test]
fn archetype_key_follows_every_mutation() {
    let mut world = world();
    let e = world.create_entity();
    let steps: [(&str, fn(&mut World, Entity)); 5] = [
        ("Tag", |w, e| w.add_component(e, Tag("a")).unwrap()),
        ("Tag|Transform", |w, e| w.add_component(e, Transform::IDENTITY).unwrap()),
        ("Rect|Tag|Transform", |w, e| w.add_component(e, Rect::new(1.0, 1.0)).unwrap()),
        ("Rect|Transform", |w, e| {
            w.remove::<Tag>(e).unwrap();
        }),
        ("Circle|Transform", |w, e| w.add_component(e, Circle::new(1.0)).unwrap()),
    ];

    for (expected, step) in steps {
        step(&mut world, e);
        assert_eq!(world.archetype_key(e).unwrap().as_str(), expected);
    }

    let other = world.spawn((Transform::IDENTITY, Circle::new(2.0))).unwrap();
    let types = [TypeId::of::<Circle>(), TypeId::of::<Transform>()];
    assert_eq!(world.get_entities_with(&types), vec![e, other]);
    assert!(world.get_entities_with(&types[..1]).is_empty());
}

#[test]
fn second_renderable_evicts_first() {
    let mut world = world();
    let e = world.spawn((Rect::new(10.0, 10.0),)).unwrap();
    world.add_component(e, Polyline::open(vec![Vec2::ZERO, Vec2::X])).unwrap();

    assert!(!world.contains::<Rect>(e));
    assert!(world.contains::<Polyline>(e));
    assert_eq!(
        world.store().renderable_of(e),
        Some(TypeId::of::<Polyline>())
    );
}

#[test]
fn reparenting_keeps_subtree_order() {
    let mut world = world();
    let a = world.create_entity();
    let b = world.create_entity();
    let c1 = world.create_entity();
    let c2 = world.create_entity();
    let grandchild = world.create_entity();
    world.add_to_scene(a, None).unwrap();
    world.add_to_scene(b, None).unwrap();
    world.add_to_scene(c1, Some(a)).unwrap();
    world.add_to_scene(c2, Some(a)).unwrap();
    world.add_to_scene(grandchild, Some(c1)).unwrap();

    world.set_parent(a, Some(b)).unwrap();
    assert_eq!(world.get_parent(a), Ok(Some(b)));
    assert_eq!(world.children(a).unwrap(), &[c1, c2]);
    assert_eq!(world.children(c1).unwrap(), &[grandchild]);

    let order: Vec<Entity> = world.display_list().iter().map(|d| d.entity).collect();
    assert_eq!(order, vec![b, a, c1, grandchild, c2]);

    assert!(matches!(
        world.set_parent(b, Some(grandchild)),
        Err(EcsError::CyclicHierarchy { .. })
    ));
}

#[test]
fn destroyed_nodes_rematerialize_empty() {
    let mut tree = SceneTree::new();
    let [a, b, c] = [1, 2, 3].map(Entity::from_raw);
    tree.add(a, None).unwrap();
    tree.add(b, Some(a)).unwrap();
    tree.add(c, Some(b)).unwrap();

    assert_eq!(tree.destroy(a).unwrap(), vec![a, b, c]);
    assert!(tree.is_empty());

    let fresh = tree.get_or_create(b);
    assert!(fresh.children().is_empty());
    assert_eq!(fresh.parent(), None);
}

#[test]
fn display_list_rebuilds_only_on_structure_change() {
    let mut tree = SceneTree::new();
    let ids: Vec<Entity> = (1..=6).map(Entity::from_raw).collect();
    tree.add(ids[0], None).unwrap();
    tree.add(ids[1], Some(ids[0])).unwrap();
    tree.add(ids[2], None).unwrap();
    tree.add(ids[3], Some(ids[1])).unwrap();
    tree.add(ids[4], Some(ids[2])).unwrap();
    tree.add(ids[5], Some(ids[0])).unwrap();

    let first: Vec<Entity> = tree.display_list().iter().map(|d| d.entity).collect();
    assert_eq!(first, vec![ids[0], ids[1], ids[3], ids[5], ids[2], ids[4]]);
    tree.display_list();
    assert_eq!(tree.rebuild_count(), 1);

    tree.add(ids[2], Some(ids[3])).unwrap();
    let second: Vec<Entity> = tree.display_list().iter().map(|d| d.entity).collect();
    assert_eq!(second, vec![ids[0], ids[1], ids[3], ids[2], ids[4], ids[5]]);
    assert_eq!(tree.rebuild_count(), 2);
}

#[test]
fn transform_pass_is_idempotent() {
    let mut world = world();
    let root = world
        .spawn((Transform::from_xy(10.0, 0.0).with_rotation(0.3),))
        .unwrap();
    world.add_to_scene(root, None).unwrap();
    let child = placed_rect(&mut world, Some(root), 5.0, 5.0, 2.0, 2.0);

    assert_eq!(propagate(&mut world).unwrap(), 2);
    let before = [world.world_matrix(root), world.world_matrix(child)];
    assert!(!world.get::<Transform>(root).unwrap().is_dirty());
    assert!(!world.get::<Transform>(child).unwrap().is_dirty());

    assert_eq!(propagate(&mut world).unwrap(), 0);
    assert_eq!([world.world_matrix(root), world.world_matrix(child)], before);
}

#[test]
fn rect_picking_prefers_later_sibling() {
    let mut world = world();
    let first = placed_rect(&mut world, None, 0.0, 0.0, 100.0, 50.0);
    assert_eq!(world.pick_entity_at(50.0, 25.0).unwrap(), Some(first));
    assert_eq!(world.pick_entity_at(150.0, 25.0).unwrap(), None);

    let second = placed_rect(&mut world, None, 0.0, 0.0, 100.0, 50.0);
    assert_eq!(world.pick_entity_at(50.0, 25.0).unwrap(), Some(second));
}

#[test]
fn full_circle_hit() {
    let mut world = world();
    let e = world
        .spawn((Transform::IDENTITY, Circle::new(10.0).with_arc(0.0, TAU, false)))
        .unwrap();
    world.add_to_scene(e, None).unwrap();

    assert_eq!(world.pick_entity_at(5.0, 5.0).unwrap(), Some(e));
    assert_eq!(world.pick_entity_at(11.0, 0.0).unwrap(), None);
}

#[test]
fn parent_bounds_union_child() {
    let mut world = world();
    let parent = world.spawn((Rect::new(10.0, 10.0),)).unwrap();
    world.add_to_scene(parent, None).unwrap();
    // No transform on the parent: the child's matrix is its own.
    placed_rect(&mut world, Some(parent), 20.0, 20.0, 10.0, 10.0);
    world.update().unwrap();

    let bb = world.bounds(parent).unwrap();
    assert_eq!(bb.self_aabb, Some(Aabb::from_min_max(0.0, 0.0, 10.0, 10.0)));
    assert_eq!(bb.children_aabb, Some(Aabb::from_min_max(20.0, 20.0, 30.0, 30.0)));
    assert_eq!(bb.total_aabb, Some(Aabb::from_min_max(0.0, 0.0, 30.0, 30.0)));
}

#[test]
fn pointer_event_bubbles_until_stopped() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let handler = |tag: &'static str, result: Propagation| {
        let log = Arc::clone(&log);
        EventHandlers::new().on("click", move |event: &Event| {
            log.lock().unwrap().push((tag, event.target, event.position));
            result
        })
    };

    let mut world = world();
    let root = world.spawn((handler("root", Propagation::Continue),)).unwrap();
    world.add_to_scene(root, None).unwrap();
    let panel = placed_rect(&mut world, Some(root), 0.0, 0.0, 200.0, 200.0);
    world.add_component(panel, handler("panel", Propagation::Stop)).unwrap();
    let button = placed_rect(&mut world, Some(panel), 10.0, 10.0, 50.0, 20.0);
    world.add_component(button, handler("button", Propagation::Continue)).unwrap();

    let (target, outcome) = world
        .handle_pointer("click", 20.0, 15.0, None)
        .unwrap()
        .unwrap();
    assert_eq!(target, button);
    assert_eq!(outcome.handled_by, vec![button, panel]);
    assert_eq!(outcome.stopped_at, Some(panel));

    let at = Some(Vec2::new(20.0, 15.0));
    assert_eq!(
        *log.lock().unwrap(),
        vec![("button", button, at), ("panel", button, at)]
    );

    // Outside the button but inside the panel.
    let (target, _) = world
        .handle_pointer("click", 150.0, 150.0, None)
        .unwrap()
        .unwrap();
    assert_eq!(target, panel);
    assert!(world.handle_pointer("click", 500.0, 500.0, None).unwrap().is_none());
}

#[test]
fn moving_an_entity_moves_its_hit_area() {
    let mut world = world();
    let e = placed_rect(&mut world, None, 0.0, 0.0, 10.0, 10.0);
    assert_eq!(world.pick_entity_at(5.0, 5.0).unwrap(), Some(e));

    world
        .get_mut::<Transform>(e)
        .unwrap()
        .set_position(Vec2::new(100.0, 100.0));
    assert_eq!(world.pick_entity_at(5.0, 5.0).unwrap(), None);
    assert_eq!(world.pick_entity_at(105.0, 105.0).unwrap(), Some(e));
}

#[test]
fn hidden_shapes_are_not_picked() {
    let mut world = world();
    let e = world
        .spawn((
            Transform::IDENTITY,
            Rect::new(10.0, 10.0).with_style(Style::hidden()),
        ))
        .unwrap();
    world.add_to_scene(e, None).unwrap();
    assert_eq!(world.pick_entity_at(5.0, 5.0).unwrap(), None);
    assert!(world.bounds(e).unwrap().self_aabb.is_some());
}

#[test]
fn overlapping_subpaths_fill_whether_compiled_or_not() {
    let square = |origin: Vec2| {
        Path::new()
            .move_to(origin)
            .line_to(origin + Vec2::new(10.0, 0.0))
            .line_to(origin + Vec2::new(10.0, 10.0))
            .line_to(origin + Vec2::new(0.0, 10.0))
            .close()
    };
    let commands: Vec<PathCommand> = square(Vec2::ZERO)
        .commands()
        .iter()
        .chain(square(Vec2::splat(5.0)).commands())
        .cloned()
        .collect();

    for path in [Path::from_commands(commands.clone()), Path::from_commands(commands).compiled()] {
        let mut world = world();
        let e = world.spawn((Transform::IDENTITY, path)).unwrap();
        world.add_to_scene(e, None).unwrap();
        assert_eq!(world.pick_entity_at(7.0, 7.0).unwrap(), Some(e));
        assert_eq!(world.pick_entity_at(12.0, 2.0).unwrap(), None);
    }
}
