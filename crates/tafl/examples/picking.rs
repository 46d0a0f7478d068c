//! Builds a small scene, runs a few frames, and feeds it pointer clicks.
//!
//! There is no window: the "drawing surface" is stdout, which receives each
//! renderable's canvas transform the way a 2D context's `setTransform` would.
//!
//! Run with `RUST_LOG=tafl=debug cargo run -p tafl --example picking`.

use std::error::Error;
use std::f32::consts::{FRAC_PI_2, PI};

use serde_json::json;
use tafl::prelude::*;

fn draw(world: &mut World) {
    let entries: Vec<Entity> = world.display_list().iter().map(|d| d.entity).collect();
    for entity in entries {
        let Some(m) = world.canvas_transform(entity) else {
            continue;
        };
        let kind = world
            .store()
            .renderable_of(entity)
            .and_then(|t| world.registry().name_of(t))
            .unwrap_or("group");
        println!(
            "  draw {entity:<4} {kind:<9} setTransform({:.1}, {:.1}, {:.1}, {:.1}, {:.1}, {:.1})",
            m[0], m[1], m[2], m[3], m[4], m[5]
        );
    }
}

fn logger(name: &'static str, propagation: Propagation) -> EventHandlers {
    EventHandlers::new().on("click", move |event: &Event| {
        println!(
            "  {name} got `{}` for {} (payload {:?})",
            event.name, event.target, event.payload
        );
        propagation
    })
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = SpatialConfig::from_json(r#"{ "curve_samples": 48 }"#)?;
    let mut world = World::with_config(config);

    let panel = world.spawn((
        Transform::from_xy(50.0, 50.0),
        Rect::new(300.0, 200.0).with_radius(12.0).with_style(Style {
            fill: Some(Color::WHITE),
            stroke: Some(Color::BLACK),
            ..Style::default()
        }),
        logger("panel", Propagation::Stop),
    ))?;
    world.add_to_scene(panel, None)?;

    let dial = world.spawn((
        Transform::from_xy(100.0, 100.0),
        Circle::new(40.0).with_arc(0.0, 3.0 * FRAC_PI_2, false),
        logger("dial", Propagation::Continue),
    ))?;
    world.add_to_scene(dial, Some(panel))?;

    let wire = world.spawn((
        Transform::IDENTITY,
        Curve::cubic(
            Vec2::new(160.0, 150.0),
            Vec2::new(200.0, 50.0),
            Vec2::new(240.0, 250.0),
            Vec2::new(280.0, 150.0),
        )
        .with_line_width(6.0),
    ))?;
    world.add_to_scene(wire, Some(panel))?;

    let badge = world.spawn((
        Transform::from_xy(250.0, 30.0).with_pivot(Vec2::new(20.0, 20.0)),
        Path::new()
            .move_to(Vec2::new(20.0, 0.0))
            .line_to(Vec2::new(40.0, 40.0))
            .line_to(Vec2::new(0.0, 40.0))
            .close()
            .compiled(),
        logger("badge", Propagation::Continue),
    ))?;
    world.add_to_scene(badge, Some(panel))?;

    // Spin the badge a quarter turn per frame.
    world.add_system(move |world: &mut World| {
        if let Some(t) = world.get_mut::<Transform>(badge) {
            let r = t.rotation();
            t.set_rotation((r + FRAC_PI_2) % (2.0 * PI));
        }
    });

    for frame in 0..3 {
        world.update()?;
        println!("frame {frame}");
        draw(&mut world);
    }

    for (x, y) in [(150.0, 150.0), (140.0, 180.0), (220.0, 150.0), (320.0, 100.0), (10.0, 10.0)] {
        println!("click at ({x}, {y})");
        match world.handle_pointer("click", x, y, Some(json!({ "button": 0 })))? {
            Some((target, outcome)) => println!(
                "  → target {target}, handled by {:?}, stopped at {:?}",
                outcome.handled_by, outcome.stopped_at
            ),
            None => println!("  → nothing there"),
        }
    }

    if let Some(bb) = world.bounds(panel) {
        println!("panel bounds: {:?}", bb.total_aabb.map(|b| b.to_array()));
    }

    #[cfg(feature = "diagnostics")]
    println!("{:#?}", world.stats());

    Ok(())
}
