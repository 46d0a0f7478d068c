//! # System — Per-Frame Passes Over the World
//!
//! A system is a value that takes `&mut World` and does something with it.
//! Systems run in the order they are added; there is no parallelism and no
//! dependency graph. A frame is one call to [`World::update`], which runs the
//! user schedule and then the built-in spatial passes:
//!
//! ```text
//! user systems ──▶ TransformSystem (top-down) ──▶ BoundsSystem (bottom-up)
//! ```
//!
//! A system may fail. The schedule stops at the first error and hands it
//! back, leaving later systems unrun for that frame.

use super::world::World;
use crate::error::EcsError;

/// A system that can be executed on a [`World`].
///
/// Any `FnMut(&mut World)` implements this trait, so plain closures and
/// function pointers work directly. Implement it by hand for stateful or
/// fallible passes.
pub trait System {
    fn run(&mut self, world: &mut World) -> Result<(), EcsError>;
}

impl<F: FnMut(&mut World)> System for F {
    fn run(&mut self, world: &mut World) -> Result<(), EcsError> {
        (self)(world);
        Ok(())
    }
}

struct NamedSystem {
    #[cfg(any(feature = "diagnostics", test))]
    name: String,
    system: Box<dyn System>,
}

/// Wall-clock time one system took during the last [`Schedule::run`].
#[cfg(feature = "diagnostics")]
#[derive(Debug, Clone)]
pub struct SystemTiming {
    pub name: String,
    pub duration_us: f64,
}

/// An ordered list of systems to run.
#[derive(Default)]
pub struct Schedule {
    systems: Vec<NamedSystem>,
    #[cfg(feature = "diagnostics")]
    timings: Vec<SystemTiming>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a system to the end of the schedule.
    pub fn add_system<S: System + 'static>(&mut self, system: S) {
        self.systems.push(NamedSystem {
            #[cfg(any(feature = "diagnostics", test))]
            name: short_system_name(std::any::type_name::<S>()),
            system: Box::new(system),
        });
    }

    /// Run all systems in order, stopping at the first failure.
    pub fn run(&mut self, world: &mut World) -> Result<(), EcsError> {
        #[cfg(feature = "diagnostics")]
        {
            self.timings.clear();
            for ns in &mut self.systems {
                let start = std::time::Instant::now();
                let result = ns.system.run(world);
                self.timings.push(SystemTiming {
                    name: ns.name.clone(),
                    duration_us: start.elapsed().as_secs_f64() * 1_000_000.0,
                });
                if let Err(err) = result {
                    log::warn!("system `{}` failed: {err}", ns.name);
                    return Err(err);
                }
            }
        }
        #[cfg(not(feature = "diagnostics"))]
        {
            for ns in &mut self.systems {
                ns.system.run(world)?;
            }
        }
        Ok(())
    }

    /// Per-system timings from the most recent run.
    #[cfg(feature = "diagnostics")]
    pub fn timings(&self) -> &[SystemTiming] {
        &self.timings
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

/// Strip the module path from a fully-qualified type name, keeping only the
/// last meaningful segment (e.g. `demo::spin_system` → `spin_system`,
/// `{{closure}}` → `<closure>`).
#[cfg(any(feature = "diagnostics", test))]
fn short_system_name(full: &str) -> String {
    let name = full.rsplit("::").next().unwrap_or(full);
    if name.contains("closure") {
        "<closure>".to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_system(_world: &mut World) {}

    struct Failing;

    impl System for Failing {
        fn run(&mut self, _world: &mut World) -> Result<(), EcsError> {
            Err(EcsError::UnregisteredComponent("Nothing"))
        }
    }

    #[test]
    fn schedule_captures_system_name() {
        let mut schedule = Schedule::new();
        schedule.add_system(noop_system);
        assert_eq!(schedule.len(), 1);
        assert_eq!(schedule.systems[0].name, "noop_system");
    }

    #[test]
    fn closure_system_name() {
        let mut schedule = Schedule::new();
        schedule.add_system(|_world: &mut World| {});
        assert_eq!(schedule.systems[0].name, "<closure>");
    }

    #[test]
    fn runs_in_order_and_stops_on_error() {
        let mut world = World::new();
        let mut schedule = Schedule::new();
        schedule.add_system(|world: &mut World| {
            world.create_entity();
        });
        schedule.add_system(Failing);
        schedule.add_system(|world: &mut World| {
            world.create_entity();
        });

        let err = schedule.run(&mut world).unwrap_err();
        assert!(matches!(err, EcsError::UnregisteredComponent(_)));
        assert_eq!(world.entity_count(), 1);
    }
}
