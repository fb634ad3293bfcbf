#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that advances troops and detects arrivals.

use std::time::Duration;

use tower_war_core::{Command, Event, TroopSnapshot, TroopView};

/// Distance from the target centre below which a troop counts as arrived.
pub const DEFAULT_ARRIVAL_EPSILON: f32 = 0.5;

/// Pure system that reacts to world events and emits movement commands.
#[derive(Debug)]
pub struct Movement {
    arrival_epsilon: f32,
    ordered: Vec<TroopSnapshot>,
}

impl Movement {
    /// Creates a movement system using the provided arrival tolerance.
    #[must_use]
    pub fn new(arrival_epsilon: f32) -> Self {
        Self {
            arrival_epsilon: arrival_epsilon.max(0.0),
            ordered: Vec::new(),
        }
    }

    /// Consumes world events and the troop view to emit movement commands.
    ///
    /// Troops are processed in spawn order. A troop that reaches its target
    /// is followed immediately by a `Command::ResolveArrival`, so arrivals at
    /// the same tower within one tick resolve first-in first-out.
    pub fn handle(&mut self, events: &[Event], troops: &TroopView, out: &mut Vec<Command>) {
        let mut dt = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt: step } = event {
                dt = dt.saturating_add(*step);
            }
        }

        if dt.is_zero() || troops.is_empty() {
            return;
        }

        self.ordered.clear();
        self.ordered.extend(troops.iter().copied());
        self.ordered.sort_by_key(|troop| troop.id);

        for troop in &self.ordered {
            let elapsed = troop.elapsed.saturating_add(dt);
            let (position, arrived) = if elapsed >= troop.travel_time {
                (troop.destination, true)
            } else {
                let progress = elapsed.as_secs_f32() / troop.travel_time.as_secs_f32();
                let position = troop.origin.lerp(troop.destination, progress);
                let remaining = position.distance_to(troop.destination);
                (position, remaining <= self.arrival_epsilon)
            };

            out.push(Command::AdvanceTroop {
                troop: troop.id,
                position,
                elapsed,
            });
            if arrived {
                out.push(Command::ResolveArrival { troop: troop.id });
            }
        }
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self::new(DEFAULT_ARRIVAL_EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_war_core::{Owner, Position, TowerId, TroopId};

    fn troop(id: u64, travel_secs: u64, elapsed_ms: u64) -> TroopSnapshot {
        TroopSnapshot {
            id: TroopId::new(id),
            owner: Owner::Player,
            strength: 5,
            source: TowerId::new(0),
            target: TowerId::new(1),
            origin: Position::new(0.0, 0.0),
            destination: Position::new(100.0 * travel_secs as f32, 0.0),
            position: Position::new(0.0, 0.0),
            speed: 100.0,
            elapsed: Duration::from_millis(elapsed_ms),
            travel_time: Duration::from_secs(travel_secs),
        }
    }

    fn tick(dt: Duration) -> Vec<Event> {
        vec![Event::TimeAdvanced { dt }]
    }

    #[test]
    fn ignores_batches_without_time() {
        let mut movement = Movement::default();
        let view = TroopView::from_snapshots(vec![troop(0, 2, 0)]);
        let mut out = Vec::new();
        movement.handle(&[], &view, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn interpolates_along_the_route() {
        let mut movement = Movement::default();
        let view = TroopView::from_snapshots(vec![troop(0, 2, 0)]);
        let mut out = Vec::new();
        movement.handle(&tick(Duration::from_millis(500)), &view, &mut out);

        assert_eq!(out.len(), 1);
        match out[0] {
            Command::AdvanceTroop {
                position, elapsed, ..
            } => {
                assert!((position.x() - 50.0).abs() < 1e-3);
                assert_eq!(elapsed, Duration::from_millis(500));
            }
            ref other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn arrivals_follow_spawn_order() {
        let mut movement = Movement::default();
        let view = TroopView::from_snapshots(vec![troop(4, 1, 900), troop(2, 1, 950)]);
        let mut out = Vec::new();
        movement.handle(&tick(Duration::from_millis(200)), &view, &mut out);

        let arrivals: Vec<u64> = out
            .iter()
            .filter_map(|command| match command {
                Command::ResolveArrival { troop } => Some(troop.get()),
                _ => None,
            })
            .collect();
        assert_eq!(arrivals, vec![2, 4]);
    }

    #[test]
    fn epsilon_counts_as_arrival() {
        let mut movement = Movement::new(10.0);
        let view = TroopView::from_snapshots(vec![troop(0, 1, 0)]);
        let mut out = Vec::new();
        movement.handle(&tick(Duration::from_millis(950)), &view, &mut out);
        assert_eq!(
            out.last(),
            Some(&Command::ResolveArrival {
                troop: TroopId::new(0)
            })
        );
    }

    #[test]
    fn zero_length_routes_arrive_on_first_tick() {
        let mut movement = Movement::default();
        let view = TroopView::from_snapshots(vec![troop(0, 0, 0)]);
        let mut out = Vec::new();
        movement.handle(&tick(Duration::from_millis(16)), &view, &mut out);
        assert_eq!(out.len(), 2);
    }
}
