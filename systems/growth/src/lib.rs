#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Growth scheduler that periodically reinforces contested towers.

use std::time::Duration;

use tower_war_core::{Command, Event, TowerView};

/// Pure system that converts elapsed simulation time into growth pulses.
#[derive(Debug)]
pub struct Growth {
    interval: Duration,
    accumulator: Duration,
}

impl Growth {
    /// Creates a scheduler that fires one pulse per `interval` of simulated time.
    ///
    /// A zero interval never fires.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulator: Duration::ZERO,
        }
    }

    /// Consumes world events and the tower view to emit reinforcement commands.
    ///
    /// Every pulse adds each tower's growth rate; neutral towers report a zero
    /// rate and are skipped entirely.
    pub fn handle(&mut self, events: &[Event], towers: &TowerView, out: &mut Vec<Command>) {
        if self.interval.is_zero() {
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }

        if accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        let pulses = self.resolve_pulses();
        if pulses == 0 {
            return;
        }

        for tower in towers.iter() {
            if !tower.owner.is_combatant() || tower.growth_rate == 0 {
                continue;
            }
            out.push(Command::ReinforceTower {
                tower: tower.id,
                amount: tower.growth_rate.saturating_mul(pulses),
            });
        }
    }

    /// Clears partially accumulated time.
    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }

    fn resolve_pulses(&mut self) -> u32 {
        let mut pulses: u32 = 0;
        while self.accumulator >= self.interval {
            self.accumulator -= self.interval;
            pulses = pulses.saturating_add(1);
        }
        pulses
    }
}
