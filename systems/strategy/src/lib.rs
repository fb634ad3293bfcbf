#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! AI strategy engine that periodically proposes troop dispatches for one side.
//!
//! The engine never touches the battlefield. It watches the event stream for
//! elapsed time and combat outcomes, reads an immutable [`TowerView`] when its
//! action timer fires, and answers with `Command::DispatchTroops` batches.

mod decision;

use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tower_war_core::{
    ArrivalOutcome, Command, Difficulty, DispatchOrder, Event, Owner, TacticalMode, TowerId,
    TowerView,
};
use tracing::{debug, trace};

use decision::Battlefield;

/// Decision-making variant selected at session setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Always strikes the weakest reachable tower.
    Aggressive,
    /// Expands into neutral territory and only attacks from a surplus.
    Defensive,
    /// Switches posture from the balance of power.
    Adaptive,
}

impl Strategy {
    /// Strategy used by the AI at the provided difficulty.
    #[must_use]
    pub const fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self::Defensive,
            Difficulty::Medium => Self::Adaptive,
            Difficulty::Hard => Self::Aggressive,
        }
    }
}

/// Tunable thresholds shared by every variant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholds {
    /// Garrison a tower must exceed before it may dispatch.
    pub minimum_commit: u32,
    /// Garrison a tower must exceed before the defensive variant commits it.
    pub defensive_commit: u32,
    /// Margin by which a defensive attack must outweigh its target.
    pub surplus_margin: u32,
    /// Strength ratio above which the adaptive variant turns aggressive.
    pub upper_ratio: f64,
    /// Strength ratio below which the adaptive variant turns defensive.
    pub lower_ratio: f64,
    /// Maximum number of towers joining a coordinated assault.
    pub max_assault_sources: usize,
    /// Weight of a neutral garrison against distance when picking expansions.
    pub neutral_troop_weight: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            minimum_commit: 1,
            defensive_commit: 5,
            surplus_margin: 5,
            upper_ratio: 1.2,
            lower_ratio: 0.8,
            max_assault_sources: 3,
            neutral_troop_weight: 0.1,
        }
    }
}

/// Configuration parameters required to construct the strategy engine.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    side: Owner,
    strategy: Strategy,
    interval: Duration,
    thresholds: Thresholds,
    rng_seed: u64,
}

impl Config {
    /// Creates a configuration for `side` using the provided strategy and cadence.
    #[must_use]
    pub fn new(side: Owner, strategy: Strategy, interval: Duration, rng_seed: u64) -> Self {
        Self {
            side,
            strategy,
            interval,
            thresholds: Thresholds::default(),
            rng_seed,
        }
    }

    /// Configuration matching a difficulty tier.
    #[must_use]
    pub fn for_difficulty(side: Owner, difficulty: Difficulty, rng_seed: u64) -> Self {
        Self::new(
            side,
            Strategy::for_difficulty(difficulty),
            difficulty.action_interval(),
            rng_seed,
        )
    }

    /// Replaces the decision thresholds.
    #[must_use]
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }
}

/// Outcome counters kept for introspection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Statistics {
    /// Decision cycles that produced at least one dispatch.
    pub actions_taken: u32,
    /// Arrivals that captured a tower.
    pub successful_attacks: u32,
    /// Arrivals absorbed by the defending garrison.
    pub failed_attacks: u32,
    /// Towers taken from the side by anyone else.
    pub towers_lost: u32,
}

impl Statistics {
    /// Share of resolved attacks that captured their target, in percent.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        let resolved = self.successful_attacks + self.failed_attacks;
        if resolved == 0 {
            0.0
        } else {
            f64::from(self.successful_attacks) / f64::from(resolved) * 100.0
        }
    }
}

/// Pure system that turns elapsed time into AI dispatch commands.
#[derive(Debug)]
pub struct StrategyEngine {
    config: Config,
    accumulator: Duration,
    mode: Option<TacticalMode>,
    rng: ChaCha8Rng,
    stats: Statistics,
}

impl StrategyEngine {
    /// Creates a new engine using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            accumulator: Duration::ZERO,
            mode: None,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            stats: Statistics::default(),
        }
    }

    /// Side the engine plays for.
    #[must_use]
    pub const fn side(&self) -> Owner {
        self.config.side
    }

    /// Active strategy variant.
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.config.strategy
    }

    /// Tactical mode chosen during the most recent decision cycle.
    #[must_use]
    pub const fn mode(&self) -> Option<TacticalMode> {
        self.mode
    }

    /// Counters accumulated since construction or the last reset.
    #[must_use]
    pub const fn statistics(&self) -> Statistics {
        self.stats
    }

    /// Restores the engine to its freshly constructed state.
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    /// Consumes events and the tower view to emit dispatch commands.
    ///
    /// At most one decision is made per call. Elapsed intervals beyond the
    /// first are dropped so a long frame never leaves the timer behind; only
    /// the remainder carries over to the next call.
    pub fn handle(&mut self, events: &[Event], towers: &TowerView, out: &mut Vec<Command>) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => accumulated = accumulated.saturating_add(*dt),
                _ => self.record(event),
            }
        }

        if self.config.interval.is_zero() || accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        if self.accumulator < self.config.interval {
            return;
        }
        while self.accumulator >= self.config.interval {
            self.accumulator -= self.config.interval;
        }

        let orders = self.decide(towers);
        if orders.is_empty() {
            debug!(side = ?self.config.side, mode = ?self.mode, "AI holds");
            return;
        }

        self.stats.actions_taken = self.stats.actions_taken.saturating_add(1);
        debug!(
            side = ?self.config.side,
            strategy = ?self.config.strategy,
            mode = ?self.mode,
            orders = orders.len(),
            "AI dispatches troops"
        );
        emit_orders(self.config.side, &orders, out);
    }

    /// Evaluates the battlefield once and returns the proposed orders.
    ///
    /// Returns an empty list when no source can commit or no target exists.
    pub fn decide(&mut self, towers: &TowerView) -> Vec<DispatchOrder> {
        let side = self.config.side;
        if !side.is_combatant() {
            return Vec::new();
        }

        let field = Battlefield::partition(towers, side);
        let thresholds = &self.config.thresholds;
        match self.config.strategy {
            Strategy::Aggressive => {
                self.mode = Some(TacticalMode::Aggressive);
                decision::aggressive(&field, thresholds)
            }
            Strategy::Defensive => {
                self.mode = Some(TacticalMode::Defensive);
                decision::defensive(&field, thresholds)
            }
            Strategy::Adaptive => {
                let mode = decision::assess(towers, side, thresholds);
                if self.mode != Some(mode) {
                    trace!(side = ?side, from = ?self.mode, to = ?mode, "tactical mode changed");
                }
                self.mode = Some(mode);
                decision::adaptive(&field, mode, thresholds, &mut self.rng)
            }
        }
    }

    fn record(&mut self, event: &Event) {
        let side = self.config.side;
        match event {
            Event::TroopArrived {
                owner, outcome, ..
            } if *owner == side => match outcome {
                ArrivalOutcome::Captured => {
                    self.stats.successful_attacks = self.stats.successful_attacks.saturating_add(1);
                }
                ArrivalOutcome::Repelled => {
                    self.stats.failed_attacks = self.stats.failed_attacks.saturating_add(1);
                }
                ArrivalOutcome::Reinforced => {}
            },
            Event::TowerCaptured { old_owner, .. } if *old_owner == side => {
                self.stats.towers_lost = self.stats.towers_lost.saturating_add(1);
            }
            _ => {}
        }
    }
}

/// Groups orders by target so each target receives one multi-source dispatch.
fn emit_orders(side: Owner, orders: &[DispatchOrder], out: &mut Vec<Command>) {
    let mut targets: Vec<TowerId> = orders.iter().map(|order| order.target).collect();
    targets.sort();
    targets.dedup();

    for target in targets {
        let sources = orders
            .iter()
            .filter(|order| order.target == target)
            .map(|order| order.source)
            .collect();
        out.push(Command::DispatchTroops {
            side,
            sources,
            target,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_selects_strategy_and_cadence() {
        assert_eq!(
            Strategy::for_difficulty(Difficulty::Easy),
            Strategy::Defensive
        );
        assert_eq!(
            Strategy::for_difficulty(Difficulty::Medium),
            Strategy::Adaptive
        );
        assert_eq!(
            Strategy::for_difficulty(Difficulty::Hard),
            Strategy::Aggressive
        );

        let config = Config::for_difficulty(Owner::Enemy, Difficulty::Hard, 0);
        assert_eq!(config.interval, Duration::from_secs(2));
    }

    #[test]
    fn success_rate_handles_no_attacks() {
        let stats = Statistics::default();
        assert_eq!(stats.success_rate(), 0.0);

        let stats = Statistics {
            successful_attacks: 3,
            failed_attacks: 1,
            ..Statistics::default()
        };
        assert!((stats.success_rate() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn orders_are_grouped_per_target() {
        let orders = [
            DispatchOrder::new(TowerId::new(0), TowerId::new(5)),
            DispatchOrder::new(TowerId::new(1), TowerId::new(5)),
        ];
        let mut out = Vec::new();
        emit_orders(Owner::Enemy, &orders, &mut out);
        assert_eq!(
            out,
            vec![Command::DispatchTroops {
                side: Owner::Enemy,
                sources: vec![TowerId::new(0), TowerId::new(1)],
                target: TowerId::new(5),
            }]
        );
    }
}
