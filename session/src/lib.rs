#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game session controller that owns the battlefield and drives every system.
//!
//! A [`Session`] is built from a [`LevelConfig`], advanced with
//! [`Session::tick`], and steered by the player through
//! [`Session::submit_order`]. Each non-paused tick runs growth, then movement
//! and arrival resolution, then the AI, then the terminal check, always in
//! that order. Events are handed to subscribers once the tick has resolved
//! and are also kept in a bounded queue that the presentation layer drains
//! per frame.

mod layout;
mod sink;
mod tuning;

use std::{collections::VecDeque, time::Duration};

use tower_war_core::{
    Command, ConfigurationError, Event, GameResult, InvalidOrder, LevelConfig, Owner, PerOwner,
    SessionState, TowerId, TowerView, TroopView,
};
use tower_war_system_growth::Growth;
use tower_war_system_movement::Movement;
use tower_war_system_strategy::{Config as StrategyConfig, StrategyEngine};
use tower_war_world::{self as world, query, World};
use tracing::{debug, info, warn};

pub use sink::{EventSink, SinkError, SubscriptionId};
pub use tower_war_system_strategy::{Statistics as AiStatistics, Strategy};
pub use tuning::{SessionTuning, DEFAULT_EVENT_QUEUE_LIMIT};

/// Immutable copy of the battlefield handed to the presentation layer.
#[derive(Clone, Debug)]
pub struct BattlefieldSnapshot {
    /// Lifecycle state when the snapshot was taken.
    pub state: SessionState,
    /// Level being played.
    pub level: u32,
    /// Simulated time since the session started.
    pub elapsed: Duration,
    /// Every tower.
    pub towers: TowerView,
    /// Every troop in flight.
    pub troops: TroopView,
}

/// Counters describing the session so far.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionStatistics {
    /// Level being played.
    pub level: u32,
    /// Simulated time since the session started.
    pub elapsed: Duration,
    /// Orders accepted from the player.
    pub player_orders: u32,
    /// Troops dispatched by either side.
    pub troops_dispatched: u32,
    /// Towers currently held per owner.
    pub towers: PerOwner<u32>,
    /// Troops currently in flight.
    pub troops_in_flight: usize,
    /// AI performance counters.
    pub ai: AiStatistics,
}

#[derive(Clone, Copy, Debug, Default)]
struct Counters {
    player_orders: u32,
    troops_dispatched: u32,
}

/// Explicitly constructed game session; owns every tower and troop.
pub struct Session {
    config: LevelConfig,
    tuning: SessionTuning,
    world: World,
    growth: Growth,
    movement: Movement,
    strategy: StrategyEngine,
    state: SessionState,
    counters: Counters,
    sinks: Vec<(SubscriptionId, Box<dyn EventSink>)>,
    next_subscription: u32,
    queue: VecDeque<Event>,
    dropped: usize,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("level", &self.config.level)
            .field("state", &self.state)
            .field("world", &self.world)
            .field("subscribers", &self.sinks.len())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Builds a session for the level using default tuning.
    ///
    /// No partial session is returned when the configuration is invalid.
    pub fn new(config: LevelConfig) -> Result<Self, ConfigurationError> {
        Self::with_tuning(config, SessionTuning::default())
    }

    /// Builds a session for the level using explicit tuning.
    pub fn with_tuning(
        config: LevelConfig,
        tuning: SessionTuning,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        tuning.validate()?;
        let world = build_world(&config)?;

        let interval = tuning
            .ai_interval
            .unwrap_or_else(|| config.ai_difficulty.action_interval());
        let strategy = StrategyConfig::new(
            Owner::Enemy,
            Strategy::for_difficulty(config.ai_difficulty),
            interval,
            tuning.ai_seed,
        )
        .with_thresholds(tuning.ai_thresholds);

        info!(
            level = config.level,
            name = %config.name,
            difficulty = ?config.ai_difficulty,
            "session created"
        );

        Ok(Self {
            growth: Growth::new(tuning.growth_interval),
            movement: Movement::new(tuning.arrival_epsilon),
            strategy: StrategyEngine::new(strategy),
            config,
            tuning,
            world,
            state: SessionState::Running,
            counters: Counters::default(),
            sinks: Vec::new(),
            next_subscription: 0,
            queue: VecDeque::new(),
            dropped: 0,
        })
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Configuration the session was built from.
    #[must_use]
    pub const fn config(&self) -> &LevelConfig {
        &self.config
    }

    /// Result of a finished session.
    #[must_use]
    pub const fn result(&self) -> Option<GameResult> {
        match self.state {
            SessionState::Won => Some(GameResult::Won),
            SessionState::Lost => Some(GameResult::Lost),
            SessionState::Running | SessionState::Paused => None,
        }
    }

    /// Strategy the AI plays with.
    #[must_use]
    pub const fn ai_strategy(&self) -> Strategy {
        self.strategy.strategy()
    }

    /// Advances the simulation by `dt`; does nothing unless running.
    pub fn tick(&mut self, dt: Duration) {
        if self.state != SessionState::Running {
            return;
        }

        let mut log = Vec::new();
        self.apply(Command::Tick { dt }, &mut log);
        let tick_events = log.clone();

        let mut commands = Vec::new();
        self.growth
            .handle(&tick_events, &query::tower_view(&self.world), &mut commands);
        self.apply_all(&mut commands, &mut log);

        self.movement
            .handle(&tick_events, &query::troop_view(&self.world), &mut commands);
        self.apply_all(&mut commands, &mut log);

        self.strategy
            .handle(&log, &query::tower_view(&self.world), &mut commands);
        self.apply_all(&mut commands, &mut log);

        self.check_terminal(&mut log);
        self.publish(log);
    }

    /// Submits a player order: every source sends half its garrison to `target`.
    ///
    /// A rejected order leaves the battlefield untouched and emits nothing.
    pub fn submit_order(
        &mut self,
        sources: &[TowerId],
        target: TowerId,
    ) -> Result<(), InvalidOrder> {
        if self.state != SessionState::Running {
            return Err(InvalidOrder::SessionNotRunning);
        }

        let mut events = Vec::new();
        let command = Command::DispatchTroops {
            side: Owner::Player,
            sources: sources.to_vec(),
            target,
        };
        if let Err(error) = world::apply(&mut self.world, command, &mut events) {
            debug!(%error, target = target.get(), "player order rejected");
            return Err(error);
        }

        self.counters.player_orders = self.counters.player_orders.saturating_add(1);
        self.count_departures(&events);
        self.publish(events);
        Ok(())
    }

    /// Freezes the simulation. Returns whether the state changed.
    pub fn pause(&mut self) -> bool {
        self.transition(SessionState::Running, SessionState::Paused)
    }

    /// Resumes a paused simulation. Returns whether the state changed.
    pub fn resume(&mut self) -> bool {
        self.transition(SessionState::Paused, SessionState::Running)
    }

    /// Rebuilds the battlefield from the level configuration.
    ///
    /// Subscribers stay registered; pending queued events are discarded.
    pub fn reset(&mut self) -> Result<(), ConfigurationError> {
        self.world = build_world(&self.config)?;
        self.growth = Growth::new(self.tuning.growth_interval);
        self.movement = Movement::new(self.tuning.arrival_epsilon);
        self.strategy.reset();
        self.counters = Counters::default();
        self.queue.clear();
        self.dropped = 0;

        let from = self.state;
        self.state = SessionState::Running;
        info!(level = self.config.level, ?from, "session reset");
        if from != SessionState::Running {
            self.publish(vec![Event::SessionStateChanged {
                from,
                to: SessionState::Running,
            }]);
        }
        Ok(())
    }

    /// Registers an observer notified after every resolution phase.
    pub fn subscribe(&mut self, sink: impl EventSink + 'static) -> SubscriptionId {
        let id = SubscriptionId::new(self.next_subscription);
        self.next_subscription = self.next_subscription.saturating_add(1);
        self.sinks.push((id, Box::new(sink)));
        id
    }

    /// Removes an observer. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.sinks.len();
        self.sinks.retain(|(subscription, _)| *subscription != id);
        self.sinks.len() != before
    }

    /// Takes the events produced since the previous drain.
    ///
    /// At most [`SessionTuning::event_queue_limit`] events are kept; older
    /// ones are discarded. Subscribers always see every event.
    pub fn drain_events(&mut self) -> Vec<Event> {
        if self.dropped > 0 {
            debug!(dropped = self.dropped, "undrained events were discarded");
            self.dropped = 0;
        }
        self.queue.drain(..).collect()
    }

    /// Immutable copy of the battlefield.
    #[must_use]
    pub fn snapshot(&self) -> BattlefieldSnapshot {
        BattlefieldSnapshot {
            state: self.state,
            level: self.config.level,
            elapsed: query::clock(&self.world),
            towers: query::tower_view(&self.world),
            troops: query::troop_view(&self.world),
        }
    }

    /// Counters describing the session so far.
    #[must_use]
    pub fn statistics(&self) -> SessionStatistics {
        let count = |owner: Owner| {
            u32::try_from(query::tower_count(&self.world, owner)).unwrap_or(u32::MAX)
        };
        SessionStatistics {
            level: self.config.level,
            elapsed: query::clock(&self.world),
            player_orders: self.counters.player_orders,
            troops_dispatched: self.counters.troops_dispatched,
            towers: PerOwner::new(
                count(Owner::Player),
                count(Owner::Enemy),
                count(Owner::Neutral),
            ),
            troops_in_flight: query::troops_in_flight(&self.world),
            ai: self.strategy.statistics(),
        }
    }

    fn apply(&mut self, command: Command, log: &mut Vec<Event>) {
        let start = log.len();
        if let Err(error) = world::apply(&mut self.world, command, log) {
            warn!(%error, "order rejected during tick");
        }
        self.count_departures(&log[start..]);
    }

    fn apply_all(&mut self, commands: &mut Vec<Command>, log: &mut Vec<Event>) {
        for command in commands.drain(..) {
            self.apply(command, log);
        }
    }

    fn count_departures(&mut self, events: &[Event]) {
        let departures = events
            .iter()
            .filter(|event| matches!(event, Event::TroopDeparted { .. }))
            .count();
        self.counters.troops_dispatched = self
            .counters
            .troops_dispatched
            .saturating_add(u32::try_from(departures).unwrap_or(u32::MAX));
    }

    fn check_terminal(&mut self, log: &mut Vec<Event>) {
        let players = query::tower_count(&self.world, Owner::Player);
        let enemies = query::tower_count(&self.world, Owner::Enemy);

        let (to, result) = match (players, enemies) {
            (0, 0) => return,
            (_, 0) => (SessionState::Won, GameResult::Won),
            (0, _) => (SessionState::Lost, GameResult::Lost),
            _ => return,
        };

        let from = self.state;
        self.state = to;
        info!(
            level = self.config.level,
            ?result,
            elapsed = ?query::clock(&self.world),
            "game ended"
        );
        log.push(Event::SessionStateChanged { from, to });
        log.push(Event::GameEnded { result });
    }

    fn transition(&mut self, from: SessionState, to: SessionState) -> bool {
        if self.state != from {
            return false;
        }
        self.state = to;
        info!(?from, ?to, "session state changed");
        self.publish(vec![Event::SessionStateChanged { from, to }]);
        true
    }

    fn publish(&mut self, events: Vec<Event>) {
        if events.is_empty() {
            return;
        }

        for (id, sink) in &mut self.sinks {
            for event in &events {
                if let Err(error) = sink.handle(event) {
                    warn!(subscription = id.get(), %error, "event sink failed");
                }
            }
        }
        self.enqueue(events);
    }

    fn enqueue(&mut self, events: Vec<Event>) {
        let limit = self.tuning.event_queue_limit;
        if limit == 0 {
            return;
        }

        self.queue.extend(events);
        let excess = self.queue.len().saturating_sub(limit);
        if excess == 0 {
            return;
        }
        if self.dropped == 0 {
            warn!(limit, "event queue full, dropping oldest undrained events");
        }
        let _ = self.queue.drain(..excess);
        self.dropped = self.dropped.saturating_add(excess);
    }
}

fn build_world(config: &LevelConfig) -> Result<World, ConfigurationError> {
    let mut world = World::new(config.troop_speed);
    for placement in layout::plan(config)? {
        let _ = world.place_tower(
            placement.position,
            placement.owner,
            placement.troops,
            config.capacity,
            config.growth_per_pulse,
        )?;
    }
    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_war_core::Difficulty;

    fn duel() -> LevelConfig {
        LevelConfig {
            level: 1,
            name: String::from("Duel"),
            towers: PerOwner::new(1, 1, 0),
            starting_troops: PerOwner::new(20, 10, 0),
            capacity: 50,
            growth_per_pulse: 0,
            troop_speed: 100.0,
            ai_difficulty: Difficulty::Easy,
            neutral_seed: 0,
        }
    }

    #[test]
    fn missing_side_is_a_configuration_error() {
        let mut config = duel();
        config.towers.player = 0;
        assert_eq!(
            Session::new(config).map(|_| ()),
            Err(ConfigurationError::MissingSide(Owner::Player))
        );
    }

    #[test]
    fn ticks_are_ignored_while_paused() {
        let mut session = Session::new(duel()).expect("session");
        assert!(session.pause());
        assert!(!session.pause());

        session.tick(Duration::from_secs(5));
        assert_eq!(session.snapshot().elapsed, Duration::ZERO);
        assert_eq!(
            session.submit_order(&[TowerId::new(0)], TowerId::new(1)),
            Err(InvalidOrder::SessionNotRunning)
        );

        assert!(session.resume());
        session.tick(Duration::from_secs(1));
        assert_eq!(session.snapshot().elapsed, Duration::from_secs(1));
    }

    #[test]
    fn player_orders_are_counted() {
        let mut session = Session::new(duel()).expect("session");
        session
            .submit_order(&[TowerId::new(0)], TowerId::new(1))
            .expect("order");

        let stats = session.statistics();
        assert_eq!(stats.player_orders, 1);
        assert_eq!(stats.troops_dispatched, 1);
        assert_eq!(stats.troops_in_flight, 1);
        assert_eq!(stats.towers, PerOwner::new(1, 1, 0));
    }
}
