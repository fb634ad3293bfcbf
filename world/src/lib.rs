#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battlefield state management for Tower War.

mod combat;
mod towers;
mod troops;

use std::time::Duration;

use tower_war_core::{
    ArrivalOutcome, Command, ConfigurationError, Event, InvalidOrder, Owner, Position, TowerId,
    TroopId,
};
use tracing::{debug, info};

pub use combat::{resolve_arrival, Resolution};
pub use towers::Tower;
pub use troops::Troop;

/// Represents the authoritative Tower War battlefield.
#[derive(Debug)]
pub struct World {
    towers: Vec<Tower>,
    troops: Vec<Troop>,
    next_troop_id: u64,
    troop_speed: f32,
    clock: Duration,
    tick_index: u64,
}

impl World {
    /// Creates an empty battlefield whose troops march at `troop_speed` world units per second.
    #[must_use]
    pub fn new(troop_speed: f32) -> Self {
        Self {
            towers: Vec::new(),
            troops: Vec::new(),
            next_troop_id: 0,
            troop_speed,
            clock: Duration::ZERO,
            tick_index: 0,
        }
    }

    /// Places a tower during setup and returns its identifier.
    ///
    /// Identifiers are allocated sequentially in placement order.
    pub fn place_tower(
        &mut self,
        position: Position,
        owner: Owner,
        troops: u32,
        capacity: u32,
        growth: u32,
    ) -> Result<TowerId, ConfigurationError> {
        let next = u32::try_from(self.towers.len()).unwrap_or(u32::MAX);
        let id = TowerId::new(next);
        let tower = Tower::create(id, position, owner, troops, capacity, growth)?;
        self.towers.push(tower);
        Ok(id)
    }

    fn tower_index(&self, id: TowerId) -> Option<usize> {
        self.towers
            .binary_search_by_key(&id, |tower| tower.id())
            .ok()
    }

    fn troop_index(&self, id: TroopId) -> Option<usize> {
        self.troops
            .binary_search_by_key(&id, |troop| troop.id())
            .ok()
    }

    fn validate_dispatch(
        &self,
        side: Owner,
        sources: &[TowerId],
        target: TowerId,
    ) -> Result<(), InvalidOrder> {
        if sources.is_empty() {
            return Err(InvalidOrder::EmptySources);
        }

        if self.tower_index(target).is_none() {
            return Err(InvalidOrder::UnknownTower(target));
        }

        let mut has_spare_troops = false;
        for (position, &source) in sources.iter().enumerate() {
            let index = self
                .tower_index(source)
                .ok_or(InvalidOrder::UnknownTower(source))?;
            if source == target {
                return Err(InvalidOrder::SourceIsTarget(source));
            }
            if sources[..position].contains(&source) {
                return Err(InvalidOrder::DuplicateSource(source));
            }

            let tower = &self.towers[index];
            if !side.is_combatant() || tower.owner() != side {
                return Err(InvalidOrder::NotOwned {
                    tower: source,
                    side,
                });
            }
            has_spare_troops |= tower.troops() > 1;
        }

        if has_spare_troops {
            Ok(())
        } else {
            Err(InvalidOrder::NothingToSend)
        }
    }

    fn dispatch(
        &mut self,
        side: Owner,
        sources: &[TowerId],
        target: TowerId,
        out_events: &mut Vec<Event>,
    ) -> Result<(), InvalidOrder> {
        self.validate_dispatch(side, sources, target)?;

        let target_index = self
            .tower_index(target)
            .ok_or(InvalidOrder::UnknownTower(target))?;

        for &source in sources {
            let Some(source_index) = self.tower_index(source) else {
                continue;
            };

            let strength = self.towers[source_index].split_garrison();
            if strength == 0 {
                continue;
            }

            let id = TroopId::new(self.next_troop_id);
            self.next_troop_id = self.next_troop_id.saturating_add(1);
            let troop = Troop::create(
                id,
                &self.towers[source_index],
                &self.towers[target_index],
                strength,
                self.troop_speed,
            )?;

            debug!(
                troop = id.get(),
                ?side,
                source = source.get(),
                target = target.get(),
                strength,
                "troop departed"
            );
            self.troops.push(troop);
            out_events.push(Event::TroopDeparted {
                troop: id,
                owner: side,
                source,
                target,
                strength,
            });
        }

        Ok(())
    }

    fn resolve(&mut self, troop_id: TroopId, out_events: &mut Vec<Event>) {
        let Some(index) = self.troop_index(troop_id) else {
            return;
        };
        let troop = self.troops.remove(index);

        let Some(tower_index) = self.tower_index(troop.target()) else {
            return;
        };
        let tower = &mut self.towers[tower_index];
        let resolution = resolve_arrival(tower, troop.strength(), troop.owner());

        out_events.push(Event::TroopArrived {
            troop: troop.id(),
            owner: troop.owner(),
            target: tower.id(),
            strength: troop.strength(),
            outcome: resolution.outcome,
        });

        if resolution.outcome == ArrivalOutcome::Captured {
            info!(
                tower = tower.id().get(),
                old_owner = ?resolution.previous_owner,
                new_owner = ?tower.owner(),
                garrison = tower.troops(),
                "tower captured"
            );
            out_events.push(Event::TowerCaptured {
                tower: tower.id(),
                old_owner: resolution.previous_owner,
                new_owner: tower.owner(),
            });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Only `Command::DispatchTroops` can fail; a rejected order leaves the world
/// untouched and emits no events.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), InvalidOrder> {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::ReinforceTower { tower, amount } => {
            if let Some(index) = world.tower_index(tower) {
                let tower = &mut world.towers[index];
                if tower.owner().is_combatant() {
                    let troops = tower.reinforce(amount);
                    out_events.push(Event::TowerReinforced {
                        tower: tower.id(),
                        troops,
                    });
                }
            }
        }
        Command::DispatchTroops {
            side,
            sources,
            target,
        } => {
            world.dispatch(side, &sources, target, out_events)?;
        }
        Command::AdvanceTroop {
            troop,
            position,
            elapsed,
        } => {
            if let Some(index) = world.troop_index(troop) {
                world.troops[index].advance_to(position, elapsed);
                out_events.push(Event::TroopAdvanced { troop, position });
            }
        }
        Command::ResolveArrival { troop } => world.resolve(troop, out_events),
    }

    Ok(())
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use tower_war_core::{Owner, TowerId, TowerSnapshot, TowerView, TroopView};

    /// Captures a read-only view of every tower.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.iter().map(|tower| tower.snapshot()).collect())
    }

    /// Captures a read-only view of every troop in flight, ordered by spawn time.
    #[must_use]
    pub fn troop_view(world: &World) -> TroopView {
        TroopView::from_snapshots(world.troops.iter().map(|troop| troop.snapshot()).collect())
    }

    /// Snapshot of a single tower.
    #[must_use]
    pub fn tower(world: &World, id: TowerId) -> Option<TowerSnapshot> {
        world
            .tower_index(id)
            .map(|index| world.towers[index].snapshot())
    }

    /// Number of towers currently held by `owner`.
    #[must_use]
    pub fn tower_count(world: &World, owner: Owner) -> usize {
        world
            .towers
            .iter()
            .filter(|tower| tower.owner() == owner)
            .count()
    }

    /// Number of troops in flight.
    #[must_use]
    pub fn troops_in_flight(world: &World) -> usize {
        world.troops.len()
    }

    /// Simulated time accumulated by `Command::Tick`.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Number of ticks applied so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn duel() -> (World, TowerId, TowerId) {
        let mut world = World::new(100.0);
        let player = world
            .place_tower(Position::new(0.0, 0.0), Owner::Player, 20, 50, 1)
            .expect("player tower");
        let enemy = world
            .place_tower(Position::new(110.0, 0.0), Owner::Enemy, 10, 50, 1)
            .expect("enemy tower");
        (world, player, enemy)
    }

    fn dispatch(side: Owner, sources: Vec<TowerId>, target: TowerId) -> Command {
        Command::DispatchTroops {
            side,
            sources,
            target,
        }
    }

    #[test]
    fn tick_advances_clock() {
        let (mut world, _, _) = duel();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(250),
            },
            &mut events,
        )
        .expect("tick");

        assert_eq!(query::clock(&world), Duration::from_millis(250));
        assert_eq!(query::tick_index(&world), 1);
        assert_eq!(
            events,
            vec![Event::TimeAdvanced {
                dt: Duration::from_millis(250)
            }]
        );
    }

    #[test]
    fn dispatch_sends_half_and_keeps_remainder() {
        let (mut world, player, enemy) = duel();
        let mut events = Vec::new();

        apply(
            &mut world,
            dispatch(Owner::Player, vec![player], enemy),
            &mut events,
        )
        .expect("valid order");

        assert_eq!(query::tower(&world, player).map(|t| t.troops), Some(10));
        let troops = query::troop_view(&world).into_vec();
        assert_eq!(troops.len(), 1);
        assert_eq!(troops[0].strength, 10);
        assert_eq!(troops[0].owner, Owner::Player);
        assert_eq!(
            events,
            vec![Event::TroopDeparted {
                troop: TroopId::new(0),
                owner: Owner::Player,
                source: player,
                target: enemy,
                strength: 10,
            }]
        );
    }

    #[test]
    fn rejected_orders_leave_world_untouched() {
        let (mut world, player, enemy) = duel();
        let cases = vec![
            (
                dispatch(Owner::Player, vec![enemy], player),
                InvalidOrder::NotOwned {
                    tower: enemy,
                    side: Owner::Player,
                },
            ),
            (
                dispatch(Owner::Player, vec![player], player),
                InvalidOrder::SourceIsTarget(player),
            ),
            (
                dispatch(Owner::Player, vec![], enemy),
                InvalidOrder::EmptySources,
            ),
            (
                dispatch(Owner::Player, vec![player], TowerId::new(40)),
                InvalidOrder::UnknownTower(TowerId::new(40)),
            ),
            (
                dispatch(Owner::Player, vec![player, player], enemy),
                InvalidOrder::DuplicateSource(player),
            ),
            (
                dispatch(Owner::Neutral, vec![player], enemy),
                InvalidOrder::NotOwned {
                    tower: player,
                    side: Owner::Neutral,
                },
            ),
        ];

        for (command, expected) in cases {
            let mut events = Vec::new();
            assert_eq!(apply(&mut world, command, &mut events), Err(expected));
            assert!(events.is_empty());
        }

        assert_eq!(query::tower(&world, player).map(|t| t.troops), Some(20));
        assert_eq!(query::tower(&world, enemy).map(|t| t.troops), Some(10));
        assert_eq!(query::troops_in_flight(&world), 0);
    }

    #[test]
    fn towers_with_a_single_troop_have_nothing_to_send() {
        let mut world = World::new(100.0);
        let lonely = world
            .place_tower(Position::new(0.0, 0.0), Owner::Player, 1, 50, 1)
            .expect("tower");
        let enemy = world
            .place_tower(Position::new(50.0, 0.0), Owner::Enemy, 5, 50, 1)
            .expect("tower");
        let mut events = Vec::new();

        assert_eq!(
            apply(
                &mut world,
                dispatch(Owner::Player, vec![lonely], enemy),
                &mut events
            ),
            Err(InvalidOrder::NothingToSend)
        );
    }

    #[test]
    fn arrival_captures_and_reports() {
        let (mut world, player, enemy) = duel();
        let mut events = Vec::new();
        apply(
            &mut world,
            dispatch(Owner::Player, vec![player], enemy),
            &mut events,
        )
        .expect("order");
        events.clear();

        apply(
            &mut world,
            Command::ResolveArrival {
                troop: TroopId::new(0),
            },
            &mut events,
        )
        .expect("arrival");

        assert_eq!(
            events,
            vec![
                Event::TroopArrived {
                    troop: TroopId::new(0),
                    owner: Owner::Player,
                    target: enemy,
                    strength: 10,
                    outcome: ArrivalOutcome::Captured,
                },
                Event::TowerCaptured {
                    tower: enemy,
                    old_owner: Owner::Enemy,
                    new_owner: Owner::Player,
                },
            ]
        );
        let tower = query::tower(&world, enemy).expect("tower");
        assert_eq!(tower.owner, Owner::Player);
        assert_eq!(tower.troops, 0);
        assert_eq!(query::troops_in_flight(&world), 0);
        assert_eq!(query::tower_count(&world, Owner::Enemy), 0);
    }

    #[test]
    fn neutral_towers_ignore_reinforcement_commands() {
        let mut world = World::new(100.0);
        let neutral = world
            .place_tower(Position::new(0.0, 0.0), Owner::Neutral, 7, 50, 1)
            .expect("tower");
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::ReinforceTower {
                tower: neutral,
                amount: 3,
            },
            &mut events,
        )
        .expect("reinforce");

        assert!(events.is_empty());
        assert_eq!(query::tower(&world, neutral).map(|t| t.troops), Some(7));
    }
}
