#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tower War engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative battlefield, and pure systems. The session submits
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems and observers to react to deterministically. Systems consume
//! event streams, query immutable views, and respond exclusively with new
//! command batches.

mod error;
mod level;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use error::{ConfigurationError, InvalidOrder};
pub use level::{LevelConfig, PerOwner, Progress};

/// Side that controls a tower or an in-flight troop.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Owner {
    /// The human player.
    Player,
    /// The AI opponent.
    Enemy,
    /// Unclaimed towers that never grow on their own.
    Neutral,
}

impl Owner {
    /// Every owner in a stable order.
    pub const ALL: [Owner; 3] = [Owner::Player, Owner::Enemy, Owner::Neutral];

    /// Reports whether the owner takes part in the contest (grows, dispatches troops).
    #[must_use]
    pub const fn is_combatant(self) -> bool {
        !matches!(self, Self::Neutral)
    }

    /// Returns the contesting side facing this owner, if any.
    #[must_use]
    pub const fn opponent(self) -> Option<Owner> {
        match self {
            Self::Player => Some(Self::Enemy),
            Self::Enemy => Some(Self::Player),
            Self::Neutral => None,
        }
    }

    /// Multiplier applied to the base troop speed for units dispatched by this owner.
    ///
    /// Player units march slightly faster than enemy units; both outpace the
    /// base speed that neutral towers would use if they could dispatch.
    #[must_use]
    pub const fn speed_factor(self) -> f32 {
        match self {
            Self::Player => 1.1,
            Self::Enemy => 1.05,
            Self::Neutral => 1.0,
        }
    }
}

/// Unique identifier assigned to a tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the tower identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to an in-flight troop.
///
/// Identifiers are allocated monotonically, so ordering by identifier is
/// ordering by spawn time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TroopId(u64);

impl TroopId {
    /// Creates a new troop identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Point on the battlefield expressed in world units.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical coordinate.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Straight-line distance to another position.
    #[must_use]
    pub fn distance_to(self, other: Position) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation toward `other`; `t` is clamped to `0.0..=1.0`.
    #[must_use]
    pub fn lerp(self, other: Position, t: f32) -> Position {
        let t = t.clamp(0.0, 1.0);
        Position {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Commands that express all permissible battlefield mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the battlefield clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests a growth pulse for a single tower.
    ReinforceTower {
        /// Tower receiving the reinforcement.
        tower: TowerId,
        /// Troops added before clamping to capacity.
        amount: u32,
    },
    /// Requests that each source tower dispatch half of its garrison toward the target.
    DispatchTroops {
        /// Side issuing the order; every source must belong to it.
        side: Owner,
        /// Towers contributing one troop each.
        sources: Vec<TowerId>,
        /// Tower receiving every dispatched troop.
        target: TowerId,
    },
    /// Records movement progress for an in-flight troop.
    AdvanceTroop {
        /// Troop being moved.
        troop: TroopId,
        /// Position reached after the move.
        position: Position,
        /// Total travel time accumulated since the troop departed.
        elapsed: Duration,
    },
    /// Hands a troop that reached its destination to the combat resolver.
    ResolveArrival {
        /// Troop that arrived.
        troop: TroopId,
    },
}

/// Effect an arriving troop had on its target tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArrivalOutcome {
    /// Same-owner arrival topped up the garrison.
    Reinforced,
    /// Opposing arrival was absorbed by the garrison.
    Repelled,
    /// Opposing arrival took the tower.
    Captured,
}

/// Lifecycle state of a game session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// Simulation advances on every tick.
    Running,
    /// Simulation is frozen until resumed.
    Paused,
    /// Every contested tower belongs to the player.
    Won,
    /// Every contested tower belongs to the enemy.
    Lost,
}

impl SessionState {
    /// Reports whether the state is terminal.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Final result of a session from the player's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameResult {
    /// The player holds every contested tower.
    Won,
    /// The enemy holds every contested tower.
    Lost,
}

/// Events broadcast by the battlefield and the session after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that a growth pulse reached a tower.
    TowerReinforced {
        /// Tower that grew.
        tower: TowerId,
        /// Garrison after clamping.
        troops: u32,
    },
    /// Confirms that a troop left its source tower.
    TroopDeparted {
        /// Identifier assigned to the troop.
        troop: TroopId,
        /// Side the troop fights for.
        owner: Owner,
        /// Tower the troop left.
        source: TowerId,
        /// Tower the troop marches toward.
        target: TowerId,
        /// Troops carried by the unit.
        strength: u32,
    },
    /// Confirms that a troop moved.
    TroopAdvanced {
        /// Troop that moved.
        troop: TroopId,
        /// Position reached.
        position: Position,
    },
    /// Confirms that a troop reached its target and was consumed.
    TroopArrived {
        /// Troop that arrived.
        troop: TroopId,
        /// Side the troop fought for.
        owner: Owner,
        /// Tower the troop arrived at.
        target: TowerId,
        /// Troops carried by the unit.
        strength: u32,
        /// Effect the arrival had on the tower.
        outcome: ArrivalOutcome,
    },
    /// Announces that a tower changed hands.
    TowerCaptured {
        /// Tower that changed hands.
        tower: TowerId,
        /// Owner before the capture.
        old_owner: Owner,
        /// Owner after the capture.
        new_owner: Owner,
    },
    /// Announces a session lifecycle transition.
    SessionStateChanged {
        /// State before the transition.
        from: SessionState,
        /// State after the transition.
        to: SessionState,
    },
    /// Announces that the session reached a terminal state.
    GameEnded {
        /// Result from the player's point of view.
        result: GameResult,
    },
}

/// AI difficulty tier selected by the level configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// Slow, expansion-focused opponent.
    Easy,
    /// Opponent that adapts to the balance of power.
    Medium,
    /// Fast, relentless opponent.
    Hard,
}

impl Difficulty {
    /// Simulated time the AI waits between decision cycles.
    #[must_use]
    pub const fn action_interval(self) -> Duration {
        match self {
            Self::Easy => Duration::from_secs(4),
            Self::Medium => Duration::from_secs(3),
            Self::Hard => Duration::from_secs(2),
        }
    }
}

/// Behavioural posture adopted by the AI for a decision cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TacticalMode {
    /// Strike the weakest reachable tower.
    Aggressive,
    /// Expand into neutral towers or consolidate.
    Defensive,
    /// Mix the two postures at random.
    Balanced,
}

/// Source/target pair proposed by a decision-maker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DispatchOrder {
    /// Tower that dispatches the troop.
    pub source: TowerId,
    /// Tower that receives the troop.
    pub target: TowerId,
}

impl DispatchOrder {
    /// Creates a new order.
    #[must_use]
    pub const fn new(source: TowerId, target: TowerId) -> Self {
        Self { source, target }
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Centre of the tower.
    pub position: Position,
    /// Current owner.
    pub owner: Owner,
    /// Current garrison.
    pub troops: u32,
    /// Maximum garrison.
    pub capacity: u32,
    /// Troops gained per growth pulse; zero for neutral towers.
    pub growth_rate: u32,
}

/// Read-only snapshot describing every tower on the battlefield.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured tower snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over the towers held by `owner`.
    pub fn owned_by(&self, owner: Owner) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots
            .iter()
            .filter(move |snapshot| snapshot.owner == owner)
    }

    /// Looks up a tower by identifier.
    #[must_use]
    pub fn get(&self, id: TowerId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Sum of garrisons held by `owner`.
    #[must_use]
    pub fn strength_of(&self, owner: Owner) -> u64 {
        self.owned_by(owner)
            .map(|snapshot| u64::from(snapshot.troops))
            .sum()
    }

    /// Number of towers captured in the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no towers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single in-flight troop.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TroopSnapshot {
    /// Identifier assigned at departure.
    pub id: TroopId,
    /// Side the troop fights for.
    pub owner: Owner,
    /// Troops carried by the unit.
    pub strength: u32,
    /// Tower the troop left.
    pub source: TowerId,
    /// Tower the troop marches toward.
    pub target: TowerId,
    /// Spawn position.
    pub origin: Position,
    /// Centre of the target tower.
    pub destination: Position,
    /// Current position.
    pub position: Position,
    /// Speed in world units per second.
    pub speed: f32,
    /// Travel time accumulated since departure.
    pub elapsed: Duration,
    /// Precomputed time required to cover the whole route.
    pub travel_time: Duration,
}

/// Read-only snapshot describing every in-flight troop.
#[derive(Clone, Debug, Default)]
pub struct TroopView {
    snapshots: Vec<TroopSnapshot>,
}

impl TroopView {
    /// Creates a new troop view ordered by spawn time.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TroopSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured troop snapshots in spawn order.
    pub fn iter(&self) -> impl Iterator<Item = &TroopSnapshot> {
        self.snapshots.iter()
    }

    /// Number of troops in flight.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no troop is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TroopSnapshot> {
        self.snapshots
    }
}
