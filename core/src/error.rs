//! Error taxonomy surfaced to session callers.

use thiserror::Error;

use crate::{Owner, TowerId};

/// Invalid level setup detected while building a session.
///
/// No partial session is ever returned alongside one of these.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A contesting side starts without towers.
    #[error("level gives the {0:?} side no towers")]
    MissingSide(Owner),
    /// Towers must be able to hold at least one troop.
    #[error("tower capacity must be positive")]
    ZeroCapacity,
    /// Starting garrison does not fit in the tower.
    #[error("{owner:?} towers start with {troops} troops but hold at most {capacity}")]
    TroopsExceedCapacity {
        /// Side whose starting garrison is too large.
        owner: Owner,
        /// Requested starting garrison.
        troops: u32,
        /// Configured capacity.
        capacity: u32,
    },
    /// The layout has fewer slots than requested towers.
    #[error("{owner:?} requests {requested} towers but the layout has {available} slots")]
    TooManyTowers {
        /// Side requesting too many towers.
        owner: Owner,
        /// Requested tower count.
        requested: u32,
        /// Available slots.
        available: u32,
    },
    /// The level catalogue holds no level with this number.
    #[error("level {0} does not exist")]
    UnknownLevel(u32),
    /// Troop speed must be finite and positive.
    #[error("troop speed must be finite and positive")]
    InvalidSpeed,
    /// A periodic interval was configured as zero.
    #[error("{0} interval must be positive")]
    ZeroInterval(&'static str),
}

/// Order rejected before any state was touched.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvalidOrder {
    /// The order names no source tower.
    #[error("order names no source tower")]
    EmptySources,
    /// A referenced tower does not exist.
    #[error("tower {0:?} does not exist")]
    UnknownTower(TowerId),
    /// A source tower does not belong to the issuing side.
    #[error("tower {tower:?} is not held by {side:?}")]
    NotOwned {
        /// Offending source tower.
        tower: TowerId,
        /// Side that issued the order.
        side: Owner,
    },
    /// A source tower is also the target.
    #[error("tower {0:?} cannot send troops to itself")]
    SourceIsTarget(TowerId),
    /// A source tower appears more than once.
    #[error("tower {0:?} is listed twice")]
    DuplicateSource(TowerId),
    /// Every source holds one troop or fewer.
    #[error("no source tower has troops to spare")]
    NothingToSend,
    /// Orders are only accepted while the session runs.
    #[error("session is not running")]
    SessionNotRunning,
    /// A troop must carry at least one soldier.
    #[error("troop strength must be positive")]
    ZeroStrength,
}
