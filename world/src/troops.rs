//! Authoritative state of in-flight troops.

use std::time::Duration;

use tower_war_core::{InvalidOrder, Owner, Position, TowerId, TroopId, TroopSnapshot};

use crate::towers::Tower;

/// Mobile, single-use carrier of a fixed number of troops.
#[derive(Clone, Debug, PartialEq)]
pub struct Troop {
    id: TroopId,
    owner: Owner,
    strength: u32,
    source: TowerId,
    target: TowerId,
    origin: Position,
    destination: Position,
    position: Position,
    speed: f32,
    elapsed: Duration,
    travel_time: Duration,
}

impl Troop {
    /// Creates a troop marching from `source` to the centre of `target`.
    ///
    /// The owner is inherited from the source tower and the speed is the
    /// base speed scaled by that owner's speed factor.
    pub fn create(
        id: TroopId,
        source: &Tower,
        target: &Tower,
        strength: u32,
        base_speed: f32,
    ) -> Result<Self, InvalidOrder> {
        if strength == 0 {
            return Err(InvalidOrder::ZeroStrength);
        }
        if source.id() == target.id() {
            return Err(InvalidOrder::SourceIsTarget(source.id()));
        }

        let owner = source.owner();
        let speed = base_speed * owner.speed_factor();
        let origin = source.position();
        let destination = target.position();
        let travel_time = travel_time(origin.distance_to(destination), speed);

        Ok(Self {
            id,
            owner,
            strength,
            source: source.id(),
            target: target.id(),
            origin,
            destination,
            position: origin,
            speed,
            elapsed: Duration::ZERO,
            travel_time,
        })
    }

    /// Identifier allocated at departure.
    #[must_use]
    pub const fn id(&self) -> TroopId {
        self.id
    }

    /// Side the troop fights for.
    #[must_use]
    pub const fn owner(&self) -> Owner {
        self.owner
    }

    /// Troops carried by the unit.
    #[must_use]
    pub const fn strength(&self) -> u32 {
        self.strength
    }

    /// Tower receiving the troop.
    #[must_use]
    pub const fn target(&self) -> TowerId {
        self.target
    }

    pub(crate) fn advance_to(&mut self, position: Position, elapsed: Duration) {
        self.position = position;
        self.elapsed = elapsed;
    }

    pub(crate) fn snapshot(&self) -> TroopSnapshot {
        TroopSnapshot {
            id: self.id,
            owner: self.owner,
            strength: self.strength,
            source: self.source,
            target: self.target,
            origin: self.origin,
            destination: self.destination,
            position: self.position,
            speed: self.speed,
            elapsed: self.elapsed,
            travel_time: self.travel_time,
        }
    }
}

fn travel_time(distance: f32, speed: f32) -> Duration {
    if distance <= 0.0 || !speed.is_finite() || speed <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f32(distance / speed).unwrap_or(Duration::MAX)
}
