//! Authoritative tower state.

use tower_war_core::{ConfigurationError, Owner, Position, TowerId, TowerSnapshot};

/// Stationary entity holding a garrison.
///
/// The owner is private: it only changes through [`Tower::receive_attack`].
#[derive(Clone, Debug, PartialEq)]
pub struct Tower {
    id: TowerId,
    position: Position,
    owner: Owner,
    troops: u32,
    capacity: u32,
    growth: u32,
}

impl Tower {
    /// Creates a tower, rejecting garrisons that do not fit.
    ///
    /// `growth` is the pulse size the tower uses whenever it is held by a
    /// contesting side; neutral towers report a growth rate of zero.
    pub fn create(
        id: TowerId,
        position: Position,
        owner: Owner,
        initial_troops: u32,
        capacity: u32,
        growth: u32,
    ) -> Result<Self, ConfigurationError> {
        if capacity == 0 {
            return Err(ConfigurationError::ZeroCapacity);
        }
        if initial_troops > capacity {
            return Err(ConfigurationError::TroopsExceedCapacity {
                owner,
                troops: initial_troops,
                capacity,
            });
        }

        Ok(Self {
            id,
            position,
            owner,
            troops: initial_troops,
            capacity,
            growth,
        })
    }

    /// Identifier allocated at setup.
    #[must_use]
    pub const fn id(&self) -> TowerId {
        self.id
    }

    /// Centre of the tower.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Current owner.
    #[must_use]
    pub const fn owner(&self) -> Owner {
        self.owner
    }

    /// Current garrison.
    #[must_use]
    pub const fn troops(&self) -> u32 {
        self.troops
    }

    /// Maximum garrison.
    #[must_use]
    pub const fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Troops gained per growth pulse under the current owner.
    #[must_use]
    pub const fn growth_rate(&self) -> u32 {
        if self.owner.is_combatant() {
            self.growth
        } else {
            0
        }
    }

    /// Adds `amount` troops, discarding whatever exceeds capacity.
    ///
    /// Returns the garrison after clamping.
    pub fn reinforce(&mut self, amount: u32) -> u32 {
        self.troops = self.troops.saturating_add(amount).min(self.capacity);
        self.check_invariants();
        self.troops
    }

    /// Applies an arriving force of `incoming_strength` troops sent by `attacker`.
    ///
    /// A same-owner arrival is a plain reinforcement. Otherwise the garrison
    /// absorbs a smaller force; an equal or larger force takes the tower and
    /// the survivors, clamped to capacity, become the new garrison. Returns
    /// whether the owner changed.
    pub fn receive_attack(&mut self, incoming_strength: u32, attacker: Owner) -> bool {
        if attacker == self.owner {
            let _ = self.reinforce(incoming_strength);
            return false;
        }

        let captured = if incoming_strength < self.troops {
            self.troops -= incoming_strength;
            false
        } else {
            self.owner = attacker;
            self.troops = (incoming_strength - self.troops).min(self.capacity);
            true
        };

        self.check_invariants();
        captured
    }

    /// Splits off half of the garrison, rounded down, for a departing troop.
    ///
    /// Towers holding a single troop or none keep it and return zero.
    pub(crate) fn split_garrison(&mut self) -> u32 {
        if self.troops <= 1 {
            return 0;
        }
        let departing = self.troops / 2;
        self.troops -= departing;
        departing
    }

    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            position: self.position,
            owner: self.owner,
            troops: self.troops,
            capacity: self.capacity,
            growth_rate: self.growth_rate(),
        }
    }

    fn check_invariants(&self) {
        debug_assert!(
            self.troops <= self.capacity,
            "tower {:?} holds {} troops above capacity {}",
            self.id,
            self.troops,
            self.capacity
        );
    }
}
