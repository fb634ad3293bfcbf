//! Resolution of troop arrivals against their target tower.

use tower_war_core::{ArrivalOutcome, Owner};

use crate::towers::Tower;

/// Effect of a single arrival on its tower.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Classification of the arrival.
    pub outcome: ArrivalOutcome,
    /// Owner before the arrival was applied.
    pub previous_owner: Owner,
}

/// Applies one arriving force to `tower`, completely, before anything else touches it.
pub fn resolve_arrival(tower: &mut Tower, strength: u32, attacker: Owner) -> Resolution {
    let previous_owner = tower.owner();

    let outcome = if attacker == previous_owner {
        let _ = tower.reinforce(strength);
        ArrivalOutcome::Reinforced
    } else if tower.receive_attack(strength, attacker) {
        ArrivalOutcome::Captured
    } else {
        ArrivalOutcome::Repelled
    };

    Resolution {
        outcome,
        previous_owner,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_war_core::{Position, TowerId};

    fn tower(owner: Owner, troops: u32) -> Tower {
        Tower::create(TowerId::new(3), Position::default(), owner, troops, 50, 1)
            .expect("valid tower")
    }

    #[test]
    fn reinforcement_keeps_owner() {
        let mut tower = tower(Owner::Player, 48);
        let resolution = resolve_arrival(&mut tower, 5, Owner::Player);
        assert_eq!(resolution.outcome, ArrivalOutcome::Reinforced);
        assert_eq!(resolution.previous_owner, Owner::Player);
        assert_eq!(tower.troops(), 50);
    }

    #[test]
    fn neutral_tower_falls_to_equal_force() {
        let mut tower = tower(Owner::Neutral, 8);
        let resolution = resolve_arrival(&mut tower, 8, Owner::Enemy);
        assert_eq!(resolution.outcome, ArrivalOutcome::Captured);
        assert_eq!(resolution.previous_owner, Owner::Neutral);
        assert_eq!(tower.owner(), Owner::Enemy);
        assert_eq!(tower.troops(), 0);
    }

    #[test]
    fn repelled_attack_reports_outcome() {
        let mut tower = tower(Owner::Enemy, 10);
        let resolution = resolve_arrival(&mut tower, 9, Owner::Player);
        assert_eq!(resolution.outcome, ArrivalOutcome::Repelled);
        assert_eq!(tower.troops(), 1);
    }

    #[test]
    fn sequential_arrivals_see_previous_result() {
        let mut tower = tower(Owner::Enemy, 10);
        let first = resolve_arrival(&mut tower, 12, Owner::Player);
        let second = resolve_arrival(&mut tower, 5, Owner::Enemy);

        assert_eq!(first.outcome, ArrivalOutcome::Captured);
        assert_eq!(second.outcome, ArrivalOutcome::Captured);
        assert_eq!(second.previous_owner, Owner::Player);
        assert_eq!(tower.owner(), Owner::Enemy);
        assert_eq!(tower.troops(), 3);
    }
}
