//! Fixed tower slots and seeded neutral placement.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tower_war_core::{ConfigurationError, LevelConfig, Owner, Position};

const PLAYER_SLOTS: [Position; 3] = [
    Position::new(100.0, 200.0),
    Position::new(100.0, 500.0),
    Position::new(120.0, 350.0),
];

const ENEMY_SLOTS: [Position; 3] = [
    Position::new(900.0, 200.0),
    Position::new(900.0, 500.0),
    Position::new(880.0, 350.0),
];

const NEUTRAL_SLOTS: [Position; 7] = [
    Position::new(500.0, 150.0),
    Position::new(500.0, 450.0),
    Position::new(500.0, 600.0),
    Position::new(350.0, 300.0),
    Position::new(650.0, 300.0),
    Position::new(400.0, 550.0),
    Position::new(600.0, 550.0),
];

/// Tower to place during setup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Placement {
    pub(crate) position: Position,
    pub(crate) owner: Owner,
    pub(crate) troops: u32,
}

/// Lays out every tower of a level: player slots first, then enemy, then neutral.
///
/// Neutral slots are shuffled with the level's seed, so a level always
/// produces the same battlefield.
pub(crate) fn plan(config: &LevelConfig) -> Result<Vec<Placement>, ConfigurationError> {
    let mut neutral_slots = NEUTRAL_SLOTS;
    let mut rng = ChaCha8Rng::seed_from_u64(config.neutral_seed);
    neutral_slots.shuffle(&mut rng);

    let mut placements = Vec::new();
    for (owner, slots) in [
        (Owner::Player, &PLAYER_SLOTS[..]),
        (Owner::Enemy, &ENEMY_SLOTS[..]),
        (Owner::Neutral, &neutral_slots[..]),
    ] {
        let requested = config.towers.get(owner);
        let available = u32::try_from(slots.len()).unwrap_or(u32::MAX);
        if requested > available {
            return Err(ConfigurationError::TooManyTowers {
                owner,
                requested,
                available,
            });
        }

        let troops = config.starting_troops.get(owner);
        placements.extend(slots.iter().take(requested as usize).map(|&position| Placement {
            position,
            owner,
            troops,
        }));
    }

    Ok(placements)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(player: u32, enemy: u32, neutral: u32) -> LevelConfig {
        let mut config = LevelConfig::catalogue().remove(0);
        config.towers.player = player;
        config.towers.enemy = enemy;
        config.towers.neutral = neutral;
        config
    }

    #[test]
    fn places_every_requested_tower_in_owner_order() {
        let placements = plan(&level(2, 3, 4)).expect("layout");
        let owners: Vec<Owner> = placements.iter().map(|p| p.owner).collect();
        assert_eq!(
            owners,
            vec![
                Owner::Player,
                Owner::Player,
                Owner::Enemy,
                Owner::Enemy,
                Owner::Enemy,
                Owner::Neutral,
                Owner::Neutral,
                Owner::Neutral,
                Owner::Neutral,
            ]
        );
        assert_eq!(placements[0].position, PLAYER_SLOTS[0]);
        assert_eq!(placements[2].position, ENEMY_SLOTS[0]);
    }

    #[test]
    fn neutral_layout_depends_only_on_seed() {
        let config = level(1, 1, 7);
        assert_eq!(plan(&config), plan(&config));

        let neutrals: Vec<Position> = plan(&config)
            .expect("layout")
            .into_iter()
            .filter(|p| p.owner == Owner::Neutral)
            .map(|p| p.position)
            .collect();
        assert_eq!(neutrals.len(), NEUTRAL_SLOTS.len());
        for slot in NEUTRAL_SLOTS {
            assert!(neutrals.contains(&slot));
        }
    }

    #[test]
    fn too_many_towers_are_rejected() {
        assert_eq!(
            plan(&level(4, 1, 0)),
            Err(ConfigurationError::TooManyTowers {
                owner: Owner::Player,
                requested: 4,
                available: 3,
            })
        );
    }
}
