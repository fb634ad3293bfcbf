//! Level configuration and progression records.

use serde::{Deserialize, Serialize};

use crate::{ConfigurationError, Difficulty, Owner};

/// Value table keyed by tower owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PerOwner<T> {
    /// Value for the player side.
    pub player: T,
    /// Value for the enemy side.
    pub enemy: T,
    /// Value for unclaimed towers.
    pub neutral: T,
}

impl<T: Copy> PerOwner<T> {
    /// Creates a table from explicit values.
    #[must_use]
    pub const fn new(player: T, enemy: T, neutral: T) -> Self {
        Self {
            player,
            enemy,
            neutral,
        }
    }

    /// Looks up the value for `owner`.
    #[must_use]
    pub const fn get(&self, owner: Owner) -> T {
        match owner {
            Owner::Player => self.player,
            Owner::Enemy => self.enemy,
            Owner::Neutral => self.neutral,
        }
    }
}

/// Everything needed to lay out and run one level.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// One-based level number used by progression.
    pub level: u32,
    /// Human readable level name.
    pub name: String,
    /// Towers per owner.
    pub towers: PerOwner<u32>,
    /// Starting garrison per owner.
    pub starting_troops: PerOwner<u32>,
    /// Maximum garrison of every tower.
    pub capacity: u32,
    /// Troops gained by a contested tower on each growth pulse.
    #[serde(default = "default_growth")]
    pub growth_per_pulse: u32,
    /// Base troop speed in world units per second.
    #[serde(default = "default_speed")]
    pub troop_speed: f32,
    /// AI difficulty tier.
    pub ai_difficulty: Difficulty,
    /// Seed used to shuffle neutral tower slots.
    #[serde(default)]
    pub neutral_seed: u64,
}

const fn default_growth() -> u32 {
    1
}

const fn default_speed() -> f32 {
    100.0
}

impl LevelConfig {
    /// Rejects configurations that cannot produce a playable session.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        for side in [Owner::Player, Owner::Enemy] {
            if self.towers.get(side) == 0 {
                return Err(ConfigurationError::MissingSide(side));
            }
        }

        if self.capacity == 0 {
            return Err(ConfigurationError::ZeroCapacity);
        }

        for owner in Owner::ALL {
            let troops = self.starting_troops.get(owner);
            if troops > self.capacity {
                return Err(ConfigurationError::TroopsExceedCapacity {
                    owner,
                    troops,
                    capacity: self.capacity,
                });
            }
        }

        if !self.troop_speed.is_finite() || self.troop_speed <= 0.0 {
            return Err(ConfigurationError::InvalidSpeed);
        }

        Ok(())
    }

    /// Built-in three level campaign.
    #[must_use]
    pub fn catalogue() -> Vec<LevelConfig> {
        vec![
            LevelConfig {
                level: 1,
                name: String::from("Outpost"),
                towers: PerOwner::new(2, 2, 3),
                starting_troops: PerOwner::new(20, 15, 10),
                capacity: 50,
                growth_per_pulse: 1,
                troop_speed: 100.0,
                ai_difficulty: Difficulty::Easy,
                neutral_seed: 0x7d41_9a03,
            },
            LevelConfig {
                level: 2,
                name: String::from("Frontier"),
                towers: PerOwner::new(2, 3, 5),
                starting_troops: PerOwner::new(20, 20, 12),
                capacity: 50,
                growth_per_pulse: 1,
                troop_speed: 100.0,
                ai_difficulty: Difficulty::Medium,
                neutral_seed: 0x51c3_0e77,
            },
            LevelConfig {
                level: 3,
                name: String::from("Citadel"),
                towers: PerOwner::new(3, 3, 7),
                starting_troops: PerOwner::new(20, 30, 15),
                capacity: 50,
                growth_per_pulse: 1,
                troop_speed: 100.0,
                ai_difficulty: Difficulty::Hard,
                neutral_seed: 0x0bad_cafe,
            },
        ]
    }

    /// Looks up a level in the built-in catalogue.
    pub fn builtin(level: u32) -> Result<LevelConfig, ConfigurationError> {
        Self::catalogue()
            .into_iter()
            .find(|config| config.level == level)
            .ok_or(ConfigurationError::UnknownLevel(level))
    }
}

/// Campaign progress persisted between runs by the hosting adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// Highest level the player may start.
    pub highest_level_unlocked: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            highest_level_unlocked: 1,
        }
    }
}

impl Progress {
    /// Reports whether `level` may be started.
    #[must_use]
    pub const fn is_unlocked(&self, level: u32) -> bool {
        level >= 1 && level <= self.highest_level_unlocked
    }

    /// Unlocks the level following `level`, bounded by `max_level`.
    ///
    /// Returns `true` when the record changed and should be written back.
    pub fn record_victory(&mut self, level: u32, max_level: u32) -> bool {
        let next = level.saturating_add(1).min(max_level.max(1));
        if next > self.highest_level_unlocked {
            self.highest_level_unlocked = next;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_levels_are_valid_and_numbered() {
        let catalogue = LevelConfig::catalogue();
        assert_eq!(catalogue.len(), 3);
        for (index, config) in catalogue.iter().enumerate() {
            assert_eq!(config.level as usize, index + 1);
            assert_eq!(config.validate(), Ok(()));
        }
        assert_eq!(catalogue[0].ai_difficulty, Difficulty::Easy);
        assert_eq!(catalogue[2].ai_difficulty, Difficulty::Hard);
    }

    #[test]
    fn unknown_level_is_rejected() {
        assert_eq!(
            LevelConfig::builtin(9),
            Err(ConfigurationError::UnknownLevel(9))
        );
    }

    #[test]
    fn missing_side_is_rejected() {
        let mut config = LevelConfig::catalogue().remove(0);
        config.towers.enemy = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::MissingSide(Owner::Enemy))
        );
    }

    #[test]
    fn zero_capacity_and_overfull_garrisons_are_rejected() {
        let mut config = LevelConfig::catalogue().remove(0);
        config.capacity = 0;
        assert_eq!(config.validate(), Err(ConfigurationError::ZeroCapacity));

        config.capacity = 10;
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::TroopsExceedCapacity {
                owner: Owner::Player,
                troops: 20,
                capacity: 10,
            })
        );
    }

    #[test]
    fn non_positive_speed_is_rejected() {
        let mut config = LevelConfig::catalogue().remove(0);
        config.troop_speed = 0.0;
        assert_eq!(config.validate(), Err(ConfigurationError::InvalidSpeed));
        config.troop_speed = f32::NAN;
        assert_eq!(config.validate(), Err(ConfigurationError::InvalidSpeed));
    }

    #[test]
    fn victory_unlocks_next_level_once() {
        let mut progress = Progress::default();
        assert!(progress.is_unlocked(1));
        assert!(!progress.is_unlocked(2));

        assert!(progress.record_victory(1, 3));
        assert_eq!(progress.highest_level_unlocked, 2);
        assert!(!progress.record_victory(1, 3));

        assert!(progress.record_victory(2, 3));
        assert!(!progress.record_victory(3, 3));
        assert_eq!(progress.highest_level_unlocked, 3);
    }

    #[test]
    fn level_config_reads_from_toml_with_defaults() {
        let source = r#"
            level = 4
            name = "Skirmish"
            capacity = 40
            ai_difficulty = "medium"

            [towers]
            player = 1
            enemy = 1
            neutral = 2

            [starting_troops]
            player = 12
            enemy = 12
            neutral = 6
        "#;

        let config: LevelConfig = toml::from_str(source).expect("level parses");
        assert_eq!(config.growth_per_pulse, 1);
        assert!((config.troop_speed - 100.0).abs() < f32::EPSILON);
        assert_eq!(config.neutral_seed, 0);
        assert_eq!(config.towers.get(Owner::Neutral), 2);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn progress_reads_back_from_json() {
        let progress: Progress =
            serde_json::from_str(r#"{"highest_level_unlocked":2}"#).expect("progress parses");
        assert_eq!(progress.highest_level_unlocked, 2);
        let text = serde_json::to_string(&progress).expect("progress serialises");
        assert_eq!(text, r#"{"highest_level_unlocked":2}"#);
    }
}
