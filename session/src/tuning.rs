//! Scheduler cadences and AI tuning shared by every level.

use std::time::Duration;

use tower_war_core::ConfigurationError;
use tower_war_system_movement::DEFAULT_ARRIVAL_EPSILON;
use tower_war_system_strategy::Thresholds;

/// Events kept between drains by default.
pub const DEFAULT_EVENT_QUEUE_LIMIT: usize = 4_096;

/// Session-wide tuning that level files do not override.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SessionTuning {
    /// Simulated time between growth pulses.
    pub growth_interval: Duration,
    /// Distance from the target centre that counts as arrival.
    pub arrival_epsilon: f32,
    /// Replaces the difficulty's AI action interval when set.
    pub ai_interval: Option<Duration>,
    /// Decision thresholds handed to the AI.
    pub ai_thresholds: Thresholds,
    /// Seed of the AI's random source.
    pub ai_seed: u64,
    /// Undrained events kept for [`crate::Session::drain_events`]; the oldest
    /// are dropped beyond it. Zero disables the queue.
    pub event_queue_limit: usize,
}

impl Default for SessionTuning {
    fn default() -> Self {
        Self {
            growth_interval: Duration::from_secs(1),
            arrival_epsilon: DEFAULT_ARRIVAL_EPSILON,
            ai_interval: None,
            ai_thresholds: Thresholds::default(),
            ai_seed: 0x00c0_ffee,
            event_queue_limit: DEFAULT_EVENT_QUEUE_LIMIT,
        }
    }
}

impl SessionTuning {
    /// Rejects cadences that would stall a scheduler.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.growth_interval.is_zero() {
            return Err(ConfigurationError::ZeroInterval("growth"));
        }
        if self.ai_interval.is_some_and(|interval| interval.is_zero()) {
            return Err(ConfigurationError::ZeroInterval("AI action"));
        }
        Ok(())
    }
}
