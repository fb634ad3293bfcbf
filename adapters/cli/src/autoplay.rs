//! Scripted stand-in for the human player.

use std::time::Duration;

use tower_war_core::{Owner, SessionState};
use tower_war_rendering::{FrameInput, Scene};

/// Produces abstract input for each frame.
pub(crate) trait InputSource {
    /// Input observed during the frame that is about to be simulated.
    fn poll(&mut self, dt: Duration, scene: &Scene) -> FrameInput;
}

/// Player that never acts.
#[derive(Debug, Default)]
pub(crate) struct Idle;

impl InputSource for Idle {
    fn poll(&mut self, _dt: Duration, _scene: &Scene) -> FrameInput {
        FrameInput::default()
    }
}

/// Player that periodically throws every tower holding a clear majority at the
/// weakest tower it does not own.
#[derive(Debug)]
pub(crate) struct Autoplay {
    interval: Duration,
    accumulator: Duration,
}

impl Autoplay {
    pub(crate) fn new(interval: Duration) -> Self {
        Self {
            interval,
            accumulator: Duration::ZERO,
        }
    }
}

impl InputSource for Autoplay {
    fn poll(&mut self, dt: Duration, scene: &Scene) -> FrameInput {
        if scene.state != SessionState::Running {
            return FrameInput::default();
        }

        self.accumulator = self.accumulator.saturating_add(dt);
        if self.accumulator < self.interval {
            return FrameInput::default();
        }
        self.accumulator = Duration::ZERO;

        let Some(target) = scene
            .towers
            .iter()
            .filter(|tower| tower.owner != Owner::Player)
            .min_by_key(|tower| (tower.troops, tower.id))
        else {
            return FrameInput::default();
        };

        let sources: Vec<_> = scene
            .towers
            .iter()
            .filter(|tower| tower.owner == Owner::Player && tower.troops / 2 > target.troops / 2)
            .map(|tower| tower.id)
            .collect();
        if sources.is_empty() {
            return FrameInput::default();
        }

        FrameInput {
            pause_toggle: false,
            order: Some((sources, target.id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use tower_war_core::TowerId;
    use tower_war_rendering::{owner_color, SceneTower};

    fn tower(id: u32, owner: Owner, troops: u32) -> SceneTower {
        SceneTower {
            id: TowerId::new(id),
            position: Vec2::new(id as f32 * 100.0, 0.0),
            owner,
            troops,
            color: owner_color(owner),
        }
    }

    fn scene(towers: Vec<SceneTower>) -> Scene {
        Scene {
            state: SessionState::Running,
            elapsed: Duration::ZERO,
            towers,
            troops: Vec::new(),
        }
    }

    #[test]
    fn autoplay_waits_then_attacks_weakest() {
        let scene = scene(vec![
            tower(0, Owner::Player, 30),
            tower(1, Owner::Player, 4),
            tower(2, Owner::Enemy, 12),
            tower(3, Owner::Neutral, 6),
        ]);
        let mut player = Autoplay::new(Duration::from_secs(2));

        assert_eq!(
            player.poll(Duration::from_secs(1), &scene),
            FrameInput::default()
        );
        assert_eq!(
            player.poll(Duration::from_secs(1), &scene),
            FrameInput {
                pause_toggle: false,
                order: Some((vec![TowerId::new(0)], TowerId::new(3))),
            }
        );
    }

    #[test]
    fn idle_player_never_orders() {
        let scene = scene(vec![tower(0, Owner::Player, 30)]);
        assert_eq!(
            Idle.poll(Duration::from_secs(60), &scene),
            FrameInput::default()
        );
    }
}
