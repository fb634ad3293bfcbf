#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Tower War adapters.
//!
//! Nothing here draws. Adapters turn the immutable per-tick views exposed by
//! the session into a [`Scene`], then hand it to a [`RenderingBackend`].

use anyhow::Result as AnyResult;
use glam::Vec2;
use std::time::Duration;
use tower_war_core::{Owner, Position, SessionState, TowerId, TowerView, TroopView};

/// Radius of a tower in world units.
pub const TOWER_RADIUS: f32 = 30.0;

/// Width of the battlefield in world units.
pub const BATTLEFIELD_WIDTH: f32 = 1000.0;

/// Height of the battlefield in world units.
pub const BATTLEFIELD_HEIGHT: f32 = 700.0;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Converts the color channels back to bytes, dropping alpha.
    #[must_use]
    pub fn to_rgb_u8(self) -> [u8; 3] {
        [self.red, self.green, self.blue]
            .map(|channel| (channel.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Color associated with an owner: player blue, enemy red, neutral gray.
#[must_use]
pub fn owner_color(owner: Owner) -> Color {
    match owner {
        Owner::Player => Color::from_rgb_u8(0x3c, 0x78, 0xdc),
        Owner::Enemy => Color::from_rgb_u8(0xdc, 0x3c, 0x3c),
        Owner::Neutral => Color::from_rgb_u8(0x96, 0x96, 0x96),
    }
}

/// Converts a battlefield position into presentation space.
#[must_use]
pub const fn to_vec2(position: Position) -> Vec2 {
    Vec2::new(position.x(), position.y())
}

/// Abstract input gathered by adapters before updating the scene.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Whether the adapter detected a pause toggle on this frame.
    pub pause_toggle: bool,
    /// Player order translated from device input, as sources and target.
    pub order: Option<(Vec<TowerId>, TowerId)>,
}

/// Tower as it should appear on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneTower {
    /// Identifier of the tower.
    pub id: TowerId,
    /// Centre in world units.
    pub position: Vec2,
    /// Owner, used for labelling.
    pub owner: Owner,
    /// Garrison shown on the tower.
    pub troops: u32,
    /// Fill color.
    pub color: Color,
}

/// Troop as it should appear on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneTroop {
    /// Current position in world units.
    pub position: Vec2,
    /// Unit heading, normalized; zero when the route has no length.
    pub heading: Vec2,
    /// Owner, used for labelling.
    pub owner: Owner,
    /// Troops carried by the unit.
    pub strength: u32,
    /// Fill color, a lighter shade of the owner color.
    pub color: Color,
}

/// Scene description built once per tick from immutable views.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Lifecycle state of the session.
    pub state: SessionState,
    /// Simulated time since the session started.
    pub elapsed: Duration,
    /// Every tower, ordered by identifier.
    pub towers: Vec<SceneTower>,
    /// Every troop in flight, ordered by spawn time.
    pub troops: Vec<SceneTroop>,
}

impl Scene {
    /// Builds a scene from the session's tower and troop views.
    #[must_use]
    pub fn from_views(
        state: SessionState,
        elapsed: Duration,
        towers: &TowerView,
        troops: &TroopView,
    ) -> Self {
        let towers = towers
            .iter()
            .map(|tower| SceneTower {
                id: tower.id,
                position: to_vec2(tower.position),
                owner: tower.owner,
                troops: tower.troops,
                color: owner_color(tower.owner),
            })
            .collect();

        let troops = troops
            .iter()
            .map(|troop| SceneTroop {
                position: to_vec2(troop.position),
                heading: (to_vec2(troop.destination) - to_vec2(troop.origin)).normalize_or_zero(),
                owner: troop.owner,
                strength: troop.strength,
                color: owner_color(troop.owner).lighten(0.3),
            })
            .collect();

        Self {
            state,
            elapsed,
            towers,
            troops,
        }
    }

    /// Tower whose disc contains `point`, if any.
    #[must_use]
    pub fn tower_at(&self, point: Vec2) -> Option<&SceneTower> {
        self.towers
            .iter()
            .find(|tower| tower.position.distance(point) <= TOWER_RADIUS)
    }

    /// Towers currently held by `owner`.
    #[must_use]
    pub fn tower_count(&self, owner: Owner) -> usize {
        self.towers.iter().filter(|tower| tower.owner == owner).count()
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title shown by the backend.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Tower War scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until the scene reaches a terminal state or
    /// the backend is requested to exit.
    ///
    /// The provided `update_scene` closure receives the simulated frame delta,
    /// per-frame input captured by the adapter, and replaces the scene before
    /// it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> AnyResult<()>;
}
