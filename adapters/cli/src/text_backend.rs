//! Rendering backend that prints the battlefield as text.

use std::{fmt::Write as _, io::Write, time::Duration};

use anyhow::{Context, Result};
use glam::Vec2;
use tower_war_core::Owner;
use tower_war_rendering::{
    Color, FrameInput, Presentation, RenderingBackend, Scene, BATTLEFIELD_HEIGHT,
    BATTLEFIELD_WIDTH,
};

use crate::autoplay::InputSource;

const COLUMNS: usize = 60;
const ROWS: usize = 16;

/// Fixed-step backend that drives the simulation and prints periodic frames.
pub(crate) struct TextBackend<I, W> {
    input: I,
    out: W,
    frame: Duration,
    max_frames: u64,
    render_every: u64,
    colored: bool,
}

impl<I: InputSource, W: Write> TextBackend<I, W> {
    pub(crate) fn new(input: I, out: W, frame: Duration, max_frames: u64) -> Self {
        Self {
            input,
            out,
            frame,
            max_frames,
            render_every: 0,
            colored: false,
        }
    }

    /// Prints a frame every `frames` simulated frames; zero prints only the last one.
    pub(crate) fn render_every(mut self, frames: u64) -> Self {
        self.render_every = frames;
        self
    }

    /// Enables ANSI truecolor output.
    pub(crate) fn colored(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }
}

impl<I: InputSource, W: Write> RenderingBackend for TextBackend<I, W> {
    fn run<F>(mut self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> Result<()>,
    {
        let mut scene = presentation.scene;
        writeln!(self.out, "== {} ==", presentation.window_title)?;

        for frame in 1..=self.max_frames {
            let input = self.input.poll(self.frame, &scene);
            update_scene(self.frame, input, &mut scene)
                .with_context(|| format!("frame {frame} failed"))?;

            let terminal = scene.state.is_terminal();
            if self.render_every > 0 && frame % self.render_every == 0 && !terminal {
                self.out.write_all(draw(&scene, self.colored).as_bytes())?;
            }
            if terminal {
                break;
            }
        }

        self.out.write_all(draw(&scene, self.colored).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }
}

/// Draws the scene onto a character grid followed by a garrison legend.
pub(crate) fn draw(scene: &Scene, colored: bool) -> String {
    let mut grid = vec![vec![String::from(" "); COLUMNS]; ROWS];

    for troop in &scene.troops {
        let (column, row) = cell(troop.position);
        let glyph = if troop.heading.x >= 0.0 { '>' } else { '<' };
        grid[row][column] = paint(&glyph.to_string(), troop.color, colored);
    }

    for tower in &scene.towers {
        let (column, row) = cell(tower.position);
        grid[row][column] = paint(&owner_glyph(tower.owner).to_string(), tower.color, colored);
    }

    let mut text = String::new();
    let _ = writeln!(
        text,
        "t={:>6.1}s  state={:?}",
        scene.elapsed.as_secs_f32(),
        scene.state
    );
    let border = "-".repeat(COLUMNS);
    let _ = writeln!(text, "+{border}+");
    for row in &grid {
        let _ = writeln!(text, "|{}|", row.concat());
    }
    let _ = writeln!(text, "+{border}+");

    for tower in &scene.towers {
        let label = format!(
            "#{:<2} {} {:>3}",
            tower.id.get(),
            owner_glyph(tower.owner),
            tower.troops
        );
        let _ = writeln!(text, "  {}", paint(&label, tower.color, colored));
    }
    if !scene.troops.is_empty() {
        let carried: u32 = scene.troops.iter().map(|troop| troop.strength).sum();
        let _ = writeln!(
            text,
            "  {} troops in flight carrying {carried}",
            scene.troops.len()
        );
    }
    text
}

fn owner_glyph(owner: Owner) -> char {
    match owner {
        Owner::Player => 'P',
        Owner::Enemy => 'E',
        Owner::Neutral => 'N',
    }
}

fn cell(position: Vec2) -> (usize, usize) {
    let column = (position.x / BATTLEFIELD_WIDTH * COLUMNS as f32).floor();
    let row = (position.y / BATTLEFIELD_HEIGHT * ROWS as f32).floor();
    (
        (column.max(0.0) as usize).min(COLUMNS - 1),
        (row.max(0.0) as usize).min(ROWS - 1),
    )
}

fn paint(text: &str, color: Color, colored: bool) -> String {
    if !colored {
        return text.to_owned();
    }
    let [red, green, blue] = color.to_rgb_u8();
    format!("\x1b[38;2;{red};{green};{blue}m{text}\x1b[0m")
}
