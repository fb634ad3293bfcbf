#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Tower War sessions headlessly.

mod autoplay;
mod storage;
mod text_backend;

use std::{
    io::{self, IsTerminal},
    path::PathBuf,
    time::Duration,
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use tower_war_core::{Event, GameResult, Owner};
use tower_war_rendering::{Color, Presentation, RenderingBackend, Scene};
use tower_war_session::{Session, SessionStatistics, SinkError};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use autoplay::{Autoplay, Idle, InputSource};
use text_backend::TextBackend;

/// Runs one Tower War level in the terminal.
#[derive(Debug, Parser)]
#[command(name = "tower-war", version, about)]
struct Args {
    /// Level to play; defaults to the highest unlocked level.
    #[arg(long)]
    level: Option<u32>,

    /// TOML file with `[[level]]` tables replacing the built-in catalogue.
    #[arg(long, value_name = "PATH")]
    levels: Option<PathBuf>,

    /// JSON file storing the highest unlocked level.
    #[arg(long, value_name = "PATH", default_value = "tower_war_progress.json")]
    progress: PathBuf,

    /// Let a scripted player issue orders every N seconds; zero keeps the player idle.
    #[arg(long, value_name = "SECONDS", default_value_t = 3)]
    autoplay: u64,

    /// Maximum simulated seconds before giving up.
    #[arg(long, default_value_t = 600)]
    seconds: u64,

    /// Simulated milliseconds per frame.
    #[arg(long, default_value_t = 50)]
    frame_ms: u64,

    /// Print the battlefield every N frames; zero prints only the final frame.
    #[arg(long, default_value_t = 100)]
    render_every: u64,

    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    install_tracing(&args.log_level)?;

    let levels = storage::load_levels(args.levels.as_deref())?;
    let max_level = levels.iter().map(|level| level.level).max().unwrap_or(1);
    let mut progress = storage::load_progress(&args.progress)?;

    let level = args
        .level
        .unwrap_or_else(|| progress.highest_level_unlocked.min(max_level));
    if !progress.is_unlocked(level) {
        bail!(
            "level {level} is locked; highest unlocked level is {}",
            progress.highest_level_unlocked
        );
    }
    let config = levels
        .into_iter()
        .find(|config| config.level == level)
        .with_context(|| format!("level {level} is not in the catalogue"))?;

    let mut session = Session::new(config).context("failed to set up the session")?;
    let _ = session.subscribe(announce);
    info!(
        level,
        strategy = ?session.ai_strategy(),
        "starting level {}",
        session.config().name
    );

    if args.frame_ms == 0 {
        bail!("--frame-ms must be positive");
    }
    let frame = Duration::from_millis(args.frame_ms);
    let max_frames = args.seconds.saturating_mul(1_000) / args.frame_ms;
    let colored = io::stdout().is_terminal();

    if args.autoplay == 0 {
        play(&mut session, Idle, frame, max_frames, args.render_every, colored)?;
    } else {
        let player = Autoplay::new(Duration::from_secs(args.autoplay));
        play(&mut session, player, frame, max_frames, args.render_every, colored)?;
    }

    report(&session.statistics());
    match session.result() {
        Some(GameResult::Won) => {
            if progress.record_victory(level, max_level) {
                storage::save_progress(&args.progress, &progress)?;
                info!(
                    unlocked = progress.highest_level_unlocked,
                    "progress saved"
                );
            }
        }
        Some(GameResult::Lost) => info!(level, "level lost"),
        None => warn!(level, "time limit reached before the game ended"),
    }

    Ok(())
}

fn install_tracing(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .context("invalid log filter")?;
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .try_init()
        .context("failed to install the tracing subscriber")
}

fn play<I: InputSource>(
    session: &mut Session,
    input: I,
    frame: Duration,
    max_frames: u64,
    render_every: u64,
    colored: bool,
) -> Result<()> {
    let presentation = Presentation::new(
        format!("Tower War - level {}", session.config().level),
        Color::from_rgb_u8(0x10, 0x10, 0x18),
        scene_of(session),
    );

    TextBackend::new(input, io::stdout().lock(), frame, max_frames)
        .render_every(render_every)
        .colored(colored)
        .run(presentation, |dt, input, scene| {
            if input.pause_toggle && !session.pause() {
                let _ = session.resume();
            }
            if let Some((sources, target)) = input.order {
                if let Err(error) = session.submit_order(&sources, target) {
                    warn!(%error, "order rejected");
                }
            }
            session.tick(dt);
            let _ = session.drain_events();
            *scene = scene_of(session);
            Ok(())
        })
}

fn scene_of(session: &Session) -> Scene {
    let snapshot = session.snapshot();
    Scene::from_views(
        snapshot.state,
        snapshot.elapsed,
        &snapshot.towers,
        &snapshot.troops,
    )
}

/// Stand-in for the audio collaborator: narrates the moments that would play a sound.
fn announce(event: &Event) -> Result<(), SinkError> {
    match event {
        Event::TowerCaptured {
            tower,
            old_owner,
            new_owner,
        } => info!(
            tower = tower.get(),
            ?old_owner,
            ?new_owner,
            "tower changed hands"
        ),
        Event::GameEnded { result } => info!(?result, "game over"),
        _ => {}
    }
    Ok(())
}

fn report(stats: &SessionStatistics) {
    println!(
        "level {} after {:.1}s: player {} / enemy {} / neutral {} towers",
        stats.level,
        stats.elapsed.as_secs_f32(),
        stats.towers.get(Owner::Player),
        stats.towers.get(Owner::Enemy),
        stats.towers.get(Owner::Neutral),
    );
    println!(
        "player orders: {}  troops dispatched: {}  in flight: {}",
        stats.player_orders, stats.troops_dispatched, stats.troops_in_flight
    );
    println!(
        "AI: {} actions, {} captures, {} repelled, {} towers lost, {:.1}% success",
        stats.ai.actions_taken,
        stats.ai.successful_attacks,
        stats.ai.failed_attacks,
        stats.ai.towers_lost,
        stats.ai.success_rate()
    );
}
