//! Level catalogue overrides and progression persistence.

use std::{fs, io::ErrorKind, path::Path};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tower_war_core::{LevelConfig, Progress};

/// Levels read from a TOML file as repeated `[[level]]` tables.
#[derive(Debug, Deserialize)]
struct LevelFile {
    level: Vec<LevelConfig>,
}

/// Parses and validates a level catalogue, keeping it ordered by level number.
pub(crate) fn parse_levels(source: &str) -> Result<Vec<LevelConfig>> {
    let file: LevelFile = toml::from_str(source).context("level file is not valid TOML")?;
    if file.level.is_empty() {
        bail!("level file defines no levels");
    }

    let mut levels = file.level;
    for level in &levels {
        level
            .validate()
            .with_context(|| format!("level {} ({}) is invalid", level.level, level.name))?;
    }
    levels.sort_by_key(|level| level.level);
    Ok(levels)
}

/// Loads the level catalogue from `path`, or the built-in catalogue when absent.
pub(crate) fn load_levels(path: Option<&Path>) -> Result<Vec<LevelConfig>> {
    let Some(path) = path else {
        return Ok(LevelConfig::catalogue());
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read level file {}", path.display()))?;
    parse_levels(&source).with_context(|| format!("failed to load {}", path.display()))
}

/// Reads the progression record; a missing file means a fresh campaign.
pub(crate) fn load_progress(path: &Path) -> Result<Progress> {
    match fs::read_to_string(path) {
        Ok(text) => serde_json::from_str(&text)
            .with_context(|| format!("failed to parse progress file {}", path.display())),
        Err(error) if error.kind() == ErrorKind::NotFound => Ok(Progress::default()),
        Err(error) => {
            Err(error).with_context(|| format!("failed to read progress file {}", path.display()))
        }
    }
}

/// Writes the progression record as JSON.
pub(crate) fn save_progress(path: &Path, progress: &Progress) -> Result<()> {
    let text = serde_json::to_string_pretty(progress).context("failed to encode progress")?;
    fs::write(path, text)
        .with_context(|| format!("failed to write progress file {}", path.display()))
}
