use std::{env, path::PathBuf, process::Command};

fn scratch(name: &str) -> PathBuf {
    env::temp_dir().join(format!("tower-war-cli-{}-{name}", std::process::id()))
}

fn tower_war() -> Command {
    Command::new(env!("CARGO_BIN_EXE_tower-war"))
}

#[test]
fn idle_run_reports_statistics() {
    let output = tower_war()
        .args(["--level", "1", "--autoplay", "0", "--seconds", "5"])
        .args(["--render-every", "0", "--log-level", "warn"])
        .arg("--progress")
        .arg(scratch("idle.json"))
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to launch tower-war");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("== Tower War - level 1 =="));
    assert!(stdout.contains("level 1 after 5.0s"));
    assert!(stdout.contains("player orders: 0"));
}

#[test]
fn locked_levels_are_refused() {
    let output = tower_war()
        .args(["--level", "3", "--seconds", "1"])
        .arg("--progress")
        .arg(scratch("locked.json"))
        .output()
        .expect("failed to launch tower-war");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("locked"));
}

#[test]
fn custom_level_files_are_loaded() {
    let levels = scratch("levels.toml");
    std::fs::write(
        &levels,
        r#"
            [[level]]
            level = 1
            name = "Crossing"
            capacity = 30
            ai_difficulty = "easy"
            towers = { player = 1, enemy = 1, neutral = 0 }
            starting_troops = { player = 20, enemy = 5, neutral = 0 }
        "#,
    )
    .expect("write level file");

    let output = tower_war()
        .args(["--autoplay", "0", "--seconds", "2", "--render-every", "0"])
        .arg("--levels")
        .arg(&levels)
        .arg("--progress")
        .arg(scratch("custom.json"))
        .output()
        .expect("failed to launch tower-war");
    std::fs::remove_file(&levels).expect("cleanup");

    assert!(output.status.success(), "{output:?}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("player 1 / enemy 1 / neutral 0 towers"));
}
