use chrono::{SecondsFormat, Utc};
use clap::Parser;
use serde::Serialize;
use serde_json::{json, Value};
use std::io;
use std::path::{Path, PathBuf};

use waka_sim::config::GameConfig;
use waka_sim::constants::TICK_RATE;
use waka_sim::engine::GameSession;
use waka_sim::rng::Rng;
use waka_sim::types::{Direction, RuntimeEvent, Snapshot};

/// Headless soak driver: runs full sessions with random directional input
/// and checks every snapshot for invariant violations.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    #[arg(long, default_value = "config.json")]
    config: PathBuf,
    #[arg(long)]
    single: bool,
    #[arg(long)]
    seconds: Option<u32>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    seconds: u32,
    seed: u32,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    seconds: u32,
    #[serde(rename = "fruitsEaten")]
    fruits_eaten: u32,
    #[serde(rename = "ghostsEaten")]
    ghosts_eaten: u32,
    #[serde(rename = "livesLost")]
    lives_lost: u32,
    wins: u32,
    losses: u32,
    resets: u32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    timestamp: String,
    level: String,
    event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    details: Value,
}

fn main() {
    let cli = Cli::parse();
    let config = match GameConfig::load(&cli.config) {
        Ok(config) => config,
        Err(error) => {
            emit_log("error", "config_load_failed", None, None, json!({
                "path": cli.config.to_string_lossy(),
                "error": error.to_string(),
            }));
            std::process::exit(2);
        }
    };

    let started_at = now_rfc3339();
    let scenarios = resolve_scenarios(&cli);
    let mut results = Vec::new();
    let mut anomaly_count = 0usize;

    for scenario in scenarios {
        emit_log(
            "info",
            "scenario_started",
            Some(&scenario.name),
            Some(scenario.seed),
            json!({ "seconds": scenario.seconds }),
        );
        let result = run_scenario(&scenario, &config);
        anomaly_count += result.anomalies.len();
        emit_log(
            "info",
            "scenario_finished",
            Some(&scenario.name),
            Some(scenario.seed),
            json!({
                "wins": result.wins,
                "losses": result.losses,
                "fruitsEaten": result.fruits_eaten,
                "anomalyCount": result.anomalies.len(),
            }),
        );
        println!(
            "{}",
            serde_json::to_string(&result).expect("scenario result should serialize")
        );
        results.push(result);
    }

    let summary = RunSummary {
        started_at,
        finished_at: now_rfc3339(),
        scenario_count: results.len(),
        anomaly_count,
        scenarios: results,
    };

    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log("error", "summary_write_failed", None, None, json!({
                "path": path.to_string_lossy(),
                "error": error.to_string(),
            }));
            std::process::exit(2);
        }
    }

    emit_log("info", "run_finished", None, None, json!({
        "scenarioCount": summary.scenario_count,
        "anomalyCount": summary.anomaly_count,
    }));

    if anomaly_count > 0 {
        std::process::exit(1);
    }
}

fn run_scenario(scenario: &Scenario, config: &GameConfig) -> ScenarioResultLine {
    let mut session = match GameSession::new(config.clone(), scenario.seed) {
        Ok(session) => session,
        Err(error) => {
            return ScenarioResultLine {
                scenario: scenario.name.clone(),
                seed: scenario.seed,
                seconds: scenario.seconds,
                fruits_eaten: 0,
                ghosts_eaten: 0,
                lives_lost: 0,
                wins: 0,
                losses: 0,
                resets: 0,
                anomalies: vec![format!("session init failed: {error}")],
            }
        }
    };

    let mut input_rng = Rng::new(scenario.seed.wrapping_add(1));
    let mut fruits_eaten = 0;
    let mut ghosts_eaten = 0;
    let mut lives_lost = 0;
    let mut wins = 0;
    let mut losses = 0;
    let mut resets = 0;
    let mut anomalies = Vec::new();

    let total_ticks = scenario.seconds as u64 * TICK_RATE as u64;
    for tick in 0..total_ticks {
        if tick % 15 == 0 {
            session.apply_input(random_input(&mut input_rng));
        }
        session.step();
        let snapshot = session.build_snapshot(true);
        for event in &snapshot.events {
            match event {
                RuntimeEvent::FruitEaten { .. } => fruits_eaten += 1,
                RuntimeEvent::GhostEaten { .. } => ghosts_eaten += 1,
                RuntimeEvent::LifeLost { .. } => lives_lost += 1,
                RuntimeEvent::GameWon => wins += 1,
                RuntimeEvent::GameLost => losses += 1,
                RuntimeEvent::SessionReset => resets += 1,
                _ => {}
            }
        }
        for message in collect_snapshot_anomalies(&snapshot, config) {
            if !anomalies.contains(&message) {
                anomalies.push(message);
            }
        }
    }

    ScenarioResultLine {
        scenario: scenario.name.clone(),
        seed: scenario.seed,
        seconds: scenario.seconds,
        fruits_eaten,
        ghosts_eaten,
        lives_lost,
        wins,
        losses,
        resets,
        anomalies,
    }
}

fn collect_snapshot_anomalies(snapshot: &Snapshot, config: &GameConfig) -> Vec<String> {
    let mut anomalies = Vec::new();
    if snapshot.lives > config.lives {
        anomalies.push(format!("lives above starting value: {}", snapshot.lives));
    }

    let fruit_cells: u32 = snapshot
        .tiles
        .iter()
        .map(|row| row.chars().filter(|&c| c == '7').count() as u32)
        .sum();
    if fruit_cells != snapshot.fruits_remaining {
        anomalies.push(format!(
            "fruit counter out of sync: counter {} vs grid {}",
            snapshot.fruits_remaining, fruit_cells
        ));
    }

    let width = snapshot.tiles.first().map(|row| row.len() as i32 * 16).unwrap_or(0);
    let height = snapshot.tiles.len() as i32 * 16;
    let in_bounds = |x: i32, y: i32| x >= 0 && x <= width && y >= 0 && y <= height;
    if !in_bounds(snapshot.player.x, snapshot.player.y) {
        anomalies.push(format!(
            "player out of bounds: ({}, {})",
            snapshot.player.x, snapshot.player.y
        ));
    }
    for ghost in &snapshot.ghosts {
        if !in_bounds(ghost.x, ghost.y) {
            anomalies.push(format!("ghost out of bounds: ({}, {})", ghost.x, ghost.y));
        }
    }

    if snapshot.outcome.is_none() && snapshot.restart_in_ticks != 0 {
        anomalies.push("restart countdown armed without an outcome".to_string());
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli) -> Vec<Scenario> {
    let seed = normalize_seed(cli.seed.unwrap_or_else(|| {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }));

    if cli.single || cli.seconds.is_some() {
        let seconds = cli.seconds.unwrap_or(60).clamp(1, 3600);
        return vec![Scenario {
            name: format!("custom-{seconds}s"),
            seconds,
            seed,
        }];
    }

    vec![
        Scenario {
            name: "quick-soak".to_string(),
            seconds: 30,
            seed,
        },
        Scenario {
            name: "long-soak".to_string(),
            seconds: 180,
            seed: normalize_seed(seed as u64 + 1),
        },
    ]
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn random_input(rng: &mut Rng) -> Direction {
    match rng.int(0, 3) {
        0 => Direction::Up,
        1 => Direction::Left,
        2 => Direction::Down,
        _ => Direction::Right,
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let text = serde_json::to_string_pretty(summary).expect("run summary should serialize");
    std::fs::write(path, text)
}

fn emit_log(level: &str, event: &str, scenario: Option<&str>, seed: Option<u32>, details: Value) {
    let line = StructuredLogLine {
        timestamp: now_rfc3339(),
        level: level.to_string(),
        event: event.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        details,
    };
    eprintln!(
        "{}",
        serde_json::to_string(&line).expect("structured log should serialize")
    );
}
