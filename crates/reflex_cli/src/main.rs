//! Speed Reflex CLI
//!
//! Replays recorded detection traces through the game engine and manages the
//! persisted zone geometry.

mod trace;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reflex_core::{
    CancelFlag, FrameLoop, GameConfig, GameStateMachine, GeometryStore, LoopStats, ManualClock,
};
use std::path::{Path, PathBuf};
use trace::{load_trace, LogRenderer, RecordedDetector, TraceSource};

#[derive(Parser)]
#[command(name = "reflex")]
#[command(about = "Speed reflex trainer: trace replay and zone settings", long_about = None)]
struct Cli {
    /// YAML configuration file (defaults to the REFLEX_PROFILE preset)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Zone settings file, overrides the configured path
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a recorded detection trace through calibration and play
    Replay {
        /// JSON-lines trace file
        #[arg(long)]
        trace: PathBuf,

        /// Stop after this many frames
        #[arg(long)]
        max_frames: Option<u64>,

        /// Print every game event as a JSON line
        #[arg(long, default_value = "false")]
        events: bool,
    },

    /// Print the persisted zone geometry
    Show,

    /// Delete the persisted zone geometry so the next run calibrates
    Reset,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.settings)?;

    match cli.command {
        Commands::Replay { trace, max_frames, events } => {
            let stats = replay(&config, &trace, max_frames, events)?;
            print_stats(&stats);
        }
        Commands::Show => show(&GeometryStore::new(&config.store.path))?,
        Commands::Reset => {
            let store = GeometryStore::new(&config.store.path);
            if store.clear()? {
                println!("Deleted {}", store.path().display());
            } else {
                println!("No settings at {}", store.path().display());
            }
        }
    }
    Ok(())
}

fn load_config(path: Option<&Path>, settings: Option<PathBuf>) -> Result<GameConfig> {
    let mut config = match path {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => GameConfig::from_env_or_default(),
    };
    if let Some(settings) = settings {
        config.store.path = settings;
    }
    Ok(config)
}

fn replay(
    config: &GameConfig,
    trace_path: &Path,
    max_frames: Option<u64>,
    print_events: bool,
) -> Result<LoopStats> {
    let mut frames = load_trace(trace_path)?;
    if let Some(max) = max_frames {
        frames.truncate(usize::try_from(max).unwrap_or(usize::MAX));
    }
    println!("Replaying {} frames from {}", frames.len(), trace_path.display());

    let mut game = GameStateMachine::start(config)?;
    println!("Starting in {:?} mode", game.phase());

    let clock = ManualClock::new();
    let cancel = CancelFlag::new();
    let mut source = TraceSource::new(frames, clock.clone(), cancel.clone());
    let mut detector = RecordedDetector;
    let mut renderer = LogRenderer::default();

    let stats = FrameLoop {
        source: &mut source,
        detector: &mut detector,
        renderer: &mut renderer,
        clock: &clock,
        capture_timeout: config.capture_timeout(),
    }
    .run_with(&mut game, &cancel, |events| {
        if print_events {
            for event in events {
                match serde_json::to_string(event) {
                    Ok(line) => println!("{line}"),
                    Err(err) => log::warn!("Cannot encode event: {err}"),
                }
            }
        }
    });

    if let Some(best) = game.session().and_then(|s| s.best_pass()) {
        println!("Fastest pass: {:.2}s", best.as_secs_f64());
    }
    if game.has_unsaved_geometry() {
        log::error!("Zone geometry was not saved to {}", config.store.path.display());
    }
    Ok(stats)
}

fn show(store: &GeometryStore) -> Result<()> {
    let zones = store
        .load()
        .with_context(|| format!("no usable zones in {}", store.path().display()))?;
    for (zone, rect) in zones.iter() {
        println!("{:<15} {}", zone.label(), rect);
    }
    Ok(())
}

fn print_stats(stats: &LoopStats) {
    println!("Frames:          {}", stats.frames);
    println!("Skipped:         {}", stats.skipped);
    println!("Zones committed: {}", stats.zones_committed);
    println!("Hits:            {}", stats.hits);
    println!("Passes:          {}", stats.passes);
}

#[cfg(test)]
mod tests {
    use super::*;
    use reflex_core::{GamePhase, Rect, ZoneId, ZoneSet, ZONE_COUNT};
    use std::fmt::Write as _;
    use tempfile::TempDir;

    fn zones() -> ZoneSet {
        let mut zones = [Rect::default(); ZONE_COUNT];
        for (i, zone) in zones.iter_mut().enumerate() {
            let x = 30.0 + 90.0 * i as f32;
            *zone = Rect::new(x, 40.0, x + 60.0, 100.0);
        }
        ZoneSet::new(zones)
    }

    fn detection_line(t_ms: u64, rect: &Rect) -> String {
        let c = rect.coords();
        format!(
            "{{\"t_ms\": {t_ms}, \"detections\": [{{\"rect\": [{}, {}, {}, {}], \"confidence\": 0.9}}]}}\n",
            c[0], c[1], c[2], c[3]
        )
    }

    #[test]
    fn test_replay_calibrates_then_plays() {
        let dir = TempDir::new().unwrap();
        let mut config = GameConfig::default();
        config.store.path = dir.path().join("game.settings.txt");
        config.play.combo = vec![0, 1];

        // Calibration: every zone held for 3s after a gap that clears the last box
        let mut text = String::new();
        let mut t = 0;
        for (_, rect) in zones().iter() {
            for _ in 0..5 {
                writeln!(text, "{{\"t_ms\": {t}}}").unwrap();
                t += 100;
            }
            for _ in 0..31 {
                text.push_str(&detection_line(t, rect));
                t += 100;
            }
        }
        // Play: one full pass of the two-step combo
        for zone in [ZoneId::Jab, ZoneId::Cross] {
            t += 400;
            text.push_str(&detection_line(t, zones().get(zone)));
        }
        let trace_path = dir.path().join("session.jsonl");
        std::fs::write(&trace_path, text).unwrap();

        let stats = replay(&config, &trace_path, None, false).unwrap();

        assert_eq!(stats.zones_committed, 6);
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.passes, 1);
        assert_eq!(GeometryStore::new(&config.store.path).load().unwrap(), zones());

        let game = GameStateMachine::start(&config).unwrap();
        assert_eq!(game.phase(), GamePhase::Play);
    }

    #[test]
    fn test_max_frames_limits_replay() {
        let dir = TempDir::new().unwrap();
        let mut config = GameConfig::default();
        config.store.path = dir.path().join("game.settings.txt");

        let trace_path = dir.path().join("idle.jsonl");
        let text: String = (0..10).map(|i| format!("{{\"t_ms\": {}}}\n", i * 33)).collect();
        std::fs::write(&trace_path, text).unwrap();

        let stats = replay(&config, &trace_path, Some(4), false).unwrap();
        assert_eq!(stats.frames, 4);
        assert_eq!(stats.zones_committed, 0);
    }

    #[test]
    fn test_settings_flag_overrides_store_path() {
        let config = load_config(None, Some(PathBuf::from("/tmp/other.txt"))).unwrap();
        assert_eq!(config.store.path, PathBuf::from("/tmp/other.txt"));
    }
}
