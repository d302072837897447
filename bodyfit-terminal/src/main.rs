/// Bodyfit Terminal - suit playback in the terminal
///
/// Loads a SuitSpec and an optional Sim sequence and plays the suit back as
/// colored ASCII. Asset paths are resolved under `--root`.
/// Controls:
///   - Space: Play / pause
///   - Left/Right: Previous / next frame
///   - T: Toggle textures, +/-: Relief amplitude, [/]: Speed
///   - F: Refit camera, Q/ESC: Quit
use std::path::{Path, PathBuf};

use anyhow::Context;
use bodyfit_core::{Sim, SuitRig, SuitSpec};
use bodyfit_terminal::{assets, AssetWorker, Session, TerminalApp, ViewerConfig};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Segmented suit viewer for the terminal
#[derive(Parser, Debug)]
#[command(name = "bodyfit-terminal")]
#[command(author, version, about = "Play back a segmented suit in the terminal", long_about = None)]
struct Cli {
    /// SuitSpec JSON
    #[arg(long)]
    suitspec: PathBuf,

    /// Sim JSON; without it the static front layout is shown
    #[arg(long)]
    sim: Option<PathBuf>,

    /// Directory that asset paths are resolved against
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Viewer config (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Relief amplitude override
    #[arg(long)]
    relief: Option<f32>,

    /// Playback speed override
    #[arg(long)]
    speed: Option<f64>,

    /// Start with textures (and relief) off
    #[arg(long)]
    no_textures: bool,

    /// Print load status and per-part coverage, then exit
    #[arg(long)]
    report: bool,

    /// Logging verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    // stdout carries the rendered frame
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = ViewerConfig::load(cli.config.as_deref())?;
    if let Some(relief) = cli.relief {
        config.rig.relief_amplitude = relief;
    }
    if let Some(speed) = cli.speed {
        config.speed = speed;
    }
    if cli.no_textures {
        config.rig.textures_enabled = false;
    }

    let spec = SuitSpec::from_json(&read_text(&cli.suitspec)?)
        .with_context(|| format!("invalid SuitSpec {}", cli.suitspec.display()))?;
    let (sim, sim_source) = match &cli.sim {
        Some(path) => {
            let sim = Sim::from_json(&read_text(path)?)
                .with_context(|| format!("invalid Sim {}", path.display()))?;
            (sim, path.display().to_string())
        }
        None => (Sim::default(), "(no sim)".to_string()),
    };
    let summary = sim.summary();
    info!(
        frames = summary.frames,
        segments = summary.segments,
        equip_frame = summary.equip_frame,
        equipped = summary.equipped,
        "sim loaded"
    );

    let mut rig = SuitRig::new(config.rig.clone());
    let requests = rig.load(&spec);

    if cli.report {
        for request in requests {
            rig.accept(assets::fetch(&cli.root, request));
        }
        print_report(&rig, &sim, &sim_source);
        return Ok(());
    }

    let worker = AssetWorker::spawn(cli.root.clone());
    for request in requests {
        worker.request(request);
    }

    let session = Session::new(rig, sim, sim_source, &config);
    let mut app = TerminalApp::new(session, worker, config.target_fps)?;
    app.run()?;
    Ok(())
}

fn read_text(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn print_report(rig: &SuitRig, sim: &Sim, sim_source: &str) {
    println!("{}", rig.status().summary(sim.frames.len(), sim_source));
    for part in rig.parts() {
        let Some(report) = rig.coverage(&part.name) else {
            continue;
        };
        let textured = if part.texture().is_some() { "" } else { " (untextured)" };
        println!("{:<16} {}{}", part.name, report, textured);
        if part.texture().is_some() && report.is_poor_fit() {
            warn!(part = %part.name, fit = report.fit_score, "texture does not match the UV layout");
        }
    }
}
