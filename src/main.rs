use galsim::{ScenarioConfig, Scenario, PngFrameRenderer};
use galsim::{run_2d, run_frames};
use galsim::{bench_step, bench_rotation, bench_step_curve};

use anyhow::{Context, Result};
use clap::Parser;

use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Toy galactic disk: stars, supernova flashes and rotating gas")]
struct Args {
    /// Scenario file under `scenarios/`
    #[arg(short, default_value = "default.yaml")]
    file_name: String,

    #[arg(long)]
    frames: Option<usize>,

    #[arg(long)]
    dt_myr: Option<f64>,

    /// Output directory for PNG frames
    #[arg(long)]
    out: Option<String>,

    /// Image size in px
    #[arg(long)]
    size: Option<u32>,

    #[arg(long)]
    seed: Option<u64>,

    /// Open the interactive viewer instead of writing frames
    #[arg(long)]
    viewer: bool,

    /// Run the benchmarks and exit
    #[arg(long)]
    bench: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<ScenarioConfig> {
    let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name);
    if !config_path.exists() {
        log::warn!("{} not found, using built-in defaults", config_path.display());
        return Ok(ScenarioConfig::default());
    }

    let text = fs::read_to_string(&config_path)
        .with_context(|| format!("reading {}", config_path.display()))?;
    let scenario_cfg = ScenarioConfig::from_yaml_str(&text)
        .with_context(|| format!("parsing {}", config_path.display()))?;

    Ok(scenario_cfg)
}

fn apply_overrides(cfg: &mut ScenarioConfig, args: &Args) {
    if let Some(frames) = args.frames {
        cfg.run.frames = frames;
    }
    if let Some(dt) = args.dt_myr {
        cfg.run.dt_myr = dt;
    }
    if let Some(out) = &args.out {
        cfg.output.dir = out.clone();
    }
    if let Some(size) = args.size {
        cfg.output.image_size = size;
    }
    if let Some(seed) = args.seed {
        cfg.generation.seed = Some(seed);
    }
    if args.viewer {
        cfg.output.viewer = true;
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if args.bench {
        bench_step();
        bench_rotation();
        bench_step_curve();
        return Ok(());
    }

    let mut scenario_cfg = load_scenario_from_yaml(&args.file_name)?;
    apply_overrides(&mut scenario_cfg, &args);

    let mut scenario = Scenario::build_scenario(&scenario_cfg).context("failed to build scenario")?;

    if scenario_cfg.output.viewer {
        run_2d(scenario);
    } else {
        let mut renderer = PngFrameRenderer::new(&scenario_cfg.output.dir, scenario_cfg.output.image_size)
            .with_context(|| format!("preparing {}", scenario_cfg.output.dir))?;
        run_frames(&mut scenario, &mut renderer)?;
    }

    Ok(())
}
