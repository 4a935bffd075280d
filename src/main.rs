use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use evergreen::{MorphState, SceneConfig};

/// Morphing particle tree viewer. Press Space to scatter and reassemble, P to pause.
#[derive(Parser, Debug)]
#[command(name = "evergreen", version, about)]
struct Args {
    /// JSON scene configuration; omitted fields keep their defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base instance count (leaves); other groups scale from it.
    #[arg(short, long)]
    particles: Option<u32>,

    /// Seed for procedural placement.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Start scattered instead of assembled.
    #[arg(long)]
    dispersed: bool,

    /// Print the effective configuration as JSON and exit.
    #[arg(long)]
    dump_config: bool,
}

fn load_config(args: &Args) -> Result<SceneConfig, evergreen::ConfigError> {
    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading scene from {}", path.display());
            SceneConfig::load(path)?
        }
        None => SceneConfig::default(),
    };

    if let Some(particles) = args.particles {
        config.particle_count = particles;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.dispersed {
        config.initial_state = MorphState::Dispersed;
    }
    config.validate()?;
    Ok(config)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if args.dump_config {
        return match config.to_json() {
            Ok(json) => {
                println!("{}", json);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    match evergreen::viewer::run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
