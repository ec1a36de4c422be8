//! Engine audio CLI
//!
//! Command-line interface for the engine-audio crossfader.

use clap::Parser;
use env_logger::Env;
use log::debug;

use engine_audio::cli::{commands, Cli, Commands};
use engine_audio::simulate::SimulationOptions;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    debug!("engine-audio v{}", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("engine-audio v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    };

    result.map_err(into_report)
}

/// Print recovery hints and wrap the error for anyhow, which prints the chain on exit
fn into_report(e: engine_audio::EngineAudioError) -> anyhow::Error {
    for hint in e.recovery_suggestions() {
        eprintln!("  hint: {}", hint);
    }
    let code = e.error_code();
    anyhow::Error::new(e).context(format!("engine-audio command failed [{}]", code))
}

fn handle_command(cmd: Commands) -> engine_audio::Result<()> {
    match cmd {
        Commands::Curve { steps, config } => commands::print_curve(steps, config.as_deref()),
        Commands::GenerateSamples { dir, sample_rate } => {
            commands::generate_samples(&dir, sample_rate)
        }
        Commands::Simulate {
            config,
            script,
            output,
            fps,
            tail_secs,
            bit_depth,
        } => {
            let options = SimulationOptions {
                fps,
                tail_secs,
                ..Default::default()
            };
            commands::run_simulation(&config, &script, &output, options, bit_depth)
        }
    }
}
