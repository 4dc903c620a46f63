//! alien - formula-driven sound generator
//!
//! Run with: cargo run -- generate --formula "sin(2*pi*t)"

mod cli;

use std::{path::Path, time::Duration};

use alien_synth::{
    io::{write_wav, OutputDevice},
    render_note, EngineConfig, SynthEngine,
};
use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, GenerateArgs};

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => match &args.output {
            Some(path) => render_to_file(&args, path),
            None => play(&args),
        },
    }
}

fn render_to_file(args: &GenerateArgs, path: &Path) -> EyreResult<()> {
    let mut config = EngineConfig::offline(args.sample_rate);
    config.seed = args.seed;

    let audio = render_note(&config, &args.to_params()).wrap_err("failed to render note")?;
    write_wav(path, &audio).wrap_err_with(|| format!("failed to write {}", path.display()))?;

    println!(
        "Wrote {:.2}s of audio to {}",
        audio.duration_seconds(),
        path.display()
    );
    Ok(())
}

fn play(args: &GenerateArgs) -> EyreResult<()> {
    let device = OutputDevice::open_default().wrap_err("failed to open audio output")?;

    let config = EngineConfig {
        sample_rate: device.sample_rate(),
        seed: args.seed,
        ..EngineConfig::default()
    };
    let params = args.to_params();

    let (mut engine, renderer) = SynthEngine::new(config)?;
    let _stream = device.play(renderer).wrap_err("failed to start audio output")?;

    println!("=== Alien Sound Generator ===");
    println!("Formula: {}", args.formula);
    println!(
        "Frequency: {} Hz, duration: {} s",
        params.base_frequency, params.duration_seconds
    );

    engine.start(&params).wrap_err("failed to start note")?;

    // Let the note play out, plus a little slack for the timer
    let wait = Duration::try_from_secs_f32(params.duration_seconds + 0.1).unwrap_or(Duration::MAX);
    std::thread::sleep(wait);
    engine.poll();
    Ok(())
}
