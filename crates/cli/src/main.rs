#![deny(unsafe_code)]
//! CLI binary for dot-reveal.
//!
//! Subcommands:
//! - `render` — run the reveal effect offline for N frames (or up to a clock value), write PNG
//! - `info` — print the default configuration and its schema

mod error;

use clap::{Parser, Subcommand};
use dot_reveal_core::engine::NOMINAL_FRAME_INTERVAL;
use dot_reveal_core::{Engine, RevealConfig, RevealEffect, Rgb, SurfaceSize};
use dot_reveal_raster::{HeadlessScheduler, RasterSurface};
use error::CliError;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "dot-reveal", about = "Particle reveal effect renderer", version)]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Verbosity level (can be repeated for more detail).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render the effect at a point in its animation and write a PNG snapshot.
    Render {
        /// Surface width in CSS pixels.
        #[arg(short = 'W', long, default_value_t = 400.0)]
        width: f64,

        /// Surface height in CSS pixels.
        #[arg(short = 'H', long, default_value_t = 400.0)]
        height: f64,

        /// Device pixels per CSS pixel.
        #[arg(long, default_value_t = 1.0)]
        pixel_ratio: f64,

        /// Number of frames to advance.
        #[arg(short, long, default_value_t = 30, conflicts_with = "time")]
        frames: u64,

        /// Advance until the logical clock reaches this value instead of a frame count.
        #[arg(short, long)]
        time: Option<f64>,

        /// PRNG seed for jitter and palette picks.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Effect configuration as a JSON object (fields as printed by `info`).
        #[arg(long, default_value = "{}")]
        config: String,

        /// Dot color as #rrggbb; repeat for a palette. Overrides `colors` in --config.
        #[arg(short, long = "color")]
        colors: Vec<String>,

        /// Output file path.
        #[arg(short, long, default_value = "reveal.png")]
        output: PathBuf,
    },
    /// Print the default configuration and its schema.
    Info,
}

/// Frames needed for the clock to reach `time` at `speed`.
fn frames_until(time: f64, speed: f64) -> Result<u64, CliError> {
    if !time.is_finite() || time < 0.0 {
        return Err(CliError::Input(format!(
            "--time must be finite and non-negative, got {time}"
        )));
    }
    Ok((time / (speed * NOMINAL_FRAME_INTERVAL)).ceil() as u64)
}

fn load_config(json: &str, colors: &[String]) -> Result<RevealConfig, CliError> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|e| CliError::Input(format!("invalid --config JSON: {e}")))?;
    let mut config = RevealConfig::from_json(&value)?;
    if !colors.is_empty() {
        config.colors = colors
            .iter()
            .map(|c| Rgb::from_hex(c))
            .collect::<Result<_, _>>()?;
    }
    Ok(config)
}

/// Surface dimensions must be positive CSS pixel counts.
fn check_dimensions(width: f64, height: f64) -> Result<(), CliError> {
    for (flag, value) in [("--width", width), ("--height", height)] {
        if !value.is_finite() || value <= 0.0 {
            return Err(CliError::Input(format!(
                "{flag} must be finite and positive, got {value}"
            )));
        }
    }
    Ok(())
}

/// Level forced by `-v` flags; `None` leaves `RUST_LOG` (default `warn`) in charge.
fn level_filter(verbose: u8) -> Option<log::LevelFilter> {
    match verbose {
        0 => None,
        1 => Some(log::LevelFilter::Info),
        2 => Some(log::LevelFilter::Debug),
        _ => Some(log::LevelFilter::Trace),
    }
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = level_filter(verbose) {
        builder.filter_level(level);
    }
    if let Err(e) = builder.try_init() {
        eprintln!("logger already initialized: {e}");
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Info => {
            let defaults = serde_json::to_value(RevealConfig::default())?;
            if cli.json {
                let info = serde_json::json!({
                    "defaults": defaults,
                    "schema": RevealConfig::schema(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Defaults:");
                println!("{}", serde_json::to_string_pretty(&defaults)?);
                println!("Schema:");
                println!("{}", serde_json::to_string_pretty(&RevealConfig::schema())?);
            }
        }
        Command::Render {
            width,
            height,
            pixel_ratio,
            frames,
            time,
            seed,
            config,
            colors,
            output,
        } => {
            check_dimensions(width, height)?;
            let config = load_config(&config, &colors)?;
            let frames = match time {
                Some(t) => frames_until(t, config.animation_speed)?,
                None => frames,
            };

            let size = SurfaceSize::with_pixel_ratio(width, height, pixel_ratio);
            let mut effect = RevealEffect::new(
                RasterSurface::new(size),
                HeadlessScheduler::default(),
                config,
                seed,
            )?;
            for _ in 0..frames {
                if !effect.on_frame() {
                    break;
                }
            }

            let engine = effect.engine();
            let drawn = engine.visible_dots().count();
            let params = engine.params();
            dot_reveal_raster::snapshot::write_png(effect.surface(), &output)?;
            effect.dispose();

            if cli.json {
                let info = serde_json::json!({
                    "width": width,
                    "height": height,
                    "pixel_ratio": size.pixel_ratio,
                    "frames": frames,
                    "seed": seed,
                    "drawn": drawn,
                    "params": params,
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {width}x{height} @{}x, {frames} frames (t={:.3}), {drawn} dots -> {}",
                    size.pixel_ratio,
                    params["time"].as_f64().unwrap_or_default(),
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
