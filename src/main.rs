//! Command-line interface.
//!
//! Wraps the library to validate and normalize reference audio, run
//! configured synthesis engines, and convert audio between formats.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use ttspro::audio::convert::{self, DEFAULT_MIN_SILENCE_MS, DEFAULT_SILENCE_THRESHOLD};
use ttspro::config::{load_config, AppConfig};
use ttspro::engine::builtin_models;
use ttspro::{perf, validate_reference, AudioFormat, Language, SynthesisEngine};

const DEFAULT_CONFIG: &str = "ttspro.yaml";

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "ttspro")]
#[command(about = "Text to speech with reference-audio validation and voice cloning", long_about = None)]
struct Cli {
    /// Print performance summary at the end of the run.
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Configuration YAML (defaults to ./ttspro.yaml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// CLI subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List supported language codes.
    Languages,
    /// List known models.
    Models,
    /// List engines from the configuration.
    Engines,
    /// Check a reference clip's duration (exit 0 valid, 1 rejected, 2 unreadable).
    Validate {
        /// Reference audio file.
        input: PathBuf,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Write a mono 22,050 Hz copy of a reference clip.
    Normalize {
        /// Reference audio file.
        input: PathBuf,
    },
    /// Generate speech from text.
    Say {
        /// Text to synthesize.
        text: String,
        /// Configured engine name.
        #[arg(long)]
        engine: String,
        /// Language code.
        #[arg(long, default_value = "en")]
        language: String,
        /// Speech speed multiplier (0.5-2.0).
        #[arg(long)]
        speed: Option<f32>,
        /// Slow speech.
        #[arg(long)]
        slow: bool,
    },
    /// Speak text in the voice of a reference clip.
    Clone {
        /// Text to synthesize.
        text: String,
        /// Reference voice clip.
        #[arg(long)]
        reference: PathBuf,
        /// Configured engine name.
        #[arg(long)]
        engine: String,
        /// Language code.
        #[arg(long, default_value = "en")]
        language: String,
    },
    /// Audio utility subcommands.
    Audio {
        /// Audio subcommand to execute.
        #[command(subcommand)]
        command: AudioCommands,
    },
}

/// Audio utility commands.
#[derive(Subcommand)]
enum AudioCommands {
    /// Convert between mp3, wav, ogg, flac, and m4a.
    Convert {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Output format; inferred from the output extension when omitted.
        #[arg(long, value_enum)]
        format: Option<AudioFormat>,
    },
    /// Print sample rate, channels, duration, and size.
    Info {
        input: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Change loudness by a decibel offset.
    Volume {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long, allow_negative_numbers = true)]
        gain_db: f32,
    },
    /// Remove leading and trailing silence.
    Trim {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// Amplitude below which audio counts as silence (0-1).
        #[arg(long, default_value_t = DEFAULT_SILENCE_THRESHOLD)]
        threshold: f32,
        /// Shortest silent run, in milliseconds, that gets removed.
        #[arg(long, default_value_t = DEFAULT_MIN_SILENCE_MS)]
        min_silence_ms: u32,
    },
    /// Concatenate clips.
    Merge {
        #[arg(long, required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,
        #[arg(long)]
        output: PathBuf,
    },
    /// Scale to a -1 dBFS peak.
    PeakNormalize {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
}

/// Entry point for the CLI.
fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    let config = resolve_config(cli.config.as_deref())?;

    let code = run(cli.command, &config)?;
    if cli.verbose {
        eprintln!("{}", perf::report());
    }
    Ok(code)
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Load the explicit config, else `./ttspro.yaml` if it exists, else defaults.
fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => load_config(path),
        None if Path::new(DEFAULT_CONFIG).exists() => load_config(DEFAULT_CONFIG),
        None => Ok(AppConfig::default()),
    }
}

fn run(command: Commands, config: &AppConfig) -> Result<ExitCode> {
    match command {
        Commands::Languages => {
            for language in Language::ALL {
                println!("{}\t{}", language.code(), language.name());
            }
        }
        Commands::Models => {
            for model in builtin_models() {
                let languages: Vec<_> = model.languages.iter().map(Language::code).collect();
                let cloning = if model.voice_cloning { " [voice cloning]" } else { "" };
                println!(
                    "{}\t{}{}\t{}",
                    model.id,
                    model.name,
                    cloning,
                    languages.join(",")
                );
            }
        }
        Commands::Engines => {
            let engines = config.engines();
            if engines.is_empty() {
                println!("No engines configured.");
            }
            for name in engines.names() {
                let engine = engines.get(name)?;
                println!("{name}\t{}", engine.descriptor().id);
            }
        }
        Commands::Validate { input, json } => return run_validate(&input, json, config),
        Commands::Normalize { input } => {
            let service = config.service()?;
            let normalized = service
                .normalizer()
                .normalize(&input)
                .with_context(|| format!("Failed to process {}", input.display()))?;
            println!("{}", normalized.path.display());
        }
        Commands::Say {
            text,
            engine,
            language,
            speed,
            slow,
        } => {
            let service = config.service()?;
            let engines = config.engines();
            let engine = engines.get(&engine)?;
            let mut request = service.request_for(engine, &text, &language)?.with_slow(slow);
            if let Some(speed) = speed {
                request = request.with_speed(speed)?;
            }
            let output = service.synthesize(engine, &request)?;
            eprintln!("{}", output.message);
            println!("{}", output.path.display());
        }
        Commands::Clone {
            text,
            reference,
            engine,
            language,
        } => {
            let service = config.service()?;
            let engines = config.engines();
            let engine = engines.get(&engine)?;
            let request = service.request_for(engine, &text, &language)?;
            let output = service.clone_voice(engine, &request, &reference)?;
            eprintln!("{}", output.message);
            println!("{}", output.path.display());
        }
        Commands::Audio { command } => run_audio(command, config)?,
    }
    Ok(ExitCode::SUCCESS)
}

fn run_validate(input: &Path, json: bool, config: &AppConfig) -> Result<ExitCode> {
    match validate_reference(input, &config.reference) {
        Ok(report) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "{}: {:.2}s | {} Hz | {}",
                    report.message, report.duration_seconds, report.sample_rate, report.channel_layout
                );
            }
            Ok(if report.is_valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
        Err(e) => {
            if json {
                let value = serde_json::json!({
                    "is_valid": false,
                    "message": "Could not read audio file",
                    "error": e.to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                eprintln!("Could not read audio file: {e}");
            }
            Ok(ExitCode::from(2))
        }
    }
}

fn run_audio(command: AudioCommands, config: &AppConfig) -> Result<()> {
    let converter = config.converter();
    let ok = match command {
        AudioCommands::Convert {
            input,
            output,
            format,
        } => converter.convert_format(&input, &output, format),
        AudioCommands::Info { input, json } => {
            let info = convert::audio_info(&input)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Duration: {}s", info.duration_seconds);
                println!("Sample rate: {} Hz", info.sample_rate);
                println!("Channels: {}", info.channels);
                println!("File size: {} MB", info.file_size_mb);
            }
            true
        }
        AudioCommands::Volume {
            input,
            output,
            gain_db,
        } => converter.change_volume(&input, &output, gain_db),
        AudioCommands::Trim {
            input,
            output,
            threshold,
            min_silence_ms,
        } => converter.trim_silence(&input, &output, threshold, min_silence_ms),
        AudioCommands::Merge { inputs, output } => converter.merge_audio(&inputs, &output),
        AudioCommands::PeakNormalize { input, output } => {
            converter.peak_normalize(&input, &output)
        }
    };
    if !ok {
        anyhow::bail!("Audio operation failed");
    }
    Ok(())
}
