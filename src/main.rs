use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use gpx_resample::abort;
use gpx_resample::config::Config;
use gpx_resample::pipeline::{CsvSink, Pipeline};
use gpx_resample::resample::{InterpolationMode, Resampler, SpeedUnit, TrackSummary};
use gpx_resample::track;

#[derive(Parser)]
#[command(name = "gpx-resample")]
#[command(about = "Resample a GPX track to one row per second")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a GPX track to a per-second CSV table
    Convert {
        input: PathBuf,
        /// Destination table (defaults to the config value, then output.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// YAML configuration file
        #[arg(short, long)]
        config: Option<String>,
        /// Interpolate by absolute second index (legacy output)
        #[arg(long)]
        legacy: bool,
        #[arg(long, value_enum)]
        speed_unit: Option<SpeedUnit>,
        #[arg(long)]
        channel_capacity: Option<usize>,
    },
    /// Print a summary of a GPX track
    Inspect {
        input: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            output,
            config,
            legacy,
            speed_unit,
            channel_capacity,
        } => {
            let mut config = match config {
                Some(path) => match Config::from_file(&path) {
                    Ok(c) => c,
                    Err(e) => {
                        log::error!("Config error in {}: {}", path, e);
                        return ExitCode::FAILURE;
                    }
                },
                None => Config::default(),
            };
            if let Some(output) = output {
                config.output = output;
            }
            if legacy {
                config.resample.interpolation = InterpolationMode::Legacy;
            }
            if let Some(unit) = speed_unit {
                config.resample.speed_unit = unit;
            }
            if let Some(capacity) = channel_capacity {
                config.pipeline.channel_capacity = capacity;
            }
            convert(&input, &config).await
        }
        Commands::Inspect { input, json } => inspect(&input, json),
    }
}

async fn convert(input: &Path, config: &Config) -> ExitCode {
    let pipeline_options = match config.pipeline_options() {
        Ok(o) => o,
        Err(e) => {
            log::error!("Config error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let segment = match track::parse_gpx_file(input) {
        Ok(s) => s,
        Err(e) => {
            log::error!("Failed to read {}: {}", input.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let resampler = Resampler::new(segment, config.resample_options());
    let options = resampler.options();
    log::info!(
        "Resampling with {} interpolation, speed in {}",
        options.interpolation,
        options.speed_unit
    );

    let (abort_handle, abort_signal) = abort::channel();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupted, aborting run");
            abort_handle.abort();
        }
    });

    let sink = CsvSink::new(config.output.clone());
    let result = Pipeline::new(pipeline_options)
        .run(resampler, sink, abort_signal)
        .await;
    ctrl_c.abort();

    match result {
        Ok(report) => {
            log::info!(
                "Wrote {} samples to {} in {}",
                report.samples,
                config.output.display(),
                humantime::format_duration(report.elapsed)
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Conversion failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn inspect(input: &Path, json: bool) -> ExitCode {
    let segment = match track::parse_gpx_file(input) {
        Ok(s) => s,
        Err(e) => {
            log::error!("Failed to read {}: {}", input.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let resampler = Resampler::new(segment, Default::default());
    let summary = match TrackSummary::from_resampler(&resampler) {
        Ok(s) => s,
        Err(e) => {
            log::error!("Invalid track: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if json {
        match serde_json::to_string_pretty(&summary) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                log::error!("Failed to serialize summary: {}", e);
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    println!(
        "Track {} ({} points)",
        summary.name.as_deref().unwrap_or("<unnamed>"),
        summary.points
    );
    println!("  start:    {}", summary.start);
    println!("  end:      {}", summary.end);
    println!("  duration: {}s", summary.duration_s);
    println!("  distance: {:.2}m", summary.distance_m);
    println!("  samples:  {}", summary.samples);
    ExitCode::SUCCESS
}
