//! REMO - voice memo frequency analysis
//!
//! Manage a directory of voice recordings, estimate each recording's
//! per-segment dominant frequencies, and replay the estimates as a timed
//! pulse sequence.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use remo_analysis::FrequencyAnalyzer;
use remo_feedback::{FrequencyMap, PulseScheduler};
use remo_library::{
    AnalysisCache, CachedEstimates, Config, Recording, RecordingLoader, RecordingStore,
};

#[derive(Parser)]
#[command(name = "remo", version, about = "Voice memo frequency analysis")]
struct Cli {
    /// Recordings directory (defaults to the configured or platform location)
    #[arg(long, global = true)]
    recordings_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List stored recordings
    List,
    /// Copy an audio file into the recording store
    Import {
        /// Audio file to import
        file: PathBuf,
    },
    /// Rename a recording
    Rename {
        name: String,
        new_name: String,
    },
    /// Delete a recording
    Delete {
        name: String,
    },
    /// Estimate per-segment dominant frequencies of a recording
    Analyze {
        name: String,
        /// Segment duration in seconds
        #[arg(long)]
        segment_duration: Option<f32>,
        /// Ignore cached results and re-analyze
        #[arg(long)]
        no_cache: bool,
    },
    /// Analyze and replay the estimates as timed feedback pulses
    Feedback {
        name: String,
        /// Segment duration in seconds
        #[arg(long)]
        segment_duration: Option<f32>,
        /// Delay between pulses in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load();

    let root = cli
        .recordings_dir
        .clone()
        .or_else(|| config.recordings_dir.clone())
        .unwrap_or_else(RecordingStore::default_root);
    let store = RecordingStore::open(&root)
        .with_context(|| format!("opening recording store at {}", root.display()))?;

    match cli.command {
        Command::List => {
            let recordings = store.list()?;
            if recordings.is_empty() {
                println!("No recordings in {}", store.root().display());
            } else {
                for recording in recordings {
                    println!("{:<40} {:>10} bytes", recording.name, recording.size);
                }
            }
        }
        Command::Import { file } => {
            let recording = store.import(&file)?;
            println!("Imported {}", recording.name);
        }
        Command::Rename { name, new_name } => {
            let recording = store.rename(&name, &new_name)?;
            println!("Renamed to {}", recording.name);
        }
        Command::Delete { name } => {
            store.delete(&name)?;
            println!("Deleted {name}");
        }
        Command::Analyze {
            name,
            segment_duration,
            no_cache,
        } => {
            let segment_duration = segment_duration.unwrap_or(config.segment_duration_secs);
            let recording = store.get(&name)?;
            let estimates = analyze_recording(&recording, segment_duration, !no_cache)?;

            if estimates.is_empty() {
                println!("No dominant frequencies found in {name}");
            } else {
                for (i, frequency) in estimates.iter().enumerate() {
                    println!("segment {i:>3}: {frequency:>9.2} Hz");
                }
            }
        }
        Command::Feedback {
            name,
            segment_duration,
            interval_ms,
        } => {
            let segment_duration = segment_duration.unwrap_or(config.segment_duration_secs);
            let interval_ms = interval_ms.unwrap_or(config.pulse_interval_ms);
            let recording = store.get(&name)?;
            let estimates = analyze_recording(&recording, segment_duration, true)?;

            if estimates.is_empty() {
                println!("No dominant frequencies found in {name}");
                return Ok(());
            }

            let scheduler = PulseScheduler::new(
                FrequencyMap::voice_default(),
                Duration::from_millis(interval_ms),
            );
            let stop = Arc::new(AtomicBool::new(false));
            let (events, handle) = scheduler.run_async(estimates, stop);

            for event in events {
                println!(
                    "pulse {:>3}: {:>9.2} Hz  intensity {:.2}  sharpness {:.2}",
                    event.index, event.frequency_hz, event.pulse.intensity, event.pulse.sharpness
                );
            }
            let _ = handle.join();
        }
    }

    Ok(())
}

/// Decode and analyze a recording, going through the cache when allowed.
fn analyze_recording(
    recording: &Recording,
    segment_duration_secs: f32,
    use_cache: bool,
) -> Result<Vec<f32>> {
    // Cache is best-effort: analysis still works if the database is unusable
    let cache = AnalysisCache::open(&AnalysisCache::default_path()).ok();

    if use_cache {
        if let Some(cache) = cache.as_ref() {
            if let Some(hit) = cache.get(
                &recording.path,
                recording.size,
                recording.modified_time,
                segment_duration_secs,
            ) {
                info!(name = recording.name, "using cached analysis");
                return Ok(hit.estimates);
            }
        }
    }

    let decoded = RecordingLoader::new()
        .load(&recording.path)
        .with_context(|| format!("decoding {}", recording.name))?;

    let analyzer = FrequencyAnalyzer::new(decoded.sample_rate, segment_duration_secs)
        .context("invalid analysis parameters")?;
    info!(
        name = recording.name,
        sample_rate = decoded.sample_rate,
        duration_secs = decoded.duration_secs,
        "analyzing recording"
    );
    let estimates = analyzer.analyze(&decoded.samples);

    if let Some(cache) = cache.as_ref() {
        let _ = cache.store(&CachedEstimates {
            path: recording.path.clone(),
            file_size: recording.size,
            modified_time: recording.modified_time,
            segment_duration_secs,
            estimates: estimates.clone(),
        });
    }

    Ok(estimates)
}
