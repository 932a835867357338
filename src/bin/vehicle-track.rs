use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use vehicle_track::{
    ClaimPolicy, PipelineConfig, Recording, TrackerPipeline, VehicleCounts, VideoReport,
};

#[derive(Parser, Debug)]
#[command(name = "vehicle-track", about = "Track and count vehicles from recorded detections")]
struct Args {
    /// Recorded detector output (JSON)
    #[arg(long, value_name = "PATH")]
    input: PathBuf,
    /// Pipeline configuration (JSON); command-line flags take precedence
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Run detection every N frames
    #[arg(long)]
    stride: Option<u64>,
    #[arg(long)]
    iou_threshold: Option<f32>,
    /// Never let two detections claim the same track in one frame
    #[arg(long)]
    exclusive: bool,
    /// Sampled frames an unmatched track is kept for
    #[arg(long)]
    max_missed_frames: Option<u32>,
    /// Write the report here instead of stdout
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
    /// Print only the vehicle counts
    #[arg(long)]
    summary: bool,
}

#[derive(Serialize)]
struct Output<'a> {
    #[serde(flatten)]
    counts: VehicleCounts,
    detections: &'a [vehicle_track::FrameResult],
    fps: u32,
}

fn load_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing config {}", path.display()))?
        }
        None => PipelineConfig::default(),
    };

    if let Some(stride) = args.stride {
        config.stride = stride;
    }
    if let Some(iou_threshold) = args.iou_threshold {
        config.tracker.iou_threshold = iou_threshold;
    }
    if args.exclusive {
        config.tracker.claim_policy = ClaimPolicy::Exclusive;
    }
    if let Some(max_missed_frames) = args.max_missed_frames {
        config.tracker.max_missed_frames = max_missed_frames;
    }
    Ok(config)
}

fn write_report(args: &Args, report: &VideoReport) -> Result<()> {
    let out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        ),
        None => Box::new(io::stdout().lock()),
    };
    let mut out = BufWriter::new(out);

    if report.is_empty() {
        serde_json::to_writer_pretty(
            &mut out,
            &serde_json::json!({ "message": "No vehicles detected in the video." }),
        )?;
    } else if args.summary {
        serde_json::to_writer_pretty(&mut out, &report.counts())?;
    } else {
        let output = Output {
            counts: report.counts(),
            detections: &report.detections,
            fps: report.fps,
        };
        serde_json::to_writer_pretty(&mut out, &output)?;
    }
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vehicle_track=info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let recording = Recording::open(&args.input)
        .with_context(|| format!("opening {}", args.input.display()))?;
    let (source, detector) = recording.into_replay();

    let mut pipeline = TrackerPipeline::new(detector, config)?;
    let report = pipeline.process(source)?;

    if let Some(error) = &report.source_error {
        warn!(frames_read = report.frames_read, %error, "video ended early");
    }

    if report.is_empty() {
        warn!("no vehicles detected in the video");
    } else {
        let counts = report.counts();
        info!(
            total = counts.total_vehicles,
            unique = counts.unique_vehicles,
            "tracking completed"
        );
    }

    write_report(&args, &report)
}
