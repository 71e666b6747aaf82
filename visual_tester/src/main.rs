// Demo driver for the `frame_delta` detector.
//
// Reads an ordered sequence of still images as the frames of one stream, runs each
// through a `MotionDetector`, and writes an annotated PNG per frame. Decoding runs
// ahead of detection on the blocking pool and hands frames over a bounded channel
// with a single producer, so frames reach the detector in the order given.

mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use frame_delta::{DetectorConfig, DetectorError, MotionDetector};
use image::RgbImage;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// How many decoded frames may wait for the detector.
const FRAME_QUEUE_DEPTH: usize = 4;

#[derive(Parser, Debug)]
#[command(
    name = "visual_tester",
    about = "Draws motion boxes onto a sequence of frames"
)]
struct Args {
    /// Frame images, in temporal order.
    #[arg(required = true)]
    frames: Vec<PathBuf>,

    /// Directory for the annotated frames.
    #[arg(short, long, default_value = "annotated")]
    output: PathBuf,

    /// TOML file with detector settings.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Nominal frame rate of the sequence.
    #[arg(long, default_value_t = 30.0)]
    frame_rate: f64,
}

struct DecodedFrame {
    path: PathBuf,
    image: RgbImage,
}

#[derive(Debug, Default)]
struct RunSummary {
    processed: usize,
    with_motion: usize,
    boxes: usize,
    skipped: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let detector_config = settings::load_detector_config(args.config.as_deref())?;
    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    let (tx, mut rx) = mpsc::channel(FRAME_QUEUE_DEPTH);
    let reader = tokio::spawn(read_frames(args.frames.clone(), tx));

    let Some(first) = rx.recv().await else {
        warn!("no frames decoded");
        return reader.await.context("frame reader panicked")?;
    };

    let (width, height) = first.image.dimensions();
    let mut detector = build_detector(width, height, args.frame_rate, detector_config)?;
    let mut summary = RunSummary::default();

    annotate(&mut detector, first, &args.output, &mut summary).await?;
    while let Some(frame) = rx.recv().await {
        annotate(&mut detector, frame, &args.output, &mut summary).await?;
    }
    reader.await.context("frame reader panicked")??;

    info!(
        processed = summary.processed,
        with_motion = summary.with_motion,
        boxes = summary.boxes,
        skipped = summary.skipped,
        "done"
    );
    Ok(())
}

fn build_detector(
    width: u32,
    height: u32,
    frame_rate: f64,
    config: DetectorConfig,
) -> Result<MotionDetector> {
    let detector = MotionDetector::with_config(width, height, frame_rate, config)
        .with_context(|| format!("cannot build a detector for {width}x{height} frames"))?;
    let (working_width, working_height) = detector.working_size();
    info!(width, height, working_width, working_height, "detector ready");
    Ok(detector)
}

/// Decodes each path in order and sends it to the detector loop.
async fn read_frames(paths: Vec<PathBuf>, tx: mpsc::Sender<DecodedFrame>) -> Result<()> {
    for path in paths {
        let decode_path = path.clone();
        let image = tokio::task::spawn_blocking(move || image::open(&decode_path))
            .await
            .context("decoder task panicked")?
            .with_context(|| format!("failed to decode {}", path.display()))?
            .into_rgb8();

        if tx.send(DecodedFrame { path, image }).await.is_err() {
            debug!("detector loop stopped, ending frame reader");
            break;
        }
    }
    Ok(())
}

async fn annotate(
    detector: &mut MotionDetector,
    frame: DecodedFrame,
    output: &Path,
    summary: &mut RunSummary,
) -> Result<()> {
    let DecodedFrame { path, mut image } = frame;

    let boxes = match detector.process_frame(&mut image) {
        Ok(boxes) => boxes,
        Err(DetectorError::DimensionMismatch { expected, actual }) => {
            warn!(frame = %path.display(), ?expected, ?actual, "skipping frame");
            summary.skipped += 1;
            return Ok(());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("detection failed on {}", path.display()));
        }
    };

    summary.processed += 1;
    summary.boxes += boxes.len();
    if !boxes.is_empty() {
        summary.with_motion += 1;
    }
    info!(frame = %path.display(), boxes = boxes.len(), "processed");
    for bbox in &boxes {
        debug!(
            x = bbox.x,
            y = bbox.y,
            width = bbox.width,
            height = bbox.height,
            "motion"
        );
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("frame_{:05}", summary.processed));
    let target = output.join(format!("{stem}.png"));
    let write_target = target.clone();
    tokio::task::spawn_blocking(move || image.save(&write_target))
        .await
        .context("writer task panicked")?
        .with_context(|| format!("failed to write {}", target.display()))?;
    Ok(())
}
