//! count_replay - run the vehicle counter over recorded detections
//!
//! This tool:
//! 1. Loads `TrackingConfig` (file + environment overrides)
//! 2. Reads per-frame detections from a JSON-lines file, or generates a
//!    synthetic two-lane scene when no file is given
//! 3. Runs every n-th frame through `DetectionFilter` -> `VehicleCounter`
//! 4. Reports the vehicle count (and optionally the last record as JSON)

use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use vehicle_counter::{
    DetectionSource, FrameRecord, PipelineRunner, ReplaySource, ScriptedSource, TrackingConfig,
};

/// Bottom band of a 1280x720 frame, used as the exit in synthetic mode.
const SYNTHETIC_EXIT: [(i64, i64); 4] = [(0, 600), (1279, 600), (1279, 719), (0, 719)];
const SYNTHETIC_SPACING: usize = 20;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Config file (JSON, or TOML with a .toml extension).
    #[arg(long, env = "VEHICLE_COUNTER_CONFIG")]
    config: Option<PathBuf>,
    /// JSON-lines detections file. Omit for the synthetic scene.
    #[arg(long)]
    detections: Option<PathBuf>,
    /// Number of frames generated in synthetic mode.
    #[arg(long, default_value_t = 300)]
    synthetic_frames: usize,
    /// Process every n-th frame (overrides the config).
    #[arg(long)]
    frame_stride: Option<u32>,
    /// Print the final frame record as JSON on stdout.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let mut cfg = TrackingConfig::load_from(args.config.as_deref())?;
    if let Some(stride) = args.frame_stride {
        cfg.frame_stride = stride;
    }

    let mut source: Box<dyn DetectionSource> = match &args.detections {
        Some(path) => Box::new(ReplaySource::open(path)?),
        None => {
            if cfg.exit_polygons.is_empty() && cfg.exit_mask_images.is_empty() {
                log::info!("synthetic mode: using bottom band as exit");
                cfg.exit_polygons.push(SYNTHETIC_EXIT.to_vec());
            }
            Box::new(ScriptedSource::synthetic_lanes(
                args.synthetic_frames,
                SYNTHETIC_SPACING,
            ))
        }
    };
    cfg.validate()?;
    source.warm_up()?;

    let mut pipeline = PipelineRunner::new();
    pipeline.add(cfg.build_filter())?;
    pipeline.add(cfg.build_counter()?)?;

    log::info!(
        "count_replay running: source={}, stages={:?}, stride={}",
        source.name(),
        pipeline.stage_names(),
        cfg.frame_stride
    );
    log::info!(
        "path_size={}, max_distance={}, weights=({}, {}), max_coast_frames={}",
        cfg.counter.path_size,
        cfg.counter.max_distance,
        cfg.counter.x_weight,
        cfg.counter.y_weight,
        cfg.counter.max_coast_frames
    );

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))
            .map_err(|e| anyhow!("error setting Ctrl-C handler: {}", e))?;
    }

    let mut frames_seen = 0u64;
    let mut frame_number = 0u64;
    let mut last_record: Option<FrameRecord> = None;

    while let Some(detections) = source.next_frame()? {
        // Only stop between frames.
        if stop.load(Ordering::SeqCst) {
            log::warn!("interrupted after {} frames", frames_seen);
            break;
        }
        frames_seen += 1;
        if (frames_seen - 1) % cfg.frame_stride as u64 != 0 {
            continue;
        }

        let record = pipeline.run(FrameRecord::new(frame_number, detections))?;
        for crossing in &record.crossings {
            log::info!(
                "frame #{}: vehicle counted (path {}), total {}",
                record.frame_number,
                crossing.path_id,
                record.vehicle_count
            );
        }
        frame_number += 1;
        last_record = Some(record);
    }

    let vehicle_count = last_record.as_ref().map(|r| r.vehicle_count).unwrap_or(0);
    log::info!(
        "done: {} frames read, {} processed, {} vehicles counted",
        frames_seen,
        frame_number,
        vehicle_count
    );

    if args.json {
        let record = last_record.unwrap_or_default();
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("{}", vehicle_count);
    }

    Ok(())
}
