use anyhow::{Context, Result, bail};
use clap::Parser;
use imagebox::texture_loader::expand_image_paths;
use imagebox::{EffectRequest, FsLoader, ImageBox, ImageBoxError};
use rand::seq::SliceRandom;
use raylib::prelude::TraceLogLevel;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod cli;
mod display;
mod ffmpeg;

use crate::cli::Args;
use crate::display::WindowSink;
use crate::ffmpeg::Ffmpeg;

const SUMMARY_INTERVAL: f64 = 5.0; // Seconds between debug summaries of the box

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    // --- Load Images ---
    let mut paths = expand_image_paths(&args.paths).context("Failed to collect image paths")?;
    if args.shuffle {
        paths.shuffle(&mut rand::rng());
    }

    let mut image_box = ImageBox::new(FsLoader, args.config());
    let failures = image_box.add_images(&paths);
    if image_box.is_empty() {
        bail!("No images were loaded ({} failed)", failures.len());
    }
    info!(images = image_box.len(), failed = failures.len(), "loaded images");

    let request = args.effect_request();
    match &args.record {
        Some(video) => record(&mut image_box, request, &args, video),
        None => show(&mut image_box, request, &args),
    }
}

/// Interactive window driven by raylib's frame pacing and clock.
fn show(image_box: &mut ImageBox<FsLoader>, request: EffectRequest, args: &Args) -> Result<()> {
    let initial = image_box.config().viewport;
    let (mut rl, thread) = raylib::init()
        .size(initial.width as i32, initial.height as i32)
        .title("imagebox")
        .resizable()
        .build();
    rl.set_target_fps(args.fps);
    rl.set_trace_log(TraceLogLevel::LOG_ERROR);

    let mut window = WindowSink::new(&mut rl, &thread, args.background);
    let mut pending = Some(request);
    let mut last_summary = 0.0;

    // --- Main Loop ---
    while !window.should_close() {
        let now = window.now();
        let viewport = window.viewport();
        match image_box.update(now, pending.take().as_ref(), viewport, &mut window) {
            Ok(()) => {}
            Err(ImageBoxError::NoImages) => window.draw_message("No images loaded."),
            Err(e) => return Err(e).context("Failed to present frame"),
        }
        if now - last_summary >= SUMMARY_INTERVAL {
            debug!(effects = %image_box.effects(), "{image_box}");
            last_summary = now;
        }
    }
    Ok(())
}

/// Offline rendering at a fixed frame time, encoded by ffmpeg.
fn record(image_box: &mut ImageBox<FsLoader>, request: EffectRequest, args: &Args, video: &std::path::Path) -> Result<()> {
    let viewport = image_box.config().viewport;
    let fps = args.fps.max(1);
    let frame_time = 1.0 / f64::from(fps);
    let frames = (args.duration.max(0.0) / frame_time).ceil() as u64;
    info!(video = %video.display(), frames, fps, "recording");

    let mut ffmpeg = Ffmpeg::new(viewport, fps, video, args.background)?;
    let mut pending = Some(request);
    for frame in 0..frames {
        let now = frame as f64 * frame_time;
        match image_box.update(now, pending.take().as_ref(), viewport, &mut ffmpeg) {
            Ok(()) | Err(ImageBoxError::NoImages) => {}
            Err(e) => return Err(e).with_context(|| format!("Failed to record frame {frame}")),
        }
    }
    drop(ffmpeg); // waits for the encoder
    info!("{image_box} recorded to {}", video.display());
    Ok(())
}
