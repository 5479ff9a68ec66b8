// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use args::Args;
use clap::Parser;
use edgefirst_filter::{
    engine::{Engine, EngineConfig, Mode},
    image::{frame_size, save_rgba, yuv420_to_rgba, PixelFormat, Yuv420},
};
use std::{
    error::Error,
    fs,
    path::Path,
    thread,
    time::{Duration, Instant},
};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, Layer};

mod args;

fn init_logging(args: &Args) -> Result<(), Box<dyn Error>> {
    let level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let stdout_log = tracing_subscriber::fmt::layer().with_filter(level);

    // journald is optional, e.g. when running inside a container
    let journald = match tracing_journald::layer() {
        Ok(layer) => Some(layer.with_filter(level)),
        Err(_) => None,
    };

    let tracy = if args.tracy {
        let _ = tracy_client::Client::start();
        Some(tracing_tracy::TracyLayer::default().with_filter(level))
    } else {
        None
    };

    let subscriber = tracing_subscriber::registry()
        .with(stdout_log)
        .with(journald)
        .with(tracy);
    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;
    Ok(())
}

/// Moving vertical bar on a dark background, in the requested layout.
fn synthetic_frame(format: PixelFormat, width: u32, height: u32, index: u64) -> Vec<u8> {
    let (w, h) = (width as usize, height as usize);
    let bar = (w / 8).max(1);
    let start = (index as usize * 4) % w;
    let lit = |x: usize| (x + w - start) % w < bar;

    let mut frame = vec![0u8; frame_size(width, height, format)];
    match format {
        PixelFormat::Rgba => {
            for (i, px) in frame.chunks_exact_mut(4).enumerate() {
                let value = if lit(i % w) { 255 } else { 32 };
                px.copy_from_slice(&[value, value, value, 255]);
            }
        }
        PixelFormat::I420 | PixelFormat::Nv12 | PixelFormat::Nv21 => {
            let (luma, chroma) = frame.split_at_mut(w * h);
            for (i, sample) in luma.iter_mut().enumerate() {
                *sample = if lit(i % w) { 235 } else { 40 };
            }
            chroma.fill(128);
        }
    }
    frame
}

fn load_frames(
    path: &Path,
    format: PixelFormat,
    width: u32,
    height: u32,
) -> Result<Vec<Vec<u8>>, Box<dyn Error>> {
    let data = fs::read(path)?;
    let size = frame_size(width, height, format);
    if data.len() < size {
        return Err(Box::from(format!(
            "{} holds {} bytes, a {}x{} {} frame needs {}",
            path.display(),
            data.len(),
            width,
            height,
            format,
            size
        )));
    }
    let frames: Vec<Vec<u8>> = data.chunks_exact(size).map(<[u8]>::to_vec).collect();
    info!("loaded {} {} frame(s) from {}", frames.len(), format, path.display());
    Ok(frames)
}

fn spawn_source(
    args: &Args,
    tx: kanal::Sender<Vec<u8>>,
) -> Result<thread::JoinHandle<()>, Box<dyn Error>> {
    let format = PixelFormat::from(args.format);
    let (width, height) = (args.width(), args.height());
    let recorded = match &args.input {
        Some(path) => Some(load_frames(path, format, width, height)?),
        None => None,
    };
    let count = args.frames;
    let period = match args.fps {
        0 => None,
        fps => Some(Duration::from_secs(1) / fps),
    };

    let source = move || {
        let mut deadline = Instant::now();
        for index in 0..count {
            let frame = match &recorded {
                Some(frames) => frames[index as usize % frames.len()].clone(),
                None => synthetic_frame(format, width, height, index),
            };
            if tx.send(frame).is_err() {
                // processing loop exited
                return;
            }
            if let Some(period) = period {
                deadline += period;
                if let Some(wait) = deadline.checked_duration_since(Instant::now()) {
                    thread::sleep(wait);
                }
            }
        }
    };
    Ok(thread::spawn(source))
}

fn to_rgba<'a>(
    frame: &'a [u8],
    format: PixelFormat,
    width: u32,
    height: u32,
    scratch: &'a mut [u8],
) -> edgefirst_filter::Result<&'a [u8]> {
    let src = match format {
        PixelFormat::Rgba => return Ok(frame),
        PixelFormat::I420 => Yuv420::i420(frame, width, height)?,
        PixelFormat::Nv12 => Yuv420::nv12(frame, width, height)?,
        PixelFormat::Nv21 => Yuv420::nv21(frame, width, height)?,
    };
    yuv420_to_rgba(&src, width, height, scratch);
    Ok(scratch)
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(&args)?;

    info!("EdgeFirst Camera Frame Filter");

    let (width, height) = (args.width(), args.height());
    if width == 0 || height == 0 {
        return Err(Box::from(format!("invalid frame size {}x{}", width, height)));
    }
    let format = PixelFormat::from(args.format);
    let mode = Mode::from(args.mode);

    let mut engine = Engine::new(EngineConfig::from(&args));
    engine.initialize();
    info!(
        "processing {} {}x{} {} frame(s) in {} mode, acceleration: {}",
        args.frames,
        width,
        height,
        format,
        mode,
        engine.is_acceleration_available()
    );

    let (tx, rx) = kanal::bounded(2);
    let source = spawn_source(&args, tx)?;

    let rgba_size = frame_size(width, height, PixelFormat::Rgba);
    let mut rgba = vec![0u8; rgba_size];
    let mut output = vec![0u8; rgba_size];
    let mut failed = 0u64;

    while let Ok(frame) = rx.recv() {
        let now = Instant::now();
        let input = to_rgba(&frame, format, width, height, &mut rgba)?;
        let convert_time = now.elapsed();

        let outcome = engine.process_frame(input, width, height, mode, &mut output);
        if !outcome.success {
            failed += 1;
            warn!("frame {}x{} {} failed", outcome.width, outcome.height, outcome.mode);
        }
        debug!(
            "convert: {:?} process: {}ms accelerated: {}",
            convert_time, outcome.processing_time_ms, outcome.accelerated
        );

        if let Some(client) = tracy_client::Client::running() {
            client.frame_mark();
        }
    }

    if source.join().is_err() {
        error!("frame source thread panicked");
    }

    let stats = engine.statistics();
    info!("{}", stats.summary(engine.is_acceleration_available()));
    if stats.fallback_frames() > 0 {
        warn!("{} frame(s) fell back to software", stats.fallback_frames());
    }
    if failed > 0 {
        warn!("{} frame(s) failed", failed);
    }

    if let Some(path) = &args.stats_json {
        stats.write_json(path, engine.is_acceleration_available())?;
    }

    if let Some(path) = &args.output {
        if stats.frames() > 0 {
            save_rgba(path, &output, width, height)?;
            info!("last frame written to {}", path.display());
        } else {
            warn!("no frame processed, {} not written", path.display());
        }
    }

    engine.release();
    Ok(())
}
