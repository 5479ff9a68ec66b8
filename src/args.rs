// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use clap::Parser;
use edgefirst_filter::{
    engine::{EngineConfig, Mode},
    image::PixelFormat,
};
use std::path::PathBuf;

/// Frame transformation selection.
#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Copy)]
pub enum ModeSetting {
    /// Forward frames unmodified
    Passthrough,
    /// White edges on a black background
    Edge,
    /// Luminance only
    Grayscale,
}

impl From<ModeSetting> for Mode {
    fn from(setting: ModeSetting) -> Self {
        match setting {
            ModeSetting::Passthrough => Mode::Passthrough,
            ModeSetting::Edge => Mode::EdgeDetect,
            ModeSetting::Grayscale => Mode::Grayscale,
        }
    }
}

/// Raw input frame layouts.
#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Copy)]
pub enum FormatSetting {
    /// Packed RGBA, 4 bytes per pixel
    Rgba,
    /// Planar 4:2:0, Y then U then V
    I420,
    /// Semi-planar 4:2:0, Y then interleaved UV
    Nv12,
    /// Semi-planar 4:2:0, Y then interleaved VU
    Nv21,
}

impl From<FormatSetting> for PixelFormat {
    fn from(setting: FormatSetting) -> Self {
        match setting {
            FormatSetting::Rgba => PixelFormat::Rgba,
            FormatSetting::I420 => PixelFormat::I420,
            FormatSetting::Nv12 => PixelFormat::Nv12,
            FormatSetting::Nv21 => PixelFormat::Nv21,
        }
    }
}

/// Command-line arguments for the EdgeFirst Camera Frame Filter.
///
/// Arguments can be specified via command line or environment variables.
///
/// # Example
///
/// ```bash
/// # Edge detection on a raw NV12 capture, save the last frame
/// edgefirst-filter --input capture.nv12 --format nv12 --size 1920 1080 \
///     --mode edge --output edges.png
///
/// # Synthetic pattern via environment variables
/// export MODE=grayscale
/// export FRAMES=300
/// edgefirst-filter
/// ```
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Raw input frame file, a synthetic test pattern is used when omitted
    #[arg(short, long, env = "INPUT")]
    pub input: Option<PathBuf>,

    /// Pixel layout of the input file
    #[arg(long, env = "FORMAT", default_value = "rgba", value_enum)]
    pub format: FormatSetting,

    /// Frame resolution in pixels (width height)
    #[arg(
        short,
        long,
        env = "SIZE",
        default_value = "640 480",
        value_delimiter = ' ',
        num_args = 2
    )]
    pub size: Vec<u32>,

    /// Frame transformation
    #[arg(short, long, env = "MODE", default_value = "edge", value_enum)]
    pub mode: ModeSetting,

    /// Number of frames to process
    #[arg(long, env = "FRAMES", default_value = "100")]
    pub frames: u64,

    /// Source frame rate limit, 0 to run unthrottled
    #[arg(long, env = "FPS", default_value = "30")]
    pub fps: u32,

    /// Edge detection hysteresis low threshold
    #[arg(long, env = "LOW_THRESHOLD", default_value = "50.0")]
    pub low_threshold: f64,

    /// Edge detection hysteresis high threshold
    #[arg(long, env = "HIGH_THRESHOLD", default_value = "150.0")]
    pub high_threshold: f64,

    /// Edge detection gradient aperture
    #[arg(long, env = "APERTURE", default_value = "3", value_parser = clap::value_parser!(u32).range(3..=7))]
    pub aperture: u32,

    /// Disable the accelerated backend and use the software fallback
    #[arg(long, env = "NO_ACCEL")]
    pub no_accel: bool,

    /// Save the last processed frame (PNG or JPEG by extension)
    #[arg(short, long, env = "OUTPUT")]
    pub output: Option<PathBuf>,

    /// Write a JSON statistics snapshot on exit
    #[arg(long, env = "STATS_JSON")]
    pub stats_json: Option<PathBuf>,

    /// Enable verbose debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Enable Tracy profiler for performance analysis
    #[arg(long, env = "TRACY")]
    pub tracy: bool,
}

impl Args {
    pub fn width(&self) -> u32 {
        self.size[0]
    }

    pub fn height(&self) -> u32 {
        self.size[1]
    }
}

impl From<&Args> for EngineConfig {
    fn from(args: &Args) -> Self {
        EngineConfig::new()
            .with_thresholds(args.low_threshold, args.high_threshold)
            .with_aperture(args.aperture)
            .with_acceleration(!args.no_accel)
    }
}
