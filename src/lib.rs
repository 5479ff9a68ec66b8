// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! # EdgeFirst Camera Frame Filter Library
//!
//! This library provides the per-frame image transformation engine used by
//! the EdgeFirst camera frame filter. It converts raw camera frames to RGBA,
//! applies a selected transform and reports per-frame timing.
//!
//! ## Features
//!
//! - **Color Conversion**: BT.601 integer conversion of 4:2:0 planar and
//!   semi-planar camera frames (I420, NV12, NV21) into packed RGBA.
//! - **Frame Transforms**: passthrough, grayscale and edge detection on
//!   caller owned RGBA buffers, with running timing statistics.
//! - **Acceleration**: Gaussian smoothing and Canny edge detection through
//!   the `imageproc` library (`accel` feature), with a Sobel based software
//!   fallback that is used whenever the backend is unavailable or fails.
//! - **Host Boundary**: a legacy single-number calling convention for hosts
//!   that marshal optional buffers.
//!
//! ## Example
//!
//! ```
//! use edgefirst_filter::{
//!     engine::{Engine, EngineConfig, Mode},
//!     image::{yuv420_to_rgba_vec, Yuv420, frame_size, PixelFormat},
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let (width, height) = (64, 48);
//!
//! // Convert a camera NV12 frame to RGBA
//! let nv12 = vec![128u8; frame_size(width, height, PixelFormat::Nv12)];
//! let rgba = yuv420_to_rgba_vec(&Yuv420::nv12(&nv12, width, height)?, width, height)?;
//!
//! // Extract edges into a caller owned buffer
//! let mut engine = Engine::new(EngineConfig::default());
//! engine.initialize();
//! let mut edges = vec![0u8; rgba.len()];
//! let outcome = engine.process_frame(&rgba, width, height, Mode::EdgeDetect, &mut edges);
//! assert!(outcome.success);
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod bridge;
pub mod engine;
pub mod error;
pub mod image;
pub mod pixel;
pub mod stats;

pub use error::{Error, Result};
