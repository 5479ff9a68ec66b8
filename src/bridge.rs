// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Host boundary with the legacy calling convention.
//!
//! Host runtimes hand over optional buffers and signed dimensions and expect
//! a single number back: the elapsed milliseconds, or [`ERROR_SENTINEL`]
//! when the call was rejected. [`Bridge`] owns at most one [`Engine`] and
//! maps those conventions onto it; nothing here panics on bad input.

use crate::{
    engine::{Engine, EngineConfig, Mode},
    image::{rgba_len, yuv420_to_rgba, Yuv420},
};
use tracing::{error, info, warn};

/// Returned by the frame calls when the frame was not processed.
pub const ERROR_SENTINEL: i64 = -1;

/// Summary returned while no engine is active.
pub const NOT_INITIALIZED: &str = "Processor not initialized";

/// Pixel layout of a host bitmap surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BitmapFormat {
    Rgba8888,
    Rgb565,
    Rgba4444,
    Alpha8,
    Other(i32),
}

/// Geometry and layout of a locked host bitmap.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BitmapInfo {
    pub width: u32,
    pub height: u32,
    pub format: BitmapFormat,
}

/// Owner of the single active engine behind the host boundary.
///
/// `init_engine` is idempotent and `release_engine` is safe to call without
/// a prior initialization.
pub struct Bridge {
    config: EngineConfig,
    engine: Option<Engine>,
}

fn dimension(value: i32) -> Option<u32> {
    if value > 0 {
        Some(value as u32)
    } else {
        None
    }
}

fn stride(value: i32) -> Option<usize> {
    usize::try_from(value).ok()
}

impl Bridge {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            engine: None,
        }
    }

    /// Creates and initializes the engine unless one is already active.
    pub fn init_engine(&mut self) -> bool {
        info!("initializing frame engine");
        if self.engine.is_some() {
            warn!("frame engine already initialized");
            return true;
        }

        let mut engine = Engine::new(self.config.clone());
        if !engine.initialize() {
            error!("failed to initialize frame engine");
            return false;
        }
        if engine.is_acceleration_available() {
            info!("acceleration backend available and ready");
        } else {
            warn!("acceleration backend not available - using fallback implementation");
        }
        self.engine = Some(engine);
        true
    }

    pub fn is_acceleration_available(&self) -> bool {
        self.engine
            .as_ref()
            .map(|engine| engine.is_acceleration_available())
            .unwrap_or(false)
    }

    /// Processes one RGBA frame.
    ///
    /// `mode` is 0 (passthrough), 1 (edge detection) or 2 (grayscale); any
    /// other code is treated as passthrough. Returns the elapsed milliseconds
    /// or [`ERROR_SENTINEL`] when the engine is not initialized, a buffer is
    /// missing or smaller than `width * height * 4`, or the dimensions are
    /// not positive. The output is untouched on rejection.
    pub fn process_frame(
        &mut self,
        input: Option<&[u8]>,
        width: i32,
        height: i32,
        mode: i32,
        output: Option<&mut [u8]>,
    ) -> i64 {
        let Some(engine) = self.engine.as_mut() else {
            error!("frame engine not initialized");
            return ERROR_SENTINEL;
        };
        let (Some(input), Some(output)) = (input, output) else {
            error!("input or output buffer is missing");
            return ERROR_SENTINEL;
        };
        let (Some(w), Some(h)) = (dimension(width), dimension(height)) else {
            error!("invalid dimensions: {}x{}", width, height);
            return ERROR_SENTINEL;
        };
        let Some(expected) = rgba_len(w, h) else {
            error!("frame too large: {}x{}", width, height);
            return ERROR_SENTINEL;
        };
        if input.len() < expected {
            error!("input buffer too small: {}, expected: {}", input.len(), expected);
            return ERROR_SENTINEL;
        }
        if output.len() < expected {
            error!("output buffer too small: {}, expected: {}", output.len(), expected);
            return ERROR_SENTINEL;
        }

        let outcome = engine.process_frame(input, w, h, Mode::from_code(mode), output);
        if !outcome.success {
            error!("frame processing failed");
            return ERROR_SENTINEL;
        }
        outcome.processing_time_ms as i64
    }

    /// Processes a locked RGBA_8888 bitmap into another one of the same size.
    ///
    /// Same return convention as [`Bridge::process_frame`]; bitmaps in any
    /// other pixel format, or with differing dimensions, are rejected.
    pub fn process_bitmap(
        &mut self,
        input: Option<(&BitmapInfo, &[u8])>,
        mode: i32,
        output: Option<(&BitmapInfo, &mut [u8])>,
    ) -> i64 {
        if self.engine.is_none() {
            error!("frame engine not initialized");
            return ERROR_SENTINEL;
        }
        let (Some((input_info, input)), Some((output_info, output))) = (input, output) else {
            error!("input or output bitmap is missing");
            return ERROR_SENTINEL;
        };

        for (name, info) in [("input", input_info), ("output", output_info)] {
            if info.format != BitmapFormat::Rgba8888 {
                error!("{} bitmap format not supported: {:?}", name, info.format);
                return ERROR_SENTINEL;
            }
        }
        if input_info.width != output_info.width || input_info.height != output_info.height {
            error!(
                "bitmap size mismatch: {}x{} -> {}x{}",
                input_info.width, input_info.height, output_info.width, output_info.height
            );
            return ERROR_SENTINEL;
        }

        let (Ok(width), Ok(height)) = (
            i32::try_from(input_info.width),
            i32::try_from(input_info.height),
        ) else {
            error!("bitmap too large: {}x{}", input_info.width, input_info.height);
            return ERROR_SENTINEL;
        };
        self.process_frame(Some(input), width, height, mode, Some(output))
    }

    /// Converts a planar 4:2:0 camera frame into RGBA.
    ///
    /// Does nothing when a plane or the output is missing, or when the
    /// strides and plane sizes cannot cover a `width` x `height` frame. Does
    /// not require an initialized engine.
    #[allow(clippy::too_many_arguments)]
    pub fn yuv420_to_rgba(
        &self,
        y_plane: Option<&[u8]>,
        u_plane: Option<&[u8]>,
        v_plane: Option<&[u8]>,
        width: i32,
        height: i32,
        y_row_stride: i32,
        uv_row_stride: i32,
        uv_pixel_stride: i32,
        output: Option<&mut [u8]>,
    ) {
        let (Some(y), Some(u), Some(v), Some(output)) = (y_plane, u_plane, v_plane, output) else {
            error!("missing YUV plane or output buffer");
            return;
        };
        let (Some(w), Some(h)) = (dimension(width), dimension(height)) else {
            error!("invalid dimensions: {}x{}", width, height);
            return;
        };
        let (Some(y_stride), Some(uv_stride), Some(uv_pixel_stride)) = (
            stride(y_row_stride),
            stride(uv_row_stride),
            stride(uv_pixel_stride),
        ) else {
            error!(
                "invalid strides: y={} uv={} uv_pixel={}",
                y_row_stride, uv_row_stride, uv_pixel_stride
            );
            return;
        };

        let src = Yuv420 {
            y,
            u,
            v,
            y_stride,
            uv_stride,
            uv_pixel_stride,
        };
        if let Err(e) = src.validate(w, h) {
            error!("rejected YUV frame: {}", e);
            return;
        }
        match rgba_len(w, h) {
            Some(expected) if output.len() >= expected => yuv420_to_rgba(&src, w, h, output),
            _ => error!("output buffer too small: {} for {}x{}", output.len(), w, h),
        }
    }

    /// Updates the edge thresholds, no-op without an active engine.
    pub fn set_thresholds(&mut self, low: f64, high: f64) {
        match self.engine.as_mut().map(|engine| engine.set_thresholds(low, high)) {
            Some(Ok(())) => {}
            Some(Err(e)) => error!("cannot set thresholds: {}", e),
            None => error!("frame engine not initialized"),
        }
    }

    pub fn statistics(&self) -> String {
        self.engine
            .as_ref()
            .and_then(|engine| engine.statistics_summary().ok())
            .unwrap_or_else(|| NOT_INITIALIZED.to_string())
    }

    /// Releases and destroys the active engine, if any.
    pub fn release_engine(&mut self) {
        info!("releasing frame engine");
        if let Some(mut engine) = self.engine.take() {
            engine.release();
            info!("frame engine released");
        }
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}
