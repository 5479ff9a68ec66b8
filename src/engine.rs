// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{
    backend::{self, Backend, EdgeParams, FallbackBackend, DEFAULT_APERTURE},
    error::{Error, Result},
    image::rgba_len,
    stats::Statistics,
};
use core::fmt;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// Frames between two periodic statistics log lines.
const STATS_LOG_INTERVAL: u64 = 100;

/// Transformation applied to a frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Copy the input unmodified
    Passthrough = 0,
    /// White edges on a black background
    EdgeDetect = 1,
    /// Luminance replicated into R, G and B
    Grayscale = 2,
}

impl Mode {
    /// Maps a boundary mode code to a mode.
    ///
    /// Unknown codes fall back to [`Mode::Passthrough`].
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Mode::Passthrough,
            1 => Mode::EdgeDetect,
            2 => Mode::Grayscale,
            _ => {
                warn!("unknown processing mode {}, using passthrough", code);
                Mode::Passthrough
            }
        }
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Mode::Passthrough => "passthrough",
            Mode::EdgeDetect => "edge",
            Mode::Grayscale => "grayscale",
        };
        f.write_str(name)
    }
}

/// Engine configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Canny hysteresis low threshold
    pub low_threshold: f64,
    /// Canny hysteresis high threshold
    pub high_threshold: f64,
    /// Gradient kernel size for the accelerated edge detector
    pub aperture: u32,
    /// Try the accelerated backend at initialization
    pub acceleration: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            low_threshold: 50.0,
            high_threshold: 150.0,
            aperture: DEFAULT_APERTURE,
            acceleration: true,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(mut self, low: f64, high: f64) -> Self {
        self.low_threshold = low;
        self.high_threshold = high;
        self
    }

    pub fn with_aperture(mut self, aperture: u32) -> Self {
        self.aperture = aperture;
        self
    }

    pub fn with_acceleration(mut self, acceleration: bool) -> Self {
        self.acceleration = acceleration;
        self
    }
}

/// Result of one [`Engine::process_frame`] call.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    /// Wall-clock time spent transforming the frame, whole milliseconds
    pub processing_time_ms: u64,
    pub width: u32,
    pub height: u32,
    pub mode: Mode,
    /// The output buffer holds a complete transformed frame
    pub success: bool,
    /// The accelerated backend produced the frame
    pub accelerated: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum State {
    Uninitialized,
    Ready,
}

/// Per-frame transformation engine.
///
/// The engine dispatches each frame by [`Mode`] onto either the accelerated
/// backend, when one was activated by [`Engine::initialize`], or the
/// [`FallbackBackend`]. A backend failure downgrades only the frame it
/// happened on. Caller owned input and output buffers are only borrowed for
/// the duration of a call.
///
/// # Thread Safety
///
/// `Engine` is `Send` but holds no internal locking; calls must be
/// serialized by the owner, one frame at a time.
///
/// # Example
///
/// ```
/// use edgefirst_filter::engine::{Engine, EngineConfig, Mode};
///
/// let mut engine = Engine::new(EngineConfig::default());
/// engine.initialize();
///
/// let input = vec![128u8; 4 * 4 * 4];
/// let mut output = vec![0u8; 4 * 4 * 4];
/// let outcome = engine.process_frame(&input, 4, 4, Mode::Grayscale, &mut output);
/// assert!(outcome.success);
/// assert_eq!(&output[..4], &[128, 128, 128, 255]);
/// ```
pub struct Engine {
    state: State,
    params: EdgeParams,
    accelerated: Option<Box<dyn Backend>>,
    available: bool,
    fallback: FallbackBackend,
    stats: Statistics,
}

impl Engine {
    /// Creates an uninitialized engine.
    ///
    /// The accelerated backend compiled into this build is used when
    /// `config.acceleration` is set; it is only checked by
    /// [`Engine::initialize`].
    pub fn new(config: EngineConfig) -> Self {
        let accelerated = if config.acceleration {
            backend::accelerated()
        } else {
            None
        };
        Self::build(config, accelerated)
    }

    /// Creates an uninitialized engine around a caller supplied accelerated
    /// backend.
    pub fn with_backend(config: EngineConfig, backend: Box<dyn Backend>) -> Self {
        Self::build(config, Some(backend))
    }

    fn build(config: EngineConfig, accelerated: Option<Box<dyn Backend>>) -> Self {
        debug!("engine created with {:?}", config);
        Self {
            state: State::Uninitialized,
            params: EdgeParams {
                low_threshold: config.low_threshold,
                high_threshold: config.high_threshold,
                aperture: config.aperture,
            },
            accelerated,
            available: false,
            fallback: FallbackBackend::new(),
            stats: Statistics::new(),
        }
    }

    /// Activates the engine, checking the accelerated backend against the
    /// configured edge parameters.
    ///
    /// A missing, failing or unsupported backend is not an error: the engine then runs
    /// every frame on the fallback. Calling this on a ready engine is a no-op
    /// and keeps the accumulated statistics. Always returns `true`.
    pub fn initialize(&mut self) -> bool {
        if self.state == State::Ready {
            warn!("engine already initialized");
            return true;
        }

        self.available = match self.accelerated.as_mut() {
            Some(backend) => match backend.check(&self.params) {
                Ok(()) => {
                    info!("{} backend initialized", backend.name());
                    true
                }
                Err(e) => {
                    error!("{} backend initialization failed: {}", backend.name(), e);
                    false
                }
            },
            None => {
                warn!("acceleration not available - using fallback implementation");
                false
            }
        };

        self.state = State::Ready;
        true
    }

    pub fn is_initialized(&self) -> bool {
        self.state == State::Ready
    }

    /// Whether the accelerated backend was activated.
    pub fn is_acceleration_available(&self) -> bool {
        self.available
    }

    fn validate(&self, input: usize, width: u32, height: u32, output: usize) -> Result<usize> {
        if self.state != State::Ready {
            return Err(Error::NotInitialized);
        }
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let expected = rgba_len(width, height).ok_or(Error::InvalidDimensions { width, height })?;
        if input < expected {
            return Err(Error::buffer_too_small("input", input, expected));
        }
        if output < expected {
            return Err(Error::buffer_too_small("output", output, expected));
        }
        Ok(expected)
    }

    /// Transforms one RGBA frame from `input` into `output`.
    ///
    /// Both buffers must hold at least `width * height * 4` bytes. On a
    /// validation failure the returned outcome has `success == false` and the
    /// output is left untouched. Successful frames are accounted in the
    /// statistics.
    #[instrument(skip_all, fields(width = width, height = height, mode = %mode))]
    pub fn process_frame(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
        mode: Mode,
        output: &mut [u8],
    ) -> Outcome {
        let mut outcome = Outcome {
            processing_time_ms: 0,
            width,
            height,
            mode,
            success: false,
            accelerated: false,
        };

        let len = match self.validate(input.len(), width, height, output.len()) {
            Ok(len) => len,
            Err(e) => {
                error!("rejected {} frame: {}", mode, e);
                return outcome;
            }
        };

        let start = Instant::now();
        let result = match mode {
            Mode::Passthrough => {
                output[..len].copy_from_slice(&input[..len]);
                Ok(false)
            }
            Mode::Grayscale | Mode::EdgeDetect => self.transform(mode, input, width, height, output),
        };
        outcome.processing_time_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(accelerated) => {
                outcome.success = true;
                outcome.accelerated = accelerated;
                self.record(outcome.processing_time_ms);
            }
            Err(e) => error!("{} frame failed: {}", mode, e),
        }
        outcome
    }

    /// Runs the accelerated backend when available, the fallback otherwise or
    /// when the backend fails on this frame. Returns whether the accelerated
    /// backend produced the output.
    fn transform(
        &mut self,
        mode: Mode,
        input: &[u8],
        width: u32,
        height: u32,
        output: &mut [u8],
    ) -> Result<bool> {
        if self.available {
            if let Some(backend) = self.accelerated.as_mut() {
                let res = match mode {
                    Mode::EdgeDetect => backend.edges(input, width, height, &self.params, output),
                    _ => backend.grayscale(input, width, height, output),
                };
                match res {
                    Ok(()) => return Ok(true),
                    Err(e) => {
                        warn!("{} {} failed, using fallback: {}", backend.name(), mode, e);
                        self.stats.record_fallback();
                    }
                }
            }
        }

        match mode {
            Mode::EdgeDetect => {
                self.fallback
                    .edges(input, width, height, &self.params, output)?
            }
            _ => self.fallback.grayscale(input, width, height, output)?,
        }
        Ok(false)
    }

    fn record(&mut self, elapsed_ms: u64) {
        self.stats.record(elapsed_ms);
        if self.stats.frames() % STATS_LOG_INTERVAL == 0 {
            debug!("statistics: {}", self.stats.summary(self.available));
        }
    }

    /// Stores new edge detection thresholds for the next edge frame.
    ///
    /// The pair is not validated, an inverted pair is accepted.
    pub fn set_thresholds(&mut self, low: f64, high: f64) -> Result<()> {
        if self.state != State::Ready {
            return Err(Error::NotInitialized);
        }
        self.params.low_threshold = low;
        self.params.high_threshold = high;
        info!("edge thresholds updated: low={:.1}, high={:.1}", low, high);
        Ok(())
    }

    pub fn edge_params(&self) -> &EdgeParams {
        &self.params
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    /// Frame count, average and last frame time, and backend availability.
    pub fn statistics_summary(&self) -> Result<String> {
        if self.state != State::Ready {
            return Err(Error::NotInitialized);
        }
        Ok(self.stats.summary(self.available))
    }

    /// Logs a final statistics snapshot and returns to the uninitialized
    /// state. No-op when not initialized.
    pub fn release(&mut self) {
        if self.state == State::Ready {
            info!("releasing engine");
            info!("final statistics: {}", self.stats.summary(self.available));
            self.state = State::Uninitialized;
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.release();
        debug!("engine destroyed");
    }
}
