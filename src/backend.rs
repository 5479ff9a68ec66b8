// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Processing strategies behind the transformation engine.
//!
//! The engine drives every non-trivial mode through a [`Backend`]. The
//! [`FallbackBackend`] is always available and is built on the kernels in
//! [`crate::pixel`]. When the `accel` feature is enabled the
//! [`ImageprocBackend`] wraps the `imageproc` vision library; the engine
//! checks it once at initialization against the configured [`EdgeParams`]
//! and drops back to the fallback for any single frame it fails on.

use crate::{error::Result, pixel};
use tracing::trace;

/// Standard deviation of the Gaussian smoothing ahead of edge extraction.
pub const BLUR_SIGMA: f32 = 1.5;

/// Gradient aperture supported by the accelerated edge detector.
pub const DEFAULT_APERTURE: u32 = 3;

/// Parameters of the accelerated edge detector.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct EdgeParams {
    /// Hysteresis low threshold
    pub low_threshold: f64,
    /// Hysteresis high threshold
    pub high_threshold: f64,
    /// Gradient kernel size
    pub aperture: u32,
}

impl Default for EdgeParams {
    fn default() -> Self {
        Self {
            low_threshold: 50.0,
            high_threshold: 150.0,
            aperture: DEFAULT_APERTURE,
        }
    }
}

/// A strategy able to run the grayscale and edge detection transforms.
///
/// Implementations read `width * height * 4` bytes of RGBA input and must
/// either fill `width * height * 4` bytes of RGBA output or return an error
/// without having touched the output. Callers guarantee both buffers are at
/// least that long.
pub trait Backend: Send {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Runs a trivial workload to confirm the backend is usable with the
    /// engine's edge parameters.
    fn check(&mut self, params: &EdgeParams) -> Result<()>;

    /// Luminance in R, G and B, opaque alpha.
    fn grayscale(&mut self, input: &[u8], width: u32, height: u32, output: &mut [u8])
        -> Result<()>;

    /// Binary edge map replicated into R, G and B, opaque alpha.
    fn edges(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
        params: &EdgeParams,
        output: &mut [u8],
    ) -> Result<()>;
}

/// Pure Rust strategy built on the pixel kernels.
///
/// Edge detection ignores [`EdgeParams`]: it is a Sobel gradient binarized at
/// [`pixel::EDGE_THRESHOLD`]. The scratch planes are kept between frames.
#[derive(Debug, Default)]
pub struct FallbackBackend {
    gray: Vec<u8>,
    edges: Vec<u8>,
}

impl FallbackBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for FallbackBackend {
    fn name(&self) -> &'static str {
        "fallback"
    }

    fn check(&mut self, _params: &EdgeParams) -> Result<()> {
        Ok(())
    }

    fn grayscale(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
        output: &mut [u8],
    ) -> Result<()> {
        pixel::grayscale_rgba(input, width, height, output);
        Ok(())
    }

    fn edges(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
        _params: &EdgeParams,
        output: &mut [u8],
    ) -> Result<()> {
        let pixels = width as usize * height as usize;
        self.gray.resize(pixels, 0);
        self.edges.resize(pixels, 0);

        pixel::gray_plane(input, width, height, &mut self.gray);
        pixel::sobel_edges(&self.gray, width, height, &mut self.edges);
        pixel::expand_gray(&self.edges, width, height, output);
        trace!("fallback edges {}x{}", width, height);
        Ok(())
    }
}

#[cfg(feature = "accel")]
pub use accel::ImageprocBackend;

#[cfg(feature = "accel")]
mod accel {
    use super::{Backend, EdgeParams, BLUR_SIGMA, DEFAULT_APERTURE};
    use crate::{
        error::{Error, Result},
        pixel,
    };
    use ::image::{GrayImage, ImageBuffer, Luma, Rgba};
    use imageproc::{edges::canny, filter::gaussian_blur_f32};
    use std::{
        any::Any,
        panic::{self, AssertUnwindSafe},
    };
    use tracing::trace;

    /// Strategy backed by the `imageproc` vision library.
    ///
    /// Gray values come from the same integer BT.601 weights as the fallback
    /// (the `image` crate's own luma conversion uses Rec. 709 weights), so
    /// both strategies agree on them. Edge detection is Gaussian smoothing
    /// followed by Canny hysteresis and only supports a 3x3 aperture. Panics raised inside the library are
    /// caught and reported as [`Error::Backend`].
    #[derive(Debug, Default)]
    pub struct ImageprocBackend;

    impl ImageprocBackend {
        pub fn new() -> Self {
            Self
        }
    }

    fn panic_message(payload: &(dyn Any + Send)) -> &str {
        if let Some(msg) = payload.downcast_ref::<&str>() {
            *msg
        } else if let Some(msg) = payload.downcast_ref::<String>() {
            msg.as_str()
        } else {
            "unknown panic"
        }
    }

    fn guarded<T>(stage: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
        match panic::catch_unwind(AssertUnwindSafe(f)) {
            Ok(res) => res,
            Err(payload) => Err(Error::Backend(format!(
                "{} panicked: {}",
                stage,
                panic_message(payload.as_ref())
            ))),
        }
    }

    fn gray_image(input: &[u8], width: u32, height: u32) -> Result<GrayImage> {
        let len = width as usize * height as usize * 4;
        let rgba = ImageBuffer::<Rgba<u8>, &[u8]>::from_raw(width, height, &input[..len])
            .ok_or_else(|| Error::Backend(format!("cannot wrap {}x{} RGBA input", width, height)))?;

        Ok(GrayImage::from_fn(width, height, |x, y| {
            let px = rgba.get_pixel(x, y);
            Luma([pixel::rgba_to_gray(px[0], px[1], px[2])])
        }))
    }

    impl Backend for ImageprocBackend {
        fn name(&self) -> &'static str {
            "imageproc"
        }

        fn check(&mut self, params: &EdgeParams) -> Result<()> {
            if params.aperture != DEFAULT_APERTURE {
                return Err(Error::BackendUnavailable(format!(
                    "aperture {} not supported, only {}",
                    params.aperture, DEFAULT_APERTURE
                )));
            }

            let input = [0u8; 8 * 8 * 4];
            let mut output = [0u8; 8 * 8 * 4];
            self.edges(&input, 8, 8, params, &mut output)?;
            if output.chunks_exact(4).any(|px| *px != [0, 0, 0, 255]) {
                return Err(Error::BackendUnavailable(
                    "edges found on an empty frame".to_string(),
                ));
            }
            Ok(())
        }

        /// The library has no faster luma path than the integer kernel, so
        /// grayscale runs [`pixel::grayscale_rgba`] directly.
        fn grayscale(
            &mut self,
            input: &[u8],
            width: u32,
            height: u32,
            output: &mut [u8],
        ) -> Result<()> {
            pixel::grayscale_rgba(input, width, height, output);
            Ok(())
        }

        fn edges(
            &mut self,
            input: &[u8],
            width: u32,
            height: u32,
            params: &EdgeParams,
            output: &mut [u8],
        ) -> Result<()> {
            if params.aperture != DEFAULT_APERTURE {
                return Err(Error::Backend(format!(
                    "aperture {} not supported, only {}",
                    params.aperture, DEFAULT_APERTURE
                )));
            }

            // Canny requires low <= high, an inverted pair is swapped.
            let (low, high) = if params.low_threshold <= params.high_threshold {
                (params.low_threshold, params.high_threshold)
            } else {
                (params.high_threshold, params.low_threshold)
            };

            let edges = guarded("canny", || {
                let gray = gray_image(input, width, height)?;
                let blurred = gaussian_blur_f32(&gray, BLUR_SIGMA);
                Ok(canny(&blurred, low as f32, high as f32))
            })?;
            pixel::expand_gray(edges.as_raw(), width, height, output);
            trace!("imageproc edges {}x{} low={} high={}", width, height, low, high);
            Ok(())
        }
    }
}

/// The accelerated strategy compiled into this build, if any.
pub fn accelerated() -> Option<Box<dyn Backend>> {
    #[cfg(feature = "accel")]
    {
        Some(Box::new(ImageprocBackend::new()))
    }
    #[cfg(not(feature = "accel"))]
    {
        None
    }
}
