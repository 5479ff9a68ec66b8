// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::error::{Error, Result};
use core::fmt;
use std::{path::Path, str::FromStr};
use tracing::debug;

/// Raw frame layouts understood by the filter.
///
/// Only [`PixelFormat::Rgba`] reaches the transformation engine, the 4:2:0
/// layouts are converted with [`yuv420_to_rgba`] first.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// RGBA 32-bit packed format (8 bits per channel, with alpha)
    Rgba,
    /// I420 4:2:0 fully planar format (Y, U and V planes)
    I420,
    /// NV12 4:2:0 semi-planar format (Y plane, interleaved UV plane)
    Nv12,
    /// NV21 4:2:0 semi-planar format (Y plane, interleaved VU plane)
    Nv21,
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            PixelFormat::Rgba => "RGBA",
            PixelFormat::I420 => "I420",
            PixelFormat::Nv12 => "NV12",
            PixelFormat::Nv21 => "NV21",
        };
        f.write_str(name)
    }
}

impl FromStr for PixelFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rgba" => Ok(PixelFormat::Rgba),
            "i420" | "yuv420p" => Ok(PixelFormat::I420),
            "nv12" => Ok(PixelFormat::Nv12),
            "nv21" => Ok(PixelFormat::Nv21),
            _ => Err(format!("invalid pixel format: {s}. Use: rgba, i420, nv12, nv21")),
        }
    }
}

const fn chroma_dim(dim: u32) -> usize {
    (dim as usize).div_ceil(2)
}

/// Size in bytes of a tightly packed frame of the given layout.
pub const fn frame_size(width: u32, height: u32, format: PixelFormat) -> usize {
    let luma = width as usize * height as usize;
    match format {
        PixelFormat::Rgba => luma * 4,
        PixelFormat::I420 | PixelFormat::Nv12 | PixelFormat::Nv21 => {
            luma + 2 * chroma_dim(width) * chroma_dim(height)
        }
    }
}

/// Byte length of an RGBA frame, `None` when the product overflows.
pub fn rgba_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(4))
}

/// Planar 4:2:0 source frame.
///
/// One full resolution luma plane and two half resolution chroma planes,
/// each addressed through its own row stride. The chroma planes share a row
/// stride and a pixel stride, which lets the same description cover fully
/// planar (pixel stride 1) and interleaved (pixel stride 2) chroma.
#[derive(Copy, Clone, Debug)]
pub struct Yuv420<'a> {
    pub y: &'a [u8],
    pub u: &'a [u8],
    pub v: &'a [u8],
    pub y_stride: usize,
    pub uv_stride: usize,
    pub uv_pixel_stride: usize,
}

impl<'a> Yuv420<'a> {
    /// Splits a tightly packed I420 frame into its planes.
    pub fn i420(data: &'a [u8], width: u32, height: u32) -> Result<Self> {
        check_packed(data, width, height, PixelFormat::I420)?;
        let luma = width as usize * height as usize;
        let chroma = chroma_dim(width) * chroma_dim(height);
        let (y, rest) = data.split_at(luma);
        let (u, v) = rest.split_at(chroma);
        Ok(Self {
            y,
            u,
            v,
            y_stride: width as usize,
            uv_stride: chroma_dim(width),
            uv_pixel_stride: 1,
        })
    }

    /// Describes a tightly packed NV12 frame (U first in the chroma pairs).
    pub fn nv12(data: &'a [u8], width: u32, height: u32) -> Result<Self> {
        Self::semi_planar(data, width, height, PixelFormat::Nv12)
    }

    /// Describes a tightly packed NV21 frame (V first in the chroma pairs).
    pub fn nv21(data: &'a [u8], width: u32, height: u32) -> Result<Self> {
        Self::semi_planar(data, width, height, PixelFormat::Nv21)
    }

    fn semi_planar(data: &'a [u8], width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        check_packed(data, width, height, format)?;
        let luma = width as usize * height as usize;
        let (y, uv) = data.split_at(luma);
        let (u, v) = match format {
            PixelFormat::Nv21 => (&uv[1..], uv),
            _ => (uv, &uv[1..]),
        };
        Ok(Self {
            y,
            u,
            v,
            y_stride: width as usize,
            uv_stride: 2 * chroma_dim(width),
            uv_pixel_stride: 2,
        })
    }

    /// Checks that every sample the converter will read lies inside its plane.
    pub fn validate(&self, width: u32, height: u32) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let (w, h) = (width as usize, height as usize);

        let luma = (h - 1) * self.y_stride + w;
        if self.y_stride < w || self.y.len() < luma {
            return Err(Error::InvalidPlanes(format!(
                "luma plane {} bytes with stride {}, need {} for {}x{}",
                self.y.len(),
                self.y_stride,
                luma,
                width,
                height
            )));
        }

        let chroma = ((h - 1) / 2) * self.uv_stride + ((w - 1) / 2) * self.uv_pixel_stride + 1;
        for (name, plane) in [("u", self.u), ("v", self.v)] {
            if plane.len() < chroma {
                return Err(Error::InvalidPlanes(format!(
                    "{} plane {} bytes, need {} for {}x{}",
                    name,
                    plane.len(),
                    chroma,
                    width,
                    height
                )));
            }
        }
        Ok(())
    }
}

fn check_packed(data: &[u8], width: u32, height: u32, format: PixelFormat) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidDimensions { width, height });
    }
    let expected = frame_size(width, height, format);
    if data.len() < expected {
        return Err(Error::buffer_too_small("yuv", data.len(), expected));
    }
    Ok(())
}

#[inline]
fn clamp_channel(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

/// Converts a planar 4:2:0 frame into packed RGBA.
///
/// Uses the BT.601 studio swing integer transform. Chroma samples are shared
/// by each 2x2 block of luma samples and the alpha channel is always opaque.
/// Out of range strides are a caller contract violation: they are caught by
/// a debug assertion and otherwise end in a bounds panic, see
/// [`Yuv420::validate`] for a non-panicking check.
pub fn yuv420_to_rgba(src: &Yuv420, width: u32, height: u32, output: &mut [u8]) {
    debug_assert!(src.validate(width, height).is_ok());
    debug_assert!(output.len() >= frame_size(width, height, PixelFormat::Rgba));
    if width == 0 || height == 0 {
        return;
    }

    let width = width as usize;
    for (row, out_row) in output
        .chunks_exact_mut(width * 4)
        .take(height as usize)
        .enumerate()
    {
        let y_row = row * src.y_stride;
        let uv_row = (row / 2) * src.uv_stride;
        for (col, px) in out_row.chunks_exact_mut(4).enumerate() {
            let uv_index = uv_row + (col / 2) * src.uv_pixel_stride;

            let c = src.y[y_row + col] as i32 - 16;
            let d = src.u[uv_index] as i32 - 128;
            let e = src.v[uv_index] as i32 - 128;

            px[0] = clamp_channel((298 * c + 409 * e + 128) >> 8);
            px[1] = clamp_channel((298 * c - 100 * d - 208 * e + 128) >> 8);
            px[2] = clamp_channel((298 * c + 516 * d + 128) >> 8);
            px[3] = 255;
        }
    }
}

/// Allocating variant of [`yuv420_to_rgba`] for callers without a frame
/// buffer of their own.
pub fn yuv420_to_rgba_vec(src: &Yuv420, width: u32, height: u32) -> Result<Vec<u8>> {
    src.validate(width, height)?;
    let mut rgba = vec![0u8; frame_size(width, height, PixelFormat::Rgba)];
    yuv420_to_rgba(src, width, height, &mut rgba);
    Ok(rgba)
}

/// Writes an RGBA frame to disk.
///
/// The container (PNG or JPEG) is chosen from the file extension. JPEG drops
/// the alpha channel.
///
/// # Errors
///
/// Returns an error if:
/// - The pixel buffer is smaller than `width * height * 4`
/// - The extension is not a supported image format
/// - Encoding or writing the file fails
pub fn save_rgba(path: &Path, pixels: &[u8], width: u32, height: u32) -> Result<()> {
    let expected = frame_size(width, height, PixelFormat::Rgba);
    if pixels.len() < expected {
        return Err(Error::buffer_too_small("output", pixels.len(), expected));
    }

    let rgba = ::image::RgbaImage::from_raw(width, height, pixels[..expected].to_vec())
        .ok_or_else(|| Error::buffer_too_small("output", pixels.len(), expected))?;

    let is_jpeg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| matches!(ext.to_lowercase().as_str(), "jpg" | "jpeg"))
        .unwrap_or(false);

    if is_jpeg {
        ::image::DynamicImage::ImageRgba8(rgba).to_rgb8().save(path)?;
    } else {
        rgba.save(path)?;
    }
    debug!("saved {}x{} frame to {}", width, height, path.display());
    Ok(())
}
