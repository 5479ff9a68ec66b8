// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Stateless pixel kernels used by the fallback strategy.
//!
//! All buffers are tightly packed and row-major. RGBA buffers carry four bytes
//! per pixel, gray and edge planes carry one. Callers provide the output
//! buffers; nothing here allocates.

/// Binarization level applied to the Sobel gradient magnitude.
pub const EDGE_THRESHOLD: u8 = 50;

const SOBEL_X: [[i32; 3]; 3] = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];
const SOBEL_Y: [[i32; 3]; 3] = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Weighted BT.601 luminance, truncated to 8 bits.
///
/// Computes `floor(0.299 * r + 0.587 * g + 0.114 * b)` with integer math so
/// that neutral inputs map back onto themselves exactly.
#[inline]
pub fn rgba_to_gray(r: u8, g: u8, b: u8) -> u8 {
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000) as u8
}

/// Reduces an RGBA frame to a single-channel luminance plane.
pub fn gray_plane(rgba: &[u8], width: u32, height: u32, gray: &mut [u8]) {
    let pixels = width as usize * height as usize;
    debug_assert!(rgba.len() >= pixels * 4);
    debug_assert!(gray.len() >= pixels);

    for (px, out) in rgba.chunks_exact(4).zip(gray.iter_mut()).take(pixels) {
        *out = rgba_to_gray(px[0], px[1], px[2]);
    }
}

/// Replicates a single-channel plane into R, G and B with an opaque alpha.
pub fn expand_gray(gray: &[u8], width: u32, height: u32, rgba: &mut [u8]) {
    let pixels = width as usize * height as usize;
    debug_assert!(gray.len() >= pixels);
    debug_assert!(rgba.len() >= pixels * 4);

    for (value, px) in gray.iter().zip(rgba.chunks_exact_mut(4)).take(pixels) {
        px[0] = *value;
        px[1] = *value;
        px[2] = *value;
        px[3] = 255;
    }
}

/// Grayscale conversion of an RGBA frame into an RGBA frame.
///
/// Every output pixel holds the luminance of the input pixel in R, G and B
/// and a fully opaque alpha.
pub fn grayscale_rgba(input: &[u8], width: u32, height: u32, output: &mut [u8]) {
    let pixels = width as usize * height as usize;
    debug_assert!(input.len() >= pixels * 4);
    debug_assert!(output.len() >= pixels * 4);

    for (src, dst) in input
        .chunks_exact(4)
        .zip(output.chunks_exact_mut(4))
        .take(pixels)
    {
        let gray = rgba_to_gray(src[0], src[1], src[2]);
        dst[0] = gray;
        dst[1] = gray;
        dst[2] = gray;
        dst[3] = 255;
    }
}

/// Binary Sobel edge map of a grayscale plane.
///
/// The 3x3 Sobel X and Y kernels are evaluated over interior pixels only; the
/// one pixel border ring is left at zero. The gradient magnitude is rounded,
/// clipped to 255 and then binarized against [`EDGE_THRESHOLD`], so every
/// output byte is either 0 or 255. Images narrower or shorter than three
/// pixels produce an all-zero map.
pub fn sobel_edges(gray: &[u8], width: u32, height: u32, output: &mut [u8]) {
    let width = width as usize;
    let height = height as usize;
    let pixels = width * height;
    debug_assert!(gray.len() >= pixels);
    debug_assert!(output.len() >= pixels);

    output[..pixels].fill(0);
    if width < 3 || height < 3 {
        return;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut gx = 0i32;
            let mut gy = 0i32;
            for (ky, (row_x, row_y)) in SOBEL_X.iter().zip(SOBEL_Y.iter()).enumerate() {
                let row = (y + ky - 1) * width;
                for kx in 0..3 {
                    let pixel = gray[row + x + kx - 1] as i32;
                    gx += pixel * row_x[kx];
                    gy += pixel * row_y[kx];
                }
            }

            let magnitude = ((gx * gx + gy * gy) as f32).sqrt().round().min(255.0) as u8;
            output[y * width + x] = magnitude;
        }
    }

    let edges = &mut output[..pixels];
    for value in edges.iter_mut() {
        *value = if *value > EDGE_THRESHOLD { 255 } else { 0 };
    }
}

/// Binarizes a single-channel plane: values above `threshold` become 255,
/// everything else 0.
pub fn apply_threshold(input: &[u8], width: u32, height: u32, threshold: u8, output: &mut [u8]) {
    let pixels = width as usize * height as usize;
    debug_assert!(input.len() >= pixels);
    debug_assert!(output.len() >= pixels);

    for (src, dst) in input.iter().zip(output.iter_mut()).take(pixels) {
        *dst = if *src > threshold { 255 } else { 0 };
    }
}
