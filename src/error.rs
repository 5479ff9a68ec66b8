// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! Error types for the frame filter.

use thiserror::Error;

/// Main error type for frame filter operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("engine not initialized")]
    NotInitialized,

    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("{buffer} buffer too small: {actual} bytes, expected {expected}")]
    BufferTooSmall {
        buffer: &'static str,
        actual: usize,
        expected: usize,
    },

    #[error("invalid YUV planes: {0}")]
    InvalidPlanes(String),

    #[error("acceleration backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("acceleration backend failed: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("image error: {0}")]
    Image(#[from] ::image::ImageError),
}

/// Result type alias using the frame filter's Error
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn buffer_too_small(buffer: &'static str, actual: usize, expected: usize) -> Self {
        Error::BufferTooSmall {
            buffer,
            actual,
            expected,
        }
    }
}
