// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::error::Result;
use core::fmt;
use serde_json::{json, Value};
use std::{fs, path::Path};
use tracing::info;

/// Running per-frame timing counters owned by the engine.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Statistics {
    frames: u64,
    total_ms: u64,
    last_ms: u64,
    fallback_frames: u64,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accounts one processed frame.
    pub fn record(&mut self, elapsed_ms: u64) {
        self.frames += 1;
        self.total_ms += elapsed_ms;
        self.last_ms = elapsed_ms;
    }

    /// Accounts a frame the accelerated backend failed on.
    pub fn record_fallback(&mut self) {
        self.fallback_frames += 1;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }

    pub fn last_ms(&self) -> u64 {
        self.last_ms
    }

    pub fn fallback_frames(&self) -> u64 {
        self.fallback_frames
    }

    /// Mean processing time in milliseconds, 0 before the first frame.
    pub fn average_ms(&self) -> f64 {
        if self.frames == 0 {
            return 0.0;
        }
        self.total_ms as f64 / self.frames as f64
    }

    /// Human readable summary including backend availability.
    pub fn summary(&self, accelerated: bool) -> String {
        format!(
            "{}, Acceleration: {}",
            self,
            if accelerated { "Yes" } else { "No" }
        )
    }

    pub fn to_json(&self, accelerated: bool) -> Value {
        json!({
            "frames": self.frames,
            "total_ms": self.total_ms,
            "average_ms": self.average_ms(),
            "last_ms": self.last_ms,
            "fallback_frames": self.fallback_frames,
            "acceleration": accelerated,
        })
    }

    /// Writes the [`Statistics::to_json`] snapshot to `path`, pretty printed.
    pub fn write_json(&self, path: &Path, accelerated: bool) -> Result<()> {
        let text = serde_json::to_string_pretty(&self.to_json(accelerated))?;
        fs::write(path, text)?;
        info!("statistics written to {}", path.display());
        Ok(())
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Frames: {}, Avg Time: {:.2}ms, Last Time: {}ms",
            self.frames,
            self.average_ms(),
            self.last_ms
        )
    }
}
