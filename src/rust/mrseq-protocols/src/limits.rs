// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

/// Gyromagnetic ratio of hydrogen, rad/ms/mT.
pub const GAMMA: f64 = 42.577_478_92 * 2.0 * std::f64::consts::PI;

/// Hardware figures used to size gradient and RF waveforms.
///
/// These are not enforced; they only determine ramp times, minimum
/// durations and RF sampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradientLimits {
    /// Peak amplitude of the gradient system, mT/m
    pub grad_max: f64,
    /// Amplitude used when sizing gradients by area, mT/m
    pub grad_lim: f64,
    /// Ramp time of a gradient from zero to any amplitude, ms
    pub rise_time: f64,
    /// RF waveform raster, ms
    pub dwell: f64,
}

impl Default for GradientLimits {
    fn default() -> Self {
        Self {
            grad_max: 750.0,
            grad_lim: 400.0,
            rise_time: 0.200,
            dwell: 0.004,
        }
    }
}
