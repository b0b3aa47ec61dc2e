// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Debug;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::parameter_resolver::ParameterResolver;
use crate::parameters::require;
use crate::timing::Timing;

/// Logical gradient axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    #[serde(rename = "R")]
    Read,
    #[serde(rename = "P")]
    Phase,
    #[serde(rename = "S")]
    Slice,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Read, Axis::Phase, Axis::Slice];

    pub fn label(&self) -> &'static str {
        match self {
            Axis::Read => "R",
            Axis::Phase => "P",
            Axis::Slice => "S",
        }
    }
}

/// Local waveform of a leaf: sample instants relative to the leaf start and values.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Samples {
    pub time: Vec<f64>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RfSamples {
    pub time: Vec<f64>,
    /// B1 amplitude, kHz
    pub amplitude: Vec<f64>,
    pub phase: Vec<f64>,
}

/// Waveform-producing capability of a gradient leaf.
///
/// The physics of a shape (trapezoid, ramp, ...) lives in the implementor;
/// the sequence engine only places and iterates it.
pub trait GradientShape: Debug + Send + Sync {
    fn duration(&self) -> f64;

    fn axis(&self) -> Axis;

    /// Sample the waveform for the iteration state in `parameters`.
    fn waveform(&self, parameters: &ParameterResolver) -> Result<Samples>;
}

/// Waveform-producing capability of an RF leaf.
pub trait RfShape: Debug + Send + Sync {
    fn duration(&self) -> f64;

    fn waveform(&self, parameters: &ParameterResolver) -> Result<RfSamples>;
}

#[derive(Debug, Clone)]
pub struct Gradient {
    shape: Arc<dyn GradientShape>,
    anchor: f64,
    time: f64,
}

impl Gradient {
    pub fn new(shape: impl GradientShape + 'static) -> Self {
        Self::from_shared(Arc::new(shape))
    }

    pub fn from_shared(shape: Arc<dyn GradientShape>) -> Self {
        Self {
            shape,
            anchor: 0.0,
            time: 0.0,
        }
    }

    pub fn with_anchor(mut self, anchor: f64) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    pub fn shape(&self) -> &dyn GradientShape {
        self.shape.as_ref()
    }

    pub fn axis(&self) -> Axis {
        self.shape.axis()
    }

    pub fn timing(&self) -> Timing {
        Timing::new(self.shape.duration(), self.anchor, self.time)
    }

    pub fn waveform(&self, parameters: &ParameterResolver) -> Result<Samples> {
        self.shape.waveform(parameters)
    }
}

impl PartialEq for Gradient {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shape, &other.shape)
            && self.anchor == other.anchor
            && self.time == other.time
    }
}

/// An RF pulse leaf. The anchor defaults to the pulse center.
#[derive(Debug, Clone)]
pub struct RfPulse {
    shape: Arc<dyn RfShape>,
    anchor: f64,
    time: f64,
    phase_cycle: Vec<f64>,
    dfdz: Option<f64>,
}

impl RfPulse {
    pub fn new(shape: impl RfShape + 'static) -> Self {
        Self::from_shared(Arc::new(shape))
    }

    pub fn from_shared(shape: Arc<dyn RfShape>) -> Self {
        let anchor = shape.duration() / 2.0;
        Self {
            shape,
            anchor,
            time: 0.0,
            phase_cycle: vec![0.0],
            dfdz: None,
        }
    }

    pub fn with_anchor(mut self, anchor: f64) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    pub fn with_phase_cycle(mut self, phase_cycle: Vec<f64>) -> Self {
        self.phase_cycle = phase_cycle;
        self
    }

    /// Frequency offset per unit position (kHz/mm) of a slice-selective pulse.
    pub fn with_dfdz(mut self, dfdz: f64) -> Self {
        self.dfdz = Some(dfdz);
        self
    }

    pub fn shape(&self) -> &dyn RfShape {
        self.shape.as_ref()
    }

    pub fn phase_cycle(&self) -> &[f64] {
        &self.phase_cycle
    }

    pub fn dfdz(&self) -> Option<f64> {
        self.dfdz
    }

    pub fn timing(&self) -> Timing {
        Timing::new(self.shape.duration(), self.anchor, self.time)
    }

    pub fn waveform(&self, parameters: &ParameterResolver) -> Result<RfSamples> {
        self.shape.waveform(parameters)
    }
}

impl PartialEq for RfPulse {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shape, &other.shape)
            && self.anchor == other.anchor
            && self.time == other.time
            && self.phase_cycle == other.phase_cycle
            && self.dfdz == other.dfdz
    }
}

/// A data acquisition window of `npoints` samples spaced by `dwell`.
#[derive(Debug, Clone, PartialEq)]
pub struct Acquisition {
    npoints: usize,
    dwell: f64,
    dur: f64,
    anchor: f64,
    time: f64,
    phase_cycle: Vec<f64>,
    dfdz: Option<f64>,
}

impl Acquisition {
    pub fn builder() -> AcquisitionBuilder {
        AcquisitionBuilder::default()
    }

    pub fn npoints(&self) -> usize {
        self.npoints
    }

    pub fn dwell(&self) -> f64 {
        self.dwell
    }

    pub fn phase_cycle(&self) -> &[f64] {
        &self.phase_cycle
    }

    pub fn dfdz(&self) -> Option<f64> {
        self.dfdz
    }

    pub fn timing(&self) -> Timing {
        Timing::new(self.dur, self.anchor, self.time)
    }

    pub fn with_time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    pub fn with_anchor(mut self, anchor: f64) -> Self {
        self.anchor = anchor;
        self
    }

    /// Sample instants of the window; the values are all zero.
    pub fn waveform(&self) -> Samples {
        Samples {
            time: (0..self.npoints).map(|k| k as f64 * self.dwell).collect(),
            values: vec![0.0; self.npoints],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AcquisitionBuilder {
    npoints: Option<usize>,
    dwell: Option<f64>,
    anchor: Option<f64>,
    time: f64,
    phase_cycle: Option<Vec<f64>>,
    dfdz: Option<f64>,
}

impl AcquisitionBuilder {
    pub fn npoints(mut self, npoints: usize) -> Self {
        self.npoints = Some(npoints);
        self
    }

    pub fn dwell(mut self, dwell: f64) -> Self {
        self.dwell = Some(dwell);
        self
    }

    pub fn anchor(mut self, anchor: f64) -> Self {
        self.anchor = Some(anchor);
        self
    }

    pub fn time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    pub fn phase_cycle(mut self, phase_cycle: Vec<f64>) -> Self {
        self.phase_cycle = Some(phase_cycle);
        self
    }

    pub fn dfdz(mut self, dfdz: f64) -> Self {
        self.dfdz = Some(dfdz);
        self
    }

    pub fn build(self) -> Result<Acquisition> {
        let npoints = require(self.npoints, "Acquisition", "npoints")?;
        let dwell = require(self.dwell, "Acquisition", "dwell")?;
        let dur = npoints as f64 * dwell;
        Ok(Acquisition {
            npoints,
            dwell,
            dur,
            anchor: self.anchor.unwrap_or(dur / 2.0),
            time: self.time,
            phase_cycle: self.phase_cycle.unwrap_or_else(|| vec![0.0]),
            dfdz: self.dfdz,
        })
    }
}
