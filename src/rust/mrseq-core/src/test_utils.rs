// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Shapes and backends shared by the unit tests.

use crate::error::{Error, Result};
use crate::leaf::{Acquisition, Axis, Gradient, GradientShape, RfPulse, RfSamples, RfShape, Samples};
use crate::node::Node;
use crate::parameter_list::ParameterList;
use crate::parameter_resolver::ParameterResolver;
use crate::render::{RenderContext, Renderer};

/// A rectangular gradient whose amplitude is taken from a parameter list.
#[derive(Debug)]
pub struct BoxGradient {
    pub dur: f64,
    pub axis: Axis,
    pub amplitude: ParameterList,
}

impl GradientShape for BoxGradient {
    fn duration(&self) -> f64 {
        self.dur
    }

    fn axis(&self) -> Axis {
        self.axis
    }

    fn waveform(&self, parameters: &ParameterResolver) -> Result<Samples> {
        let g = self.amplitude.resolve(parameters)?;
        Ok(Samples {
            time: vec![0.0, self.dur],
            values: vec![g, g],
        })
    }
}

#[derive(Debug)]
pub struct BoxPulse(pub f64);

impl RfShape for BoxPulse {
    fn duration(&self) -> f64 {
        self.0
    }

    fn waveform(&self, _parameters: &ParameterResolver) -> Result<RfSamples> {
        Ok(RfSamples {
            time: vec![0.0, self.0],
            amplitude: vec![1.0, 1.0],
            phase: vec![0.0, 0.0],
        })
    }
}

pub fn gradient(dur: f64, axis: Axis, amplitude: impl Into<ParameterList>) -> Gradient {
    Gradient::new(BoxGradient {
        dur,
        axis,
        amplitude: amplitude.into(),
    })
}

pub fn pulse(dur: f64) -> Node {
    RfPulse::new(BoxPulse(dur)).into()
}

pub fn acquisition(npoints: usize) -> Node {
    Acquisition::builder()
        .npoints(npoints)
        .dwell(0.5)
        .build()
        .unwrap()
        .into()
}

/// Records the effective time and resolved amplitude of every gradient it visits.
#[derive(Debug, Default)]
pub struct TraceRenderer {
    pub gradients: Vec<(f64, f64)>,
    pub others: Vec<f64>,
}

impl Renderer for TraceRenderer {
    fn gradient(&mut self, node: &Gradient, ctx: &RenderContext<'_>) -> Result<()> {
        let samples = node.waveform(ctx.parameters())?;
        self.gradients.push((ctx.time(), samples.values[0]));
        Ok(())
    }

    fn rf_pulse(&mut self, _node: &RfPulse, ctx: &RenderContext<'_>) -> Result<()> {
        self.others.push(ctx.time());
        Ok(())
    }

    fn acquisition(&mut self, _node: &Acquisition, ctx: &RenderContext<'_>) -> Result<()> {
        self.others.push(ctx.time());
        Ok(())
    }
}

/// Fails on the n-th gradient it visits.
#[derive(Debug)]
pub struct FailingRenderer {
    pub fail_at: usize,
    pub visited: usize,
}

impl Renderer for FailingRenderer {
    fn gradient(&mut self, _node: &Gradient, _ctx: &RenderContext<'_>) -> Result<()> {
        self.visited += 1;
        if self.visited == self.fail_at {
            return Err(Error::new("induced failure"));
        }
        Ok(())
    }

    fn rf_pulse(&mut self, _node: &RfPulse, _ctx: &RenderContext<'_>) -> Result<()> {
        Ok(())
    }

    fn acquisition(&mut self, _node: &Acquisition, _ctx: &RenderContext<'_>) -> Result<()> {
        Ok(())
    }
}
