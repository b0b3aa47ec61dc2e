// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;

use crate::error::Result;
use crate::leaf::{Acquisition, Axis, Gradient, RfPulse};
use crate::node::Node;
use crate::render::{RenderContext, Renderer, render};

/// Output category of the reference renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Channel {
    Gradient(Axis),
    Rf,
    Acquisition,
}

impl Channel {
    pub const ALL: [Channel; 5] = [
        Channel::Gradient(Axis::Read),
        Channel::Gradient(Axis::Phase),
        Channel::Gradient(Axis::Slice),
        Channel::Rf,
        Channel::Acquisition,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Channel::Gradient(axis) => axis.label(),
            Channel::Rf => "rf",
            Channel::Acquisition => "acq",
        }
    }
}

/// One appended piece of a channel: absolute sample times and values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub time: Vec<f64>,
    pub values: Vec<f64>,
}

/// Segments of one channel, in the order they were rendered.
///
/// Segments are never merged or sorted on append; overlapping segments are
/// kept as they are.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Waveform {
    segments: Vec<Segment>,
}

impl Waveform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, time: Vec<f64>, values: Vec<f64>) {
        self.segments.push(Segment { time, values });
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn point_count(&self) -> usize {
        self.segments.iter().map(|s| s.time.len()).sum()
    }

    /// Time span covered by all segments, `None` if there are no samples.
    pub fn span(&self) -> Option<(f64, f64)> {
        self.segments
            .iter()
            .flat_map(|s| s.time.iter().copied())
            .fold(None, |span, t| match span {
                None => Some((t, t)),
                Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
            })
    }

    /// All samples flattened and sorted by time.
    ///
    /// The sort is stable, so samples at equal times keep their render order.
    pub fn sorted_points(&self) -> Vec<(f64, f64)> {
        let mut points: Vec<(f64, f64)> = self
            .segments
            .iter()
            .flat_map(|s| s.time.iter().copied().zip(s.values.iter().copied()))
            .collect();
        points.sort_by(|a, b| a.0.total_cmp(&b.0));
        points
    }
}

/// Reference backend accumulating absolute-time segments per channel.
#[derive(Debug, Clone, Default, Serialize)]
pub struct WaveformRenderer {
    read: Waveform,
    phase: Waveform,
    slice: Waveform,
    rf: Waveform,
    acquisition: Waveform,
}

impl WaveformRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `root` into fresh accumulators.
    pub fn run(&mut self, root: &Node) -> Result<()> {
        *self = Self::new();
        render(root, self)?;
        mrseq_log::diagnostic!(
            "Rendered {} gradient, {} RF and {} acquisition segments",
            self.read.len() + self.phase.len() + self.slice.len(),
            self.rf.len(),
            self.acquisition.len()
        );
        Ok(())
    }

    pub fn gradient_waveform(&self, axis: Axis) -> &Waveform {
        match axis {
            Axis::Read => &self.read,
            Axis::Phase => &self.phase,
            Axis::Slice => &self.slice,
        }
    }

    pub fn rf(&self) -> &Waveform {
        &self.rf
    }

    pub fn acquisitions(&self) -> &Waveform {
        &self.acquisition
    }

    pub fn channel(&self, channel: Channel) -> &Waveform {
        match channel {
            Channel::Gradient(axis) => self.gradient_waveform(axis),
            Channel::Rf => &self.rf,
            Channel::Acquisition => &self.acquisition,
        }
    }

    fn gradient_waveform_mut(&mut self, axis: Axis) -> &mut Waveform {
        match axis {
            Axis::Read => &mut self.read,
            Axis::Phase => &mut self.phase,
            Axis::Slice => &mut self.slice,
        }
    }
}

fn shifted(time: Vec<f64>, offset: f64) -> Vec<f64> {
    time.into_iter().map(|t| t + offset).collect()
}

impl Renderer for WaveformRenderer {
    fn gradient(&mut self, node: &Gradient, ctx: &RenderContext<'_>) -> Result<()> {
        let samples = node.waveform(ctx.parameters())?;
        self.gradient_waveform_mut(node.axis())
            .append(shifted(samples.time, ctx.time()), samples.values);
        Ok(())
    }

    fn rf_pulse(&mut self, node: &RfPulse, ctx: &RenderContext<'_>) -> Result<()> {
        let samples = node.waveform(ctx.parameters())?;
        self.rf
            .append(shifted(samples.time, ctx.time()), samples.amplitude);
        Ok(())
    }

    fn acquisition(&mut self, node: &Acquisition, ctx: &RenderContext<'_>) -> Result<()> {
        let samples = node.waveform();
        self.acquisition
            .append(shifted(samples.time, ctx.time()), samples.values);
        Ok(())
    }
}
