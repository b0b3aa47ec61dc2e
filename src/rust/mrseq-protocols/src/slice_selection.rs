// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::f64::consts::PI;

use mrseq_core::{Axis, Composite, ParameterRecord, RequiredParameters};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ensure_positive};
use crate::limits::{GAMMA, GradientLimits};
use crate::rf::{SelectivePulse, PulseShape};
use crate::trap::TrapGradient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SliceSelectionConfig {
    /// Slice thickness, mm
    pub thk: f64,
    /// Flip angle, degrees
    pub flip: f64,
    /// Duration of the excitation pulse, ms
    pub pulse_dur: f64,
    #[serde(default)]
    pub pulse: PulseShape,
    /// Reference instant of the module, defaults to the center of the pulse.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<f64>,
}

impl RequiredParameters for SliceSelectionConfig {
    const VARIANT: &'static str = "SliceSelection";
    const REQUIRED: &'static [&'static str] = &["thk", "flip", "pulse_dur", "pulse"];

    fn parameters(&self) -> ParameterRecord {
        ParameterRecord::new()
            .with("thk", self.thk)
            .with("flip", self.flip)
            .with("pulse_dur", self.pulse_dur)
            .with("pulse", self.pulse.label())
    }
}

/// Slice-selective excitation: an RF pulse played on a constant slice gradient,
/// plus the refocusing lobe that follows it.
#[derive(Debug, Clone)]
pub struct SliceSelection {
    config: SliceSelectionConfig,
    pulse: SelectivePulse,
    gs: TrapGradient,
    refocus: TrapGradient,
    node: Composite,
    after: Composite,
}

impl SliceSelection {
    /// Build the module; the refocusing lobe lasts at least `after_dur` ms.
    pub fn build(
        config: &SliceSelectionConfig,
        limits: &GradientLimits,
        after_dur: f64,
    ) -> Result<Self> {
        let thk = ensure_positive("thk", config.thk)?;
        let pulse = SelectivePulse::new(config.pulse, config.pulse_dur, config.flip, limits)?;
        let g = 2.0 * PI * pulse.bandwidth() / GAMMA / thk * 1000.0;
        let gs = TrapGradient::constant(g, config.pulse_dur, Axis::Slice, limits);
        let anchor = config.anchor.unwrap_or(gs.anchor());

        let rf = pulse.node().with_dfdz(GAMMA / 2.0 / PI * g);
        let node = Composite::builder()
            .name("slice_selection")
            .dur(gs.dur())
            .anchor(anchor)
            .child(rf)
            .child(gs.node())
            .parameters(config)
            .build()?;

        let refocus = TrapGradient::by_area(-gs.area() / 2.0, after_dur, Axis::Slice, limits);
        let after = Composite::builder()
            .name("slice_refocus")
            .time(node.time())
            .child(refocus.node())
            .build()?;

        Ok(Self {
            config: config.clone(),
            pulse,
            gs,
            refocus,
            node,
            after,
        })
    }

    pub fn config(&self) -> &SliceSelectionConfig {
        &self.config
    }

    pub fn pulse(&self) -> &SelectivePulse {
        &self.pulse
    }

    pub fn slice_gradient(&self) -> &TrapGradient {
        &self.gs
    }

    pub fn refocus_gradient(&self) -> &TrapGradient {
        &self.refocus
    }

    /// Pulse and slice gradient, aligned on the module anchor.
    pub fn node(&self) -> &Composite {
        &self.node
    }

    /// Zero-length container holding the refocusing lobe, anchored at its start.
    pub fn after(&self) -> &Composite {
        &self.after
    }

    pub fn dur(&self) -> f64 {
        self.node.dur()
    }

    pub fn anchor(&self) -> f64 {
        self.node.anchor()
    }
}
