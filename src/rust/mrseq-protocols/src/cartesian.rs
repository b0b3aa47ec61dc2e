// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::f64::consts::PI;

use mrseq_core::{Acquisition, Axis, Composite, ParameterList, ParameterRecord, RequiredParameters};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, ensure_positive};
use crate::limits::{GAMMA, GradientLimits};
use crate::trap::TrapGradient;

fn default_dwell() -> f64 {
    0.020
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartesianConfig {
    /// Field of view per axis (read, phase, slice), mm
    pub fov: [f64; 3],
    pub img_matrix: [usize; 3],
    /// Receiver dwell time, ms
    #[serde(default = "default_dwell")]
    pub dwell: f64,
    /// Encoded matrix, defaults to `img_matrix`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enc_matrix: Option<[usize; 3]>,
}

impl CartesianConfig {
    pub fn encoded_matrix(&self) -> [usize; 3] {
        self.enc_matrix.unwrap_or(self.img_matrix)
    }

    /// Image resolution per axis, mm.
    pub fn resolution(&self) -> [f64; 3] {
        [0, 1, 2].map(|i| self.fov[i] / self.img_matrix[i] as f64)
    }

    fn validate(&self) -> Result<()> {
        for fov in self.fov {
            ensure_positive("fov", fov)?;
        }
        ensure_positive("dwell", self.dwell)?;
        if self.img_matrix.contains(&0) || self.encoded_matrix().contains(&0) {
            return Err(Error::invalid("img_matrix", "matrix sizes must be at least 1"));
        }
        Ok(())
    }
}

impl RequiredParameters for CartesianConfig {
    const VARIANT: &'static str = "CartesianEncoding";
    const REQUIRED: &'static [&'static str] = &["fov", "img_matrix", "dwell", "enc_matrix"];

    fn parameters(&self) -> ParameterRecord {
        let as_vector = |m: [usize; 3]| m.iter().map(|&n| n as f64).collect::<Vec<_>>();
        ParameterRecord::new()
            .with("fov", self.fov.to_vec())
            .with("img_matrix", as_vector(self.img_matrix))
            .with("dwell", self.dwell)
            .with("enc_matrix", as_vector(self.encoded_matrix()))
    }
}

/// Normalised phase-encode steps for `n` lines: `(-n/2, n/2]` scaled to `(-1, 1]`.
fn phase_encode_steps(n: usize) -> Result<ParameterList> {
    let half = n as f64 / 2.0;
    let steps = ParameterList::arange((-half + 1.0).floor(), half.floor() + 1.0)?;
    Ok(steps / half)
}

/// Area of the outermost phase-encode step along an axis of `n` lines.
fn phase_encode_area(n: usize, fov: f64) -> f64 {
    -PI * (n as f64 - 1.0) / fov / GAMMA * 1000.0
}

/// Cartesian k-space encoding: a readout with its acquisition, the
/// pre-phasing and phase-encode gradients played before it, and their
/// rewinders played after it.
#[derive(Debug, Clone)]
pub struct CartesianEncoding {
    config: CartesianConfig,
    ro: TrapGradient,
    pp: TrapGradient,
    pe1: TrapGradient,
    pe2: TrapGradient,
    ppr: TrapGradient,
    pe1r: TrapGradient,
    pe2r: TrapGradient,
    readout: Composite,
    before: Composite,
    after: Composite,
}

impl CartesianEncoding {
    /// Build the encoding; the gradients around the readout last at least
    /// `before_dur` and `after_dur` ms.
    pub fn build(
        config: &CartesianConfig,
        limits: &GradientLimits,
        before_dur: f64,
        after_dur: f64,
    ) -> Result<Self> {
        config.validate()?;
        let matrix = config.encoded_matrix();
        let fov = config.fov;

        let grad_str = 2.0 * PI / config.dwell / fov[0] / GAMMA * 1000.0;
        let ro = TrapGradient::constant(grad_str, matrix[0] as f64 * config.dwell, Axis::Read, limits);
        let acquisition = Acquisition::builder()
            .npoints(matrix[0])
            .dwell(config.dwell)
            .dfdz(GAMMA / 2.0 / PI * grad_str)
            .build()?;
        let readout = Composite::builder()
            .name("readout")
            .dur(ro.dur())
            .anchor(ro.dur() / 2.0)
            .child(ro.node())
            .child(acquisition)
            .build()?;

        let pp_area = -ro.area() / 2.0;
        let pe1_area = phase_encode_area(matrix[1], fov[1]);
        let pe2_area = phase_encode_area(matrix[2], fov[2]);
        let pe1_steps = phase_encode_steps(matrix[1])?;
        let pe2_steps = phase_encode_steps(matrix[2])?;

        let min_dur = [pp_area, pe1_area, pe2_area]
            .into_iter()
            .map(|area| TrapGradient::calc_min_dur(area, limits))
            .fold(0.0, f64::max);

        let before_dur = before_dur.max(min_dur);
        let pp = TrapGradient::by_area(pp_area, before_dur, Axis::Read, limits);
        let pe1 = TrapGradient::by_area(pe1_area * &pe1_steps, before_dur, Axis::Phase, limits);
        let pe2 = TrapGradient::by_area(pe2_area * &pe2_steps, before_dur, Axis::Slice, limits);

        let after_dur = after_dur.max(min_dur);
        let ppr = TrapGradient::by_area(pp_area, after_dur, Axis::Read, limits);
        let pe1r = TrapGradient::by_area(-pe1_area * &pe1_steps, after_dur, Axis::Phase, limits);
        let pe2r = TrapGradient::by_area(-pe2_area * &pe2_steps, after_dur, Axis::Slice, limits);

        let before = Composite::builder()
            .name("pre_encoding")
            .dur(before_dur)
            .children([pp.node(), pe1.node(), pe2.node()])
            .build()?;
        let after = Composite::builder()
            .name("rewinding")
            .dur(after_dur)
            .children([ppr.node(), pe1r.node(), pe2r.node()])
            .build()?;

        Ok(Self {
            config: config.clone(),
            ro,
            pp,
            pe1,
            pe2,
            ppr,
            pe1r,
            pe2r,
            readout,
            before,
            after,
        })
    }

    pub fn config(&self) -> &CartesianConfig {
        &self.config
    }

    pub fn readout_gradient(&self) -> &TrapGradient {
        &self.ro
    }

    pub fn prephaser(&self) -> &TrapGradient {
        &self.pp
    }

    pub fn pe1_gradient(&self) -> &TrapGradient {
        &self.pe1
    }

    pub fn pe2_gradient(&self) -> &TrapGradient {
        &self.pe2
    }

    pub fn rephaser(&self) -> &TrapGradient {
        &self.ppr
    }

    pub fn pe1_rewinder(&self) -> &TrapGradient {
        &self.pe1r
    }

    pub fn pe2_rewinder(&self) -> &TrapGradient {
        &self.pe2r
    }

    /// Readout gradient and acquisition, anchored at the echo.
    pub fn readout(&self) -> &Composite {
        &self.readout
    }

    pub fn before(&self) -> &Composite {
        &self.before
    }

    pub fn after(&self) -> &Composite {
        &self.after
    }
}
