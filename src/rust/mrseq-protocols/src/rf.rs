// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use mrseq_core::{ParameterResolver, RfPulse, RfSamples, RfShape};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ensure_positive};
use crate::limits::GradientLimits;

/// Envelope of an excitation pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PulseShape {
    #[serde(alias = "bloch")]
    Block,
    #[default]
    Gauss,
}

/// Role of a pulse in the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PulseKind {
    #[default]
    Excitation,
    Refocusing,
}

impl PulseShape {
    /// Time-bandwidth product of the shape when used as a pulse of `kind`.
    pub fn tbw(&self, kind: PulseKind) -> f64 {
        match (kind, self) {
            (PulseKind::Excitation, PulseShape::Block) => 2.0,
            (PulseKind::Excitation, PulseShape::Gauss) => 2.74,
            (PulseKind::Refocusing, _) => 2.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PulseShape::Block => "block",
            PulseShape::Gauss => "gauss",
        }
    }
}

/// A slice-selective RF pulse of duration `dur` (ms) and flip angle `flip` (degrees).
///
/// The B1 envelope (kHz) integrates to `flip / 360` cycles for every shape.
/// Excitation and refocusing pulses share their envelopes and differ in
/// bandwidth.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectivePulse {
    kind: PulseKind,
    shape: PulseShape,
    dur: f64,
    flip: f64,
    bw: f64,
    samples: RfSamples,
}

impl SelectivePulse {
    /// An excitation pulse.
    pub fn new(shape: PulseShape, dur: f64, flip: f64, limits: &GradientLimits) -> Result<Self> {
        Self::with_kind(PulseKind::Excitation, shape, dur, flip, limits)
    }

    /// A refocusing pulse.
    pub fn refocusing(
        shape: PulseShape,
        dur: f64,
        flip: f64,
        limits: &GradientLimits,
    ) -> Result<Self> {
        Self::with_kind(PulseKind::Refocusing, shape, dur, flip, limits)
    }

    pub fn with_kind(
        kind: PulseKind,
        shape: PulseShape,
        dur: f64,
        flip: f64,
        limits: &GradientLimits,
    ) -> Result<Self> {
        let dur = ensure_positive("pulse_dur", dur)?;
        let samples = match shape {
            PulseShape::Block => block_samples(dur, flip),
            PulseShape::Gauss => gauss_samples(dur, flip, ensure_positive("dwell", limits.dwell)?),
        };
        Ok(Self {
            kind,
            shape,
            dur,
            flip,
            bw: shape.tbw(kind) / dur,
            samples,
        })
    }

    pub fn kind(&self) -> PulseKind {
        self.kind
    }

    pub fn shape(&self) -> PulseShape {
        self.shape
    }

    pub fn dur(&self) -> f64 {
        self.dur
    }

    pub fn flip(&self) -> f64 {
        self.flip
    }

    /// Excitation bandwidth, kHz.
    pub fn bandwidth(&self) -> f64 {
        self.bw
    }

    /// The pulse as a sequence leaf, anchored at its center.
    pub fn node(&self) -> RfPulse {
        RfPulse::new(self.clone())
    }
}

fn block_samples(dur: f64, flip: f64) -> RfSamples {
    let b1 = flip / 360.0 / dur;
    RfSamples {
        time: vec![0.0, 0.0, dur, dur],
        amplitude: vec![0.0, b1, b1, 0.0],
        phase: vec![0.0; 4],
    }
}

fn gauss_samples(dur: f64, flip: f64, res: f64) -> RfSamples {
    let center = dur / 2.0;
    let count = (dur / res - 1e-9).ceil() as usize;
    let time: Vec<f64> = (0..count).map(|i| i as f64 * res).collect();
    let envelope: Vec<f64> = time
        .iter()
        .map(|t| (-(t - center).powi(2) * 9.0 / dur.powi(2)).exp())
        .collect();
    let total: f64 = envelope.iter().sum();
    let amplitude = envelope
        .iter()
        .map(|w| w / total / res * flip / 360.0)
        .collect();
    RfSamples {
        phase: vec![0.0; count],
        time,
        amplitude,
    }
}

impl RfShape for SelectivePulse {
    fn duration(&self) -> f64 {
        self.dur
    }

    fn waveform(&self, _parameters: &ParameterResolver) -> mrseq_core::Result<RfSamples> {
        Ok(self.samples.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flip_cycles(samples: &RfSamples, res: f64) -> f64 {
        samples.amplitude.iter().sum::<f64>() * res
    }

    #[test]
    fn test_block() {
        let pulse = SelectivePulse::new(PulseShape::Block, 2.0, 90.0, &GradientLimits::default())
            .unwrap();
        let samples = pulse.waveform(&ParameterResolver::new()).unwrap();
        assert_eq!(samples.time, vec![0.0, 0.0, 2.0, 2.0]);
        assert_eq!(samples.amplitude, vec![0.0, 0.125, 0.125, 0.0]);
        assert_eq!(pulse.bandwidth(), 1.0);
        assert_eq!(pulse.node().timing().anchor, 1.0);
    }

    #[test]
    fn test_gauss_is_normalized_to_flip() {
        let limits = GradientLimits::default();
        let pulse = SelectivePulse::new(PulseShape::Gauss, 2.0, 20.0, &limits).unwrap();
        let samples = pulse.waveform(&ParameterResolver::new()).unwrap();
        assert_eq!(samples.time.len(), 500);
        assert_eq!(samples.phase.len(), 500);
        assert!((flip_cycles(&samples, limits.dwell) - 20.0 / 360.0).abs() < 1e-12);
        assert!((pulse.bandwidth() - 1.37).abs() < 1e-12);
        // Peak at the center
        let peak = samples
            .amplitude
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 250);
    }

    #[test]
    fn test_refocusing_pulses() {
        let limits = GradientLimits::default();
        let block = SelectivePulse::refocusing(PulseShape::Block, 2.0, 180.0, &limits).unwrap();
        assert_eq!(block.kind(), PulseKind::Refocusing);
        assert_eq!(block.bandwidth(), 1.0);
        let samples = block.waveform(&ParameterResolver::new()).unwrap();
        assert_eq!(samples.amplitude, vec![0.0, 0.25, 0.25, 0.0]);
        assert_eq!(block.node().timing().anchor, 1.0);

        let gauss = SelectivePulse::refocusing(PulseShape::Gauss, 4.0, 180.0, &limits).unwrap();
        assert_eq!(gauss.bandwidth(), 0.5);
        let samples = gauss.waveform(&ParameterResolver::new()).unwrap();
        assert!((flip_cycles(&samples, limits.dwell) - 0.5).abs() < 1e-12);
        // Same envelope as the excitation pulse, narrower band
        let excitation = SelectivePulse::new(PulseShape::Gauss, 4.0, 180.0, &limits).unwrap();
        assert_eq!(excitation.waveform(&ParameterResolver::new()).unwrap(), samples);
        assert!(gauss.bandwidth() < excitation.bandwidth());
    }

    #[test]
    fn test_invalid_duration() {
        assert!(
            SelectivePulse::new(PulseShape::Gauss, 0.0, 20.0, &GradientLimits::default())
                .is_err()
        );
    }

    #[test]
    fn test_shape_names() {
        let shape: PulseShape = serde_json::from_str(r#""bloch""#).unwrap();
        assert_eq!(shape, PulseShape::Block);
        let shape: PulseShape = serde_json::from_str(r#""gauss""#).unwrap();
        assert_eq!(shape, PulseShape::Gauss);
        assert_eq!(shape.label(), "gauss");
        let kind: PulseKind = serde_json::from_str(r#""refocusing""#).unwrap();
        assert_eq!(kind, PulseKind::Refocusing);
        assert_eq!(PulseShape::Block.tbw(kind), 2.0);
        assert_eq!(PulseShape::Gauss.tbw(kind), 2.0);
    }
}
