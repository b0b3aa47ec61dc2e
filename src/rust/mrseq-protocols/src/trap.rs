// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use mrseq_core::{Axis, Gradient, GradientShape, Node, ParameterList, ParameterResolver, Samples};

use crate::limits::GradientLimits;

/// A trapezoidal gradient waveform.
///
/// The amplitude `gmax` (mT/m) may be a sweep; the waveform takes the value of
/// the current loop iteration while the area is sized by the peak value.
/// Durations are in ms, the area in ms·mT/m.
#[derive(Debug, Clone, PartialEq)]
pub struct TrapGradient {
    gmax: ParameterList,
    dur: f64,
    trise: f64,
    tfall: f64,
    axis: Axis,
    area: f64,
    anchor: f64,
}

impl TrapGradient {
    /// A trapezoid of total duration `dur`, anchored at its start.
    pub fn new(
        gmax: impl Into<ParameterList>,
        dur: f64,
        axis: Axis,
        limits: &GradientLimits,
    ) -> Self {
        let gmax = gmax.into();
        let trise = limits.rise_time;
        let tfall = limits.rise_time;
        let area = (2.0 * dur - trise - tfall) / 2.0 * gmax.value();
        Self {
            gmax,
            dur,
            trise,
            tfall,
            axis,
            area,
            anchor: 0.0,
        }
    }

    /// A trapezoid holding `gmax` for `top_dur`, anchored at its center.
    ///
    /// This is the shape used for slice selection and readout, where the
    /// plateau amplitude is prescribed.
    pub fn constant(
        gmax: impl Into<ParameterList>,
        top_dur: f64,
        axis: Axis,
        limits: &GradientLimits,
    ) -> Self {
        let dur = top_dur + 2.0 * limits.rise_time;
        let gradient = Self::new(gmax, dur, axis, limits);
        let anchor = gradient.dur / 2.0;
        gradient.with_anchor(anchor)
    }

    /// The shortest trapezoid of at least `dur` reaching the given area.
    ///
    /// The duration is sized by the peak of `area`, so every value of a swept
    /// area fits the same duration.
    pub fn by_area(
        area: impl Into<ParameterList>,
        dur: f64,
        axis: Axis,
        limits: &GradientLimits,
    ) -> Self {
        let area = area.into();
        let dur = dur.max(Self::calc_min_dur(area.value(), limits));
        let trise = limits.rise_time;
        let tfall = limits.rise_time;
        let gmax = &area * (2.0 / (2.0 * dur - trise - tfall));
        Self::new(gmax, dur, axis, limits)
    }

    /// Minimum duration of a trapezoid with the given area at the sizing amplitude.
    pub fn calc_min_dur(area: f64, limits: &GradientLimits) -> f64 {
        let ramps = 2.0 * limits.rise_time;
        let min_dur = (area.abs() * 2.0 / limits.grad_lim + ramps) / 2.0;
        min_dur.max(ramps)
    }

    pub fn gmax(&self) -> &ParameterList {
        &self.gmax
    }

    pub fn dur(&self) -> f64 {
        self.dur
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn anchor(&self) -> f64 {
        self.anchor
    }

    pub fn with_anchor(mut self, anchor: f64) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn node(&self) -> Node {
        Gradient::new(self.clone()).with_anchor(self.anchor).into()
    }
}

impl GradientShape for TrapGradient {
    fn duration(&self) -> f64 {
        self.dur
    }

    fn axis(&self) -> Axis {
        self.axis
    }

    fn waveform(&self, parameters: &ParameterResolver) -> mrseq_core::Result<Samples> {
        let g = self.gmax.resolve(parameters)?;
        Ok(Samples {
            time: vec![0.0, self.trise, self.dur - self.tfall, self.dur],
            values: vec![0.0, g, g, 0.0],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_area() {
        let limits = GradientLimits::default();
        let g = TrapGradient::new(10.0, 2.0, Axis::Read, &limits);
        assert_close(g.area(), (4.0 - 0.4) / 2.0 * 10.0);
        assert_eq!(g.anchor(), 0.0);
    }

    #[test]
    fn test_constant() {
        let limits = GradientLimits::default();
        let g = TrapGradient::constant(5.0, 1.28, Axis::Read, &limits);
        assert_close(g.dur(), 1.68);
        assert_close(g.anchor(), 0.84);
        // plateau plus both ramps
        assert_close(g.area(), 5.0 * 1.28 + 5.0 * 0.2);
    }

    #[test]
    fn test_calc_min_dur() {
        let limits = GradientLimits::default();
        // Small areas are limited by the ramps
        assert_close(TrapGradient::calc_min_dur(1.0, &limits), 0.4);
        // 400 mT/m for 1 ms plus ramps
        assert_close(TrapGradient::calc_min_dur(-480.0, &limits), 1.4);
    }

    #[test]
    fn test_by_area_reaches_area() {
        let limits = GradientLimits::default();
        let g = TrapGradient::by_area(-100.0, 0.0, Axis::Read, &limits);
        assert_close(g.area(), -100.0);
        assert!(g.dur() >= TrapGradient::calc_min_dur(-100.0, &limits));

        let longer = TrapGradient::by_area(-100.0, 3.0, Axis::Read, &limits);
        assert_close(longer.dur(), 3.0);
        assert_close(longer.area(), -100.0);
    }

    #[test]
    fn test_by_area_sweep_waveform() {
        let limits = GradientLimits::default();
        let scale = ParameterList::new(vec![-1.0, 0.0, 0.5]).unwrap();
        let area = &scale * 50.0;
        let g = TrapGradient::by_area(&area, 1.0, Axis::Phase, &limits);
        let gmax = g.gmax().clone();
        assert_eq!(gmax.len(), 3);
        // Sized by the peak, the first value
        assert_close(g.area(), -50.0);

        let mut resolver = ParameterResolver::new();
        resolver.set_iteration(gmax.uid(), 2);
        let samples = g.waveform(&resolver).unwrap();
        for (t, expected) in samples.time.iter().zip([0.0, 0.2, 0.8, 1.0]) {
            assert_close(*t, expected);
        }
        assert_close(samples.values[1], 25.0 * 2.0 / 1.6);
        assert_eq!(samples.values[0], 0.0);
        assert_eq!(samples.values[3], 0.0);
    }
}
