// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use mrseq_core::{Composite, Loop, Node, ParameterList, ParameterRecord, RequiredParameters};
use mrseq_log::{diagnostic, warn};
use serde::{Deserialize, Serialize};

use crate::cartesian::{CartesianConfig, CartesianEncoding};
use crate::error::{Error, Result, ensure_positive};
use crate::limits::GradientLimits;
use crate::slice_selection::{SliceSelection, SliceSelectionConfig};

fn one() -> usize {
    1
}

/// Parameters of a gradient-echo acquisition.
///
/// `te` and `tr` are lower bounds: both are extended to the shortest values
/// the slice selection and encoding modules allow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientEchoConfig {
    /// Echo time, ms
    pub te: f64,
    /// Repetition time, ms
    pub tr: f64,
    /// Number of repetitions
    #[serde(default = "one")]
    pub nr: usize,
    /// Number of averages
    #[serde(default = "one")]
    pub na: usize,
    pub ss: SliceSelectionConfig,
    pub enc: CartesianConfig,
    #[serde(default)]
    pub limits: GradientLimits,
}

impl RequiredParameters for GradientEchoConfig {
    const VARIANT: &'static str = "GradientEcho";
    const REQUIRED: &'static [&'static str] = &["te", "tr", "nr", "na", "ss", "enc"];

    fn parameters(&self) -> ParameterRecord {
        ParameterRecord::new()
            .with("te", self.te)
            .with("tr", self.tr)
            .with("nr", self.nr)
            .with("na", self.na)
            .with("ss", self.ss.parameters())
            .with("enc", self.enc.parameters())
    }
}

/// Durations negotiated between the slice selection and the encoding.
#[derive(Debug, Clone, Copy, PartialEq)]
struct EchoTiming {
    te: f64,
    tr: f64,
    pre_enc_dur: f64,
    post_enc_dur: f64,
}

fn negotiate(
    config: &GradientEchoConfig,
    ss: &SliceSelection,
    enc: &CartesianEncoding,
) -> EchoTiming {
    let readout = enc.readout();
    let min_te = ss.dur() - ss.anchor()
        + ss.after().dur().max(enc.before().dur())
        + readout.anchor();
    if config.te < min_te {
        warn!("Echo time {} ms extended to minimum of {} ms", config.te, min_te);
    }
    let te = config.te.max(min_te);
    let pre_enc_dur = (enc.before().dur() + te - min_te).min(readout.dur());

    let min_tr = readout.dur() - readout.anchor() + te + enc.after().dur() + ss.anchor();
    if config.tr < min_tr {
        warn!("Repetition time {} ms extended to minimum of {} ms", config.tr, min_tr);
    }
    let tr = config.tr.max(min_tr);
    let post_enc_dur = (enc.after().dur() + tr - min_tr).min(readout.dur());

    EchoTiming {
        te,
        tr,
        pre_enc_dur,
        post_enc_dur,
    }
}

/// A 2D/3D spoiled gradient-echo imaging sequence.
///
/// One repetition (`base`) holds the slice-selective excitation, the
/// encoding gradients and the readout. It is wrapped in the averaging,
/// phase-encode and repetition loops, outermost last.
#[derive(Debug, Clone)]
pub struct GradientEcho {
    config: GradientEchoConfig,
    ss: SliceSelection,
    enc: CartesianEncoding,
    base: Composite,
    root: Composite,
}

impl GradientEcho {
    pub fn build(config: &GradientEchoConfig) -> Result<Self> {
        let limits = &config.limits;
        ensure_positive("te", config.te)?;
        ensure_positive("tr", config.tr)?;
        if config.nr == 0 || config.na == 0 {
            return Err(Error::invalid("nr", "repetitions and averages must be at least 1"));
        }

        let mut ss_config = config.ss.clone();
        ss_config.thk = config.enc.fov[2];

        // Build once to learn the minimum durations of the parts
        let ss = SliceSelection::build(&ss_config, limits, 0.0)?;
        let enc = CartesianEncoding::build(&config.enc, limits, 0.0, 0.0)?;
        let timing = negotiate(config, &ss, &enc);

        let ss = SliceSelection::build(&ss_config, limits, timing.pre_enc_dur)?;
        let enc =
            CartesianEncoding::build(&config.enc, limits, timing.pre_enc_dur, timing.post_enc_dur)?;

        let mut before = enc.before().clone();
        before.add(ss.after().clone());
        let before = before.with_anchor(0.0).with_time(ss.dur() - ss.anchor());
        let readout = enc.readout().clone().with_time(timing.te);
        let after = enc
            .after()
            .clone()
            .with_anchor(0.0)
            .with_time(timing.te + readout.dur() - readout.anchor());

        let base = Composite::builder()
            .name("repetition")
            .dur(timing.tr)
            .anchor(ss.anchor())
            .child(ss.node().clone())
            .child(readout)
            .child(before)
            .child(after)
            .build()?;

        let averages = Loop::builder(base.clone())
            .name("avg")
            .add_list(&ParameterList::arange(0.0, config.na as f64)?)
            .build()?;
        let pe1 = Loop::builder(averages)
            .name("pe1")
            .add_list(enc.pe1_gradient().gmax())
            .add_list(enc.pe1_rewinder().gmax())
            .build()?;
        let pe2 = Loop::builder(pe1)
            .name("pe2")
            .add_list(enc.pe2_gradient().gmax())
            .add_list(enc.pe2_rewinder().gmax())
            .build()?;
        let repetitions = Loop::builder(pe2)
            .name("nrep")
            .add_list(&ParameterList::arange(0.0, config.nr as f64)?)
            .build()?;

        let mut effective = config.clone();
        effective.te = timing.te;
        effective.tr = timing.tr;
        effective.ss = ss_config;

        let root = Composite::builder()
            .name("gradient_echo")
            .dur(repetitions.timing().dur)
            .child(repetitions)
            .parameters(&effective)
            .build()?;
        diagnostic!(
            "Built gradient echo: te={} ms, tr={} ms, total {} ms",
            timing.te,
            timing.tr,
            root.dur()
        );

        Ok(Self {
            config: effective,
            ss,
            enc,
            base,
            root,
        })
    }

    /// Configuration with the negotiated echo and repetition times.
    pub fn config(&self) -> &GradientEchoConfig {
        &self.config
    }

    pub fn te(&self) -> f64 {
        self.config.te
    }

    pub fn tr(&self) -> f64 {
        self.config.tr
    }

    pub fn slice_selection(&self) -> &SliceSelection {
        &self.ss
    }

    pub fn encoding(&self) -> &CartesianEncoding {
        &self.enc
    }

    /// A single repetition, outside of any loop.
    pub fn base(&self) -> &Composite {
        &self.base
    }

    pub fn root(&self) -> &Composite {
        &self.root
    }

    pub fn node(&self) -> Node {
        self.root.clone().into()
    }
}
