// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Composition, timing and rendering engine for MR sequences.
//!
//! A sequence is a tree of [`Node`]s: leaves producing waveforms (gradients,
//! RF pulses, acquisitions), [`Composite`]s aligning their children on a
//! common anchor, and [`Loop`]s repeating a node while stepping through
//! [`ParameterList`]s. A [`Renderer`] resolves the tree into absolute-time
//! waveform segments.

pub mod composite;
pub mod error;
pub mod leaf;
pub mod node;
pub mod parameter_list;
pub mod parameter_resolver;
pub mod parameters;
pub mod render;
pub mod sweep_loop;
pub mod timing;
pub mod waveform;

#[cfg(test)]
mod test_utils;

pub use crate::composite::{Composite, CompositeBuilder};
pub use crate::error::{Error, Result};
pub use crate::leaf::{
    Acquisition, AcquisitionBuilder, Axis, Gradient, GradientShape, RfPulse, RfSamples, RfShape,
    Samples,
};
pub use crate::node::Node;
pub use crate::parameter_list::{ParameterList, SweepUid};
pub use crate::parameter_resolver::ParameterResolver;
pub use crate::parameters::{ParameterRecord, ParameterValue, RequiredParameters, require};
pub use crate::render::{RenderContext, Renderer, render, walk_composite, walk_loop};
pub use crate::sweep_loop::{Loop, LoopBuilder};
pub use crate::timing::Timing;
pub use crate::waveform::{Channel, Segment, Waveform, WaveformRenderer};
