// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;

use crate::composite::Composite;
use crate::error::{Error, Result};
use crate::leaf::{Acquisition, Gradient, RfPulse};
use crate::parameter_list::SweepUid;
use crate::parameters::ParameterRecord;
use crate::render::{RenderContext, Renderer};
use crate::sweep_loop::Loop;
use crate::timing::Timing;

/// A timed element of a sequence.
///
/// Nodes are immutable once built. Placement changes go through
/// [`Node::with_time`] / [`Node::with_anchor`], which return a new node.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Gradient(Gradient),
    RfPulse(RfPulse),
    Acquisition(Acquisition),
    Composite(Composite),
    Loop(Loop),
}

impl Node {
    pub fn variant(&self) -> &'static str {
        match self {
            Node::Gradient(_) => "Gradient",
            Node::RfPulse(_) => "RfPulse",
            Node::Acquisition(_) => "Acquisition",
            Node::Composite(_) => "Composite",
            Node::Loop(_) => "Loop",
        }
    }

    pub fn timing(&self) -> Timing {
        match self {
            Node::Gradient(obj) => obj.timing(),
            Node::RfPulse(obj) => obj.timing(),
            Node::Acquisition(obj) => obj.timing(),
            Node::Composite(obj) => obj.timing(),
            Node::Loop(obj) => obj.timing(),
        }
    }

    pub fn dur(&self) -> f64 {
        self.timing().dur
    }

    pub fn anchor(&self) -> f64 {
        self.timing().anchor
    }

    pub fn time(&self) -> f64 {
        self.timing().time
    }

    pub fn min_time(&self) -> f64 {
        self.timing().min_time()
    }

    pub fn max_time(&self) -> f64 {
        self.timing().max_time()
    }

    pub fn with_time(self, time: f64) -> Self {
        match self {
            Node::Gradient(obj) => obj.with_time(time).into(),
            Node::RfPulse(obj) => obj.with_time(time).into(),
            Node::Acquisition(obj) => obj.with_time(time).into(),
            Node::Composite(obj) => obj.with_time(time).into(),
            Node::Loop(obj) => obj.with_time(time).into(),
        }
    }

    pub fn with_anchor(self, anchor: f64) -> Self {
        match self {
            Node::Gradient(obj) => obj.with_anchor(anchor).into(),
            Node::RfPulse(obj) => obj.with_anchor(anchor).into(),
            Node::Acquisition(obj) => obj.with_anchor(anchor).into(),
            Node::Composite(obj) => obj.with_anchor(anchor).into(),
            Node::Loop(obj) => obj.with_anchor(anchor).into(),
        }
    }

    /// Recompute every derived field from the current fields.
    ///
    /// Leaves derive everything at construction and are returned as-is.
    pub fn build(&self) -> Result<Node> {
        match self {
            Node::Composite(obj) => Ok(obj.build()?.into()),
            Node::Loop(obj) => Ok(obj.build()?.into()),
            leaf => Ok(leaf.clone()),
        }
    }

    /// Present the node to the matching handler of `renderer`.
    pub fn accept<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        ctx: &RenderContext<'_>,
    ) -> Result<()> {
        match self {
            Node::Gradient(obj) => renderer.gradient(obj, ctx),
            Node::RfPulse(obj) => renderer.rf_pulse(obj, ctx),
            Node::Acquisition(obj) => renderer.acquisition(obj, ctx),
            Node::Composite(obj) => renderer.composite(obj, ctx),
            Node::Loop(obj) => renderer.sweep_loop(obj, ctx),
        }
    }

    /// Dump the required construction parameters of the node.
    ///
    /// Only composites built from a declared parameter set support this.
    pub fn serialize(&self) -> Result<ParameterRecord> {
        match self {
            Node::Composite(obj) => obj.serialize(),
            other => Err(Error::UnsupportedOperation {
                variant: other.variant(),
                operation: "serialize",
            }),
        }
    }

    /// Identities of the parameter lists iterated by loops in this subtree.
    pub fn bound_sweeps(&self) -> HashSet<SweepUid> {
        let mut sweeps = HashSet::new();
        collect_bound_sweeps(self, &mut sweeps);
        sweeps
    }
}

fn collect_bound_sweeps(node: &Node, sweeps: &mut HashSet<SweepUid>) {
    match node {
        Node::Composite(obj) => {
            for child in obj.children() {
                collect_bound_sweeps(child, sweeps);
            }
        }
        Node::Loop(obj) => {
            sweeps.extend(obj.sweeps().iter().map(|s| s.uid()));
            collect_bound_sweeps(obj.inner(), sweeps);
        }
        _ => {}
    }
}

impl From<Gradient> for Node {
    fn from(value: Gradient) -> Self {
        Node::Gradient(value)
    }
}

impl From<RfPulse> for Node {
    fn from(value: RfPulse) -> Self {
        Node::RfPulse(value)
    }
}

impl From<Acquisition> for Node {
    fn from(value: Acquisition) -> Self {
        Node::Acquisition(value)
    }
}

impl From<Composite> for Node {
    fn from(value: Composite) -> Self {
        Node::Composite(value)
    }
}

impl From<Loop> for Node {
    fn from(value: Loop) -> Self {
        Node::Loop(value)
    }
}
