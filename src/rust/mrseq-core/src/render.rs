// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use crate::composite::Composite;
use crate::error::Result;
use crate::leaf::{Acquisition, Gradient, RfPulse};
use crate::node::Node;
use crate::parameter_resolver::ParameterResolver;
use crate::sweep_loop::Loop;

/// Traversal state handed down to each node during rendering.
///
/// `time` is the effective absolute placement of the node being visited,
/// `parameters` holds the iteration of every enclosing loop. Nodes themselves
/// are never modified by a traversal.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    time: f64,
    parameters: &'a ParameterResolver,
}

impl<'a> RenderContext<'a> {
    pub fn new(time: f64, parameters: &'a ParameterResolver) -> Self {
        Self { time, parameters }
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn parameters(&self) -> &'a ParameterResolver {
        self.parameters
    }

    /// Same iteration state, different placement.
    pub fn at(&self, time: f64) -> Self {
        Self {
            time,
            parameters: self.parameters,
        }
    }
}

/// A backend consuming a node tree.
///
/// Leaf handlers are mandatory. The structural handlers default to the shared
/// walks ([`walk_composite`], [`walk_loop`]); override them to observe the
/// structure, and call the walk to keep descending.
pub trait Renderer {
    fn gradient(&mut self, node: &Gradient, ctx: &RenderContext<'_>) -> Result<()>;

    fn rf_pulse(&mut self, node: &RfPulse, ctx: &RenderContext<'_>) -> Result<()>;

    fn acquisition(&mut self, node: &Acquisition, ctx: &RenderContext<'_>) -> Result<()>;

    fn composite(&mut self, node: &Composite, ctx: &RenderContext<'_>) -> Result<()> {
        walk_composite(self, node, ctx)
    }

    fn sweep_loop(&mut self, node: &Loop, ctx: &RenderContext<'_>) -> Result<()> {
        walk_loop(self, node, ctx)
    }
}

/// Render the tree rooted at `root`, placed at its own `time`.
pub fn render<R: Renderer + ?Sized>(root: &Node, renderer: &mut R) -> Result<()> {
    let parameters = ParameterResolver::new();
    root.accept(renderer, &RenderContext::new(root.time(), &parameters))
}

/// Visit the children of a composite in order, aligning each child's anchor
/// with the composite's anchor.
pub fn walk_composite<R: Renderer + ?Sized>(
    renderer: &mut R,
    node: &Composite,
    ctx: &RenderContext<'_>,
) -> Result<()> {
    for child in node.children() {
        let time = node.child_time(child, ctx.time());
        child.accept(renderer, &ctx.at(time))?;
    }
    Ok(())
}

/// Visit the inner node of a loop once per repetition, in increasing order.
pub fn walk_loop<R: Renderer + ?Sized>(
    renderer: &mut R,
    node: &Loop,
    ctx: &RenderContext<'_>,
) -> Result<()> {
    let inner = node.inner();
    let mut parameters = ctx.parameters().child_scope();
    for iteration in 0..node.nreps() {
        for sweep in node.sweeps() {
            parameters.set_iteration(sweep.uid(), iteration);
        }
        let time = iteration as f64 * inner.dur() + ctx.time();
        mrseq_log::debug!("Loop '{}' iteration {} at {} ms", node.name(), iteration, time);
        inner.accept(renderer, &RenderContext::new(time, &parameters))?;
    }
    Ok(())
}
