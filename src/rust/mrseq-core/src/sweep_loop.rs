// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};
use crate::node::Node;
use crate::parameter_list::ParameterList;
use crate::timing::Timing;

/// Repeats one node once per value of its registered parameter lists.
///
/// Iteration `n` places the inner node at `n * inner.dur` after the loop's
/// own placement and resolves every registered list to its `n`-th value.
#[derive(Debug, Clone, PartialEq)]
pub struct Loop {
    name: String,
    inner: Box<Node>,
    sweeps: Vec<ParameterList>,
    nreps: usize,
    dur: f64,
    objdur: f64,
    anchor: f64,
    time: f64,
}

impl Loop {
    pub fn builder(inner: impl Into<Node>) -> LoopBuilder {
        LoopBuilder::new(inner)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn inner(&self) -> &Node {
        &self.inner
    }

    pub fn sweeps(&self) -> &[ParameterList] {
        &self.sweeps
    }

    pub fn nreps(&self) -> usize {
        self.nreps
    }

    /// Duration of one repeated unit, looking through nested loops.
    pub fn objdur(&self) -> f64 {
        self.objdur
    }

    pub fn timing(&self) -> Timing {
        Timing::new(self.dur, self.anchor, self.time)
    }

    /// Whether `list` is driven by this loop.
    pub fn binds(&self, list: &ParameterList) -> bool {
        self.sweeps.iter().any(|s| s.uid() == list.uid())
    }

    pub fn with_time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    pub fn with_anchor(mut self, anchor: f64) -> Self {
        self.anchor = anchor;
        self
    }

    /// Recompute repetitions and durations from the inner node and the lists.
    pub fn build(&self) -> Result<Loop> {
        let inner = self.inner.build()?;
        derive_loop(
            self.name.clone(),
            inner,
            self.sweeps.clone(),
            self.anchor,
            self.time,
        )
    }
}

fn derive_loop(
    name: String,
    inner: Node,
    sweeps: Vec<ParameterList>,
    anchor: f64,
    time: f64,
) -> Result<Loop> {
    let Some(first) = sweeps.first() else {
        return Err(Error::MissingParameter {
            variant: "Loop",
            parameter: "lists",
        });
    };
    let nreps = first.len();
    if let Some(other) = sweeps.iter().find(|s| s.len() != nreps) {
        return Err(Error::LengthMismatch {
            name,
            expected: nreps,
            found: other.len(),
        });
    }
    let nested = inner.bound_sweeps();
    if let Some(sweep) = sweeps.iter().find(|s| nested.contains(&s.uid())) {
        return Err(Error::SweepAlreadyBound {
            name,
            uid: sweep.uid().0,
        });
    }
    let dur = inner.dur() * nreps as f64;
    let objdur = match &inner {
        Node::Loop(obj) => obj.objdur(),
        other => other.dur(),
    };
    mrseq_log::diagnostic!(
        "Loop '{}': {} repetitions of {} ms, {} parameter lists",
        name,
        nreps,
        inner.dur(),
        sweeps.len()
    );
    Ok(Loop {
        name,
        inner: Box::new(inner),
        sweeps,
        nreps,
        dur,
        objdur,
        anchor,
        time,
    })
}

pub struct LoopBuilder {
    name: Option<String>,
    inner: Node,
    sweeps: Vec<ParameterList>,
    anchor: f64,
    time: f64,
}

impl LoopBuilder {
    pub fn new(inner: impl Into<Node>) -> Self {
        Self {
            name: None,
            inner: inner.into(),
            sweeps: Vec::new(),
            anchor: 0.0,
            time: 0.0,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Register a parameter list to be driven by this loop.
    pub fn add_list(mut self, list: &ParameterList) -> Self {
        self.sweeps.push(list.clone());
        self
    }

    pub fn anchor(mut self, anchor: f64) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    pub fn build(self) -> Result<Loop> {
        derive_loop(
            self.name.unwrap_or_else(|| "loop".to_string()),
            self.inner,
            self.sweeps,
            self.anchor,
            self.time,
        )
    }
}
