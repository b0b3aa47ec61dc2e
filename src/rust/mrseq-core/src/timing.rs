// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use serde::Serialize;

/// Duration, anchor and placement of a node, all in milliseconds.
///
/// `anchor` is the reference instant inside `[0, dur]` that is aligned to the
/// parent's anchor; `time` offsets the anchor within the parent's local frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Timing {
    pub dur: f64,
    pub anchor: f64,
    pub time: f64,
}

impl Timing {
    pub fn new(dur: f64, anchor: f64, time: f64) -> Self {
        Self { dur, anchor, time }
    }

    /// Extent of the node before its anchor, once the anchor is pinned to zero.
    pub fn min_time(&self) -> f64 {
        self.anchor - self.time
    }

    /// Extent of the node after its anchor, once the anchor is pinned to zero.
    pub fn max_time(&self) -> f64 {
        (self.dur - self.anchor) - self.time
    }
}
