// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

//! Pulse shapes and imaging protocols assembled from `mrseq-core` nodes.

pub mod cartesian;
pub mod error;
pub mod gradient_echo;
pub mod limits;
pub mod rf;
pub mod slice_selection;
pub mod trap;

pub use crate::cartesian::{CartesianConfig, CartesianEncoding};
pub use crate::error::{Error, Result};
pub use crate::gradient_echo::{GradientEcho, GradientEchoConfig};
pub use crate::limits::{GAMMA, GradientLimits};
pub use crate::rf::{PulseKind, PulseShape, SelectivePulse};
pub use crate::slice_selection::{SliceSelection, SliceSelectionConfig};
pub use crate::trap::TrapGradient;
