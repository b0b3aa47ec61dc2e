// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Display;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(
        "All parameter lists in loop '{name}' must have the same number of values: expected {expected}, found {found}"
    )]
    LengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("{variant} must declare its required parameters before it can be serialized")]
    UnserializableVariant { variant: &'static str },

    #[error("Missing required parameter '{parameter}' for {variant}")]
    MissingParameter {
        variant: &'static str,
        parameter: &'static str,
    },

    #[error("{variant} does not support '{operation}'")]
    UnsupportedOperation {
        variant: &'static str,
        operation: &'static str,
    },

    #[error("Parameter list {uid} is already iterated by a loop nested inside loop '{name}'")]
    SweepAlreadyBound { name: String, uid: u64 },

    #[error("A parameter list must hold at least one value")]
    EmptyParameterList,

    #[error("Parameter list values must be finite, got {value}")]
    NonFiniteValue { value: f64 },

    #[error("Iteration {index} is out of range for a parameter list of length {len}")]
    IterationOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl Error {
    pub fn new<T>(msg: T) -> Self
    where
        T: Display,
    {
        Error::Anyhow(anyhow::anyhow!(msg.to_string()))
    }
}
