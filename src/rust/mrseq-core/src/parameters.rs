// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::parameter_list::ParameterList;

/// A value stored in a [`ParameterRecord`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Integer(i64),
    Scalar(f64),
    Vector(Vec<f64>),
    Text(String),
    Record(ParameterRecord),
}

impl From<f64> for ParameterValue {
    fn from(value: f64) -> Self {
        ParameterValue::Scalar(value)
    }
}

impl From<i64> for ParameterValue {
    fn from(value: i64) -> Self {
        ParameterValue::Integer(value)
    }
}

impl From<usize> for ParameterValue {
    fn from(value: usize) -> Self {
        ParameterValue::Integer(value as i64)
    }
}

impl From<Vec<f64>> for ParameterValue {
    fn from(value: Vec<f64>) -> Self {
        ParameterValue::Vector(value)
    }
}

impl From<&ParameterList> for ParameterValue {
    fn from(value: &ParameterList) -> Self {
        match value.values() {
            [single] => ParameterValue::Scalar(*single),
            values => ParameterValue::Vector(values.to_vec()),
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(value: &str) -> Self {
        ParameterValue::Text(value.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(value: String) -> Self {
        ParameterValue::Text(value)
    }
}

impl From<ParameterRecord> for ParameterValue {
    fn from(value: ParameterRecord) -> Self {
        ParameterValue::Record(value)
    }
}

/// The required construction parameters of a node, by name, in declaration order.
///
/// This is the archival form of a node: a one-way dump for inspection, there
/// is no loader building a node tree back from it.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct ParameterRecord(IndexMap<String, ParameterValue>);

impl ParameterRecord {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn with(mut self, name: &str, value: impl Into<ParameterValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<ParameterValue>) {
        self.0.insert(name.to_string(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.0.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self).map_err(|err| Error::new(format!("Serialization failed: {err}")))
    }
}

/// Declares the required construction parameters of a composite variant.
///
/// Implemented by the configuration records of protocol building blocks. A
/// composite built from such a record carries the record's parameters and can
/// be serialized; a plain composite cannot.
pub trait RequiredParameters {
    /// Name of the variant, used in error messages.
    const VARIANT: &'static str;

    /// Names of the required parameters, in the order they are serialized.
    const REQUIRED: &'static [&'static str];

    /// Current values of the required parameters.
    ///
    /// Must contain exactly the names in [`Self::REQUIRED`].
    fn parameters(&self) -> ParameterRecord;
}

/// Unwrap a builder field, failing with [`Error::MissingParameter`] if it was not set.
pub fn require<T>(value: Option<T>, variant: &'static str, parameter: &'static str) -> Result<T> {
    value.ok_or(Error::MissingParameter { variant, parameter })
}
