// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::fmt::{self, Display, Formatter};
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};
use crate::parameter_resolver::ParameterResolver;

/// Identity of a parameter list.
///
/// Clones of a [`ParameterList`] share the identity, which is what a loop
/// binds to. Lists derived through arithmetic get a fresh identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub struct SweepUid(pub u64);

impl SweepUid {
    fn next() -> Self {
        static NEXT_UID: AtomicU64 = AtomicU64::new(0);
        SweepUid(NEXT_UID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Display for SweepUid {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "sweep#{}", self.0)
    }
}

/// An ordered, non-empty sweep of numeric values.
///
/// Outside of a loop context the list resolves to its peak value (largest
/// magnitude, first occurrence wins), which is what feasibility checks and
/// waveform sizing need before any iteration exists. Inside a loop that
/// registered the list, it resolves to the entry of the current iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterList {
    uid: SweepUid,
    values: Arc<[f64]>,
}

impl ParameterList {
    pub fn new<T: Into<Vec<f64>>>(values: T) -> Result<Self> {
        let values: Vec<f64> = values.into();
        if values.is_empty() {
            return Err(Error::EmptyParameterList);
        }
        if let Some(&value) = values.iter().find(|v| !v.is_finite()) {
            return Err(Error::NonFiniteValue { value });
        }
        Ok(Self::from_values(values))
    }

    /// A single-valued list, the form scalar construction parameters take.
    pub fn scalar(value: f64) -> Self {
        Self::from_values(vec![value])
    }

    /// Evenly spaced values `start, start + 1, ...` below `stop`.
    pub fn arange(start: f64, stop: f64) -> Result<Self> {
        if let Some(value) = [start, stop].into_iter().find(|v| !v.is_finite()) {
            return Err(Error::NonFiniteValue { value });
        }
        let count = (stop - start).ceil().max(0.0) as usize;
        Self::new((0..count).map(|i| start + i as f64).collect::<Vec<_>>())
    }

    fn from_values(values: Vec<f64>) -> Self {
        Self {
            uid: SweepUid::next(),
            values: values.into(),
        }
    }

    pub fn uid(&self) -> SweepUid {
        self.uid
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn value_at_index(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// The value of the list when no loop drives it.
    ///
    /// Lists from [`ParameterList::new`] hold finite values only. A NaN
    /// produced by arithmetic never compares larger and is skipped.
    pub fn value(&self) -> f64 {
        let mut peak = self.values[0];
        for &value in self.values.iter().skip(1) {
            if value.abs() > peak.abs() {
                peak = value;
            }
        }
        peak
    }

    /// Resolve the value of the list for the iteration state in `resolver`.
    pub fn resolve(&self, resolver: &ParameterResolver) -> Result<f64> {
        match resolver.current_iteration(&self.uid) {
            Some(index) => self
                .value_at_index(index)
                .ok_or(Error::IterationOutOfRange {
                    index,
                    len: self.len(),
                }),
            None => Ok(self.value()),
        }
    }

    /// Apply `f` element-wise, returning a new unbound list.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self::from_values(self.values.iter().map(|v| f(*v)).collect())
    }

    /// Combine two lists element-wise, broadcasting single-valued lists.
    ///
    /// The result is a new list that no loop drives.
    pub fn try_zip_with(&self, other: &ParameterList, f: impl Fn(f64, f64) -> f64) -> Result<Self> {
        let values = match (self.len(), other.len()) {
            (a, b) if a == b => self
                .values
                .iter()
                .zip(other.values.iter())
                .map(|(a, b)| f(*a, *b))
                .collect(),
            (_, 1) => self.values.iter().map(|a| f(*a, other.values[0])).collect(),
            (1, _) => other.values.iter().map(|b| f(self.values[0], *b)).collect(),
            (a, b) => {
                return Err(Error::new(format!(
                    "Cannot broadcast parameter lists of length {a} and {b}"
                )));
            }
        };
        Ok(Self::from_values(values))
    }
}

impl From<f64> for ParameterList {
    fn from(value: f64) -> Self {
        ParameterList::scalar(value)
    }
}

impl From<&ParameterList> for ParameterList {
    fn from(value: &ParameterList) -> Self {
        value.clone()
    }
}

impl TryFrom<Vec<f64>> for ParameterList {
    type Error = Error;

    fn try_from(value: Vec<f64>) -> Result<Self> {
        ParameterList::new(value)
    }
}

/// Implements an arithmetic operator for lists and scalars.
///
/// List-with-list operators panic if the lengths cannot be broadcast, use
/// [`ParameterList::try_zip_with`] for the fallible form.
macro_rules! impl_list_arithmetic {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<f64> for &ParameterList {
            type Output = ParameterList;

            fn $method(self, rhs: f64) -> ParameterList {
                self.map(|v| v $op rhs)
            }
        }

        impl $trait<f64> for ParameterList {
            type Output = ParameterList;

            fn $method(self, rhs: f64) -> ParameterList {
                (&self).$method(rhs)
            }
        }

        impl $trait<&ParameterList> for f64 {
            type Output = ParameterList;

            fn $method(self, rhs: &ParameterList) -> ParameterList {
                rhs.map(|v| self $op v)
            }
        }

        impl $trait<ParameterList> for f64 {
            type Output = ParameterList;

            fn $method(self, rhs: ParameterList) -> ParameterList {
                self.$method(&rhs)
            }
        }

        impl $trait<&ParameterList> for &ParameterList {
            type Output = ParameterList;

            fn $method(self, rhs: &ParameterList) -> ParameterList {
                match self.try_zip_with(rhs, |a, b| a $op b) {
                    Ok(list) => list,
                    Err(err) => panic!("{err}"),
                }
            }
        }

        impl $trait<ParameterList> for ParameterList {
            type Output = ParameterList;

            fn $method(self, rhs: ParameterList) -> ParameterList {
                (&self).$method(&rhs)
            }
        }
    };
}

impl_list_arithmetic!(Add, add, +);
impl_list_arithmetic!(Sub, sub, -);
impl_list_arithmetic!(Mul, mul, *);
impl_list_arithmetic!(Div, div, /);

impl Neg for &ParameterList {
    type Output = ParameterList;

    fn neg(self) -> ParameterList {
        self.map(|v| -v)
    }
}

impl Neg for ParameterList {
    type Output = ParameterList;

    fn neg(self) -> ParameterList {
        -&self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn list(values: &[f64]) -> ParameterList {
        ParameterList::new(values.to_vec()).unwrap()
    }

    #[test]
    fn test_value_is_peak_magnitude() {
        assert_eq!(list(&[-3.0, 5.0, 2.0]).value(), 5.0);
        assert_eq!(list(&[-7.0, 5.0, 2.0]).value(), -7.0);
    }

    #[test]
    fn test_value_tie_prefers_first_index() {
        assert_eq!(list(&[-5.0, 5.0, 0.0]).value(), -5.0);
        assert_eq!(list(&[5.0, -5.0, 0.0]).value(), 5.0);
    }

    #[test]
    fn test_empty_list_is_rejected() {
        assert!(matches!(
            ParameterList::new(Vec::<f64>::new()),
            Err(Error::EmptyParameterList)
        ));
    }

    #[test]
    fn test_scalar_wrap() {
        let l: ParameterList = 3.5.into();
        assert_eq!(l.values(), &[3.5]);
        assert_eq!(l.value(), 3.5);
    }

    #[test]
    fn test_arange() {
        assert_eq!(ParameterList::arange(0.0, 3.0).unwrap().values(), &[0.0, 1.0, 2.0]);
        assert_eq!(ParameterList::arange(-31.0, 33.0).unwrap().len(), 64);
        assert!(ParameterList::arange(0.0, 0.0).is_err());
    }

    #[test]
    fn test_arange_rejects_unbounded_range() {
        assert!(matches!(
            ParameterList::arange(0.0, f64::INFINITY),
            Err(Error::NonFiniteValue { .. })
        ));
        assert!(matches!(
            ParameterList::arange(f64::NAN, 3.0),
            Err(Error::NonFiniteValue { .. })
        ));
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        assert!(matches!(
            ParameterList::new(vec![1.0, f64::NAN, -2.0]),
            Err(Error::NonFiniteValue { .. })
        ));
        assert!(ParameterList::new(vec![f64::NEG_INFINITY]).is_err());
    }

    #[test]
    fn test_resolve_uses_iteration_of_own_identity() {
        let a = list(&[1.0, 2.0, 3.0]);
        let b = list(&[-9.0, 0.0, 0.0]);
        let mut resolver = ParameterResolver::new();
        resolver.set_iteration(a.uid(), 1);
        assert_eq!(a.resolve(&resolver).unwrap(), 2.0);
        // Not driven by the resolver, falls back to the peak
        assert_eq!(b.resolve(&resolver).unwrap(), -9.0);
        // Clones share the identity
        assert_eq!(a.clone().resolve(&resolver).unwrap(), 2.0);
    }

    #[test]
    fn test_resolve_out_of_range() {
        let a = list(&[1.0, 2.0]);
        let mut resolver = ParameterResolver::new();
        resolver.set_iteration(a.uid(), 2);
        assert!(matches!(
            a.resolve(&resolver),
            Err(Error::IterationOutOfRange { index: 2, len: 2 })
        ));
    }

    #[test]
    fn test_arithmetic_returns_unbound_list() {
        let a = list(&[1.0, -2.0, 4.0]);
        let scaled = &a * 2.0;
        assert_eq!(scaled.values(), &[2.0, -4.0, 8.0]);
        assert_ne!(scaled.uid(), a.uid());

        let mut resolver = ParameterResolver::new();
        resolver.set_iteration(a.uid(), 0);
        // The derived list is not driven by the iteration of its operand
        assert_eq!(scaled.resolve(&resolver).unwrap(), 8.0);

        assert_eq!((-2.0 * &a).values(), &[-2.0, 4.0, -8.0]);
        assert_eq!((&a + 1.0).values(), &[2.0, -1.0, 5.0]);
        assert_eq!((&a - 1.0).values(), &[0.0, -3.0, 3.0]);
        assert_eq!((&a / 2.0).values(), &[0.5, -1.0, 2.0]);
        assert_eq!((-&a).values(), &[-1.0, 2.0, -4.0]);
    }

    #[test]
    fn test_list_arithmetic_broadcasts() {
        let a = list(&[1.0, 2.0, 3.0]);
        let b = list(&[10.0, 20.0, 30.0]);
        let one = list(&[2.0]);
        assert_eq!((&a + &b).values(), &[11.0, 22.0, 33.0]);
        assert_eq!((&a * &one).values(), &[2.0, 4.0, 6.0]);
        assert_eq!((&one - &a).values(), &[1.0, 0.0, -1.0]);
        assert!(a.try_zip_with(&list(&[1.0, 2.0]), |x, y| x + y).is_err());
    }

    #[test]
    #[should_panic(expected = "Cannot broadcast")]
    fn test_list_arithmetic_panics_on_incompatible_lengths() {
        let _ = list(&[1.0, 2.0, 3.0]) + list(&[1.0, 2.0]);
    }

    proptest! {
        #[test]
        fn prop_value_has_maximal_magnitude(values in prop::collection::vec(-1e3f64..1e3, 1..32)) {
            let l = ParameterList::new(values.clone()).unwrap();
            let peak = l.value();
            let first = values.iter().position(|v| *v == peak).unwrap();
            for (i, v) in values.iter().enumerate() {
                prop_assert!(v.abs() <= peak.abs());
                if i < first {
                    prop_assert!(v.abs() < peak.abs());
                }
            }
        }
    }
}
