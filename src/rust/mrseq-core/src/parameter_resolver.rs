// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashMap;

use crate::parameter_list::SweepUid;

/// Iteration state of the loops enclosing a node during rendering.
///
/// Each loop opens a [`child_scope`](Self::child_scope) and sets the
/// iteration of the lists it registered, so the state never leaks to
/// siblings or outer levels of the tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterResolver {
    iteration: HashMap<SweepUid, usize>,
}

impl ParameterResolver {
    pub fn new() -> Self {
        Self {
            iteration: HashMap::new(),
        }
    }

    pub fn set_iteration(&mut self, param: SweepUid, index: usize) {
        self.iteration.insert(param, index);
    }

    /// The active index of the given list, `None` outside of its loop.
    pub fn current_iteration(&self, param: &SweepUid) -> Option<usize> {
        self.iteration.get(param).copied()
    }

    pub fn child_scope(&self) -> Self {
        Self {
            iteration: self.iteration.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.iteration.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_scope_does_not_leak() {
        let mut outer = ParameterResolver::new();
        outer.set_iteration(SweepUid(1), 3);
        let mut inner = outer.child_scope();
        inner.set_iteration(SweepUid(2), 5);
        inner.set_iteration(SweepUid(1), 4);

        assert_eq!(inner.current_iteration(&SweepUid(1)), Some(4));
        assert_eq!(inner.current_iteration(&SweepUid(2)), Some(5));
        assert_eq!(outer.current_iteration(&SweepUid(1)), Some(3));
        assert_eq!(outer.current_iteration(&SweepUid(2)), None);
    }
}
