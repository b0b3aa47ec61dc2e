// Copyright 2025 Zurich Instruments AG
// SPDX-License-Identifier: Apache-2.0

use crate::error::{Error, Result};
use crate::node::Node;
use crate::parameters::{ParameterRecord, RequiredParameters};
use crate::timing::Timing;

/// An ordered container of nodes.
///
/// A composite never derives its duration or anchor from its children; both
/// are set by the caller, typically after the durations of the parts have been
/// negotiated. During rendering each child's anchor is aligned to the
/// composite's anchor, offset by the child's own `time`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Composite {
    name: Option<String>,
    timing: Timing,
    children: Vec<Node>,
    parameters: Option<ParameterRecord>,
}

impl Composite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> CompositeBuilder {
        CompositeBuilder::new()
    }

    /// Append a child. Children are rendered in the order they were added.
    pub fn add(&mut self, child: impl Into<Node>) {
        self.children.push(child.into());
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn dur(&self) -> f64 {
        self.timing.dur
    }

    pub fn anchor(&self) -> f64 {
        self.timing.anchor
    }

    pub fn time(&self) -> f64 {
        self.timing.time
    }

    pub fn with_dur(mut self, dur: f64) -> Self {
        self.timing.dur = dur;
        self
    }

    pub fn with_anchor(mut self, anchor: f64) -> Self {
        self.timing.anchor = anchor;
        self
    }

    pub fn with_time(mut self, time: f64) -> Self {
        self.timing.time = time;
        self
    }

    pub fn parameters(&self) -> Option<&ParameterRecord> {
        self.parameters.as_ref()
    }

    /// Effective placement of `child` when this composite sits at `time`.
    ///
    /// The child's anchor lands on the composite's anchor, shifted by the
    /// child's own relative placement.
    pub fn child_time(&self, child: &Node, time: f64) -> f64 {
        child.time() + time - child.anchor() + self.anchor()
    }

    /// Rebuild every child in order. The composite's own timing is kept.
    pub fn build(&self) -> Result<Composite> {
        let children = self
            .children
            .iter()
            .map(Node::build)
            .collect::<Result<Vec<_>>>()?;
        Ok(Composite {
            children,
            ..self.clone()
        })
    }

    pub fn serialize(&self) -> Result<ParameterRecord> {
        self.parameters
            .clone()
            .ok_or(Error::UnserializableVariant {
                variant: "Composite",
            })
    }
}

pub struct CompositeBuilder {
    inner: Composite,
    declared: Option<(&'static str, &'static [&'static str])>,
}

impl CompositeBuilder {
    pub fn new() -> Self {
        Self {
            inner: Composite::default(),
            declared: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.inner.name = Some(name.into());
        self
    }

    pub fn dur(mut self, dur: f64) -> Self {
        self.inner.timing.dur = dur;
        self
    }

    pub fn anchor(mut self, anchor: f64) -> Self {
        self.inner.timing.anchor = anchor;
        self
    }

    pub fn time(mut self, time: f64) -> Self {
        self.inner.timing.time = time;
        self
    }

    pub fn child(mut self, child: impl Into<Node>) -> Self {
        self.inner.add(child);
        self
    }

    pub fn children<I, N>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Node>,
    {
        for child in children {
            self.inner.add(child);
        }
        self
    }

    /// Attach the required construction parameters of a composite variant.
    pub fn parameters<P: RequiredParameters>(mut self, config: &P) -> Self {
        self.inner.parameters = Some(config.parameters());
        self.declared = Some((P::VARIANT, P::REQUIRED));
        self
    }

    pub fn build(self) -> Result<Composite> {
        if let (Some((variant, required)), Some(record)) =
            (self.declared, self.inner.parameters.as_ref())
        {
            for &parameter in required {
                if record.get(parameter).is_none() {
                    return Err(Error::MissingParameter { variant, parameter });
                }
            }
        }
        Ok(self.inner)
    }
}

impl Default for CompositeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leaf::Axis;
    use crate::parameter_list::ParameterList;
    use crate::render::render;
    use crate::sweep_loop::Loop;
    use crate::test_utils::{FailingRenderer, TraceRenderer, acquisition, gradient, pulse};

    #[test]
    fn test_anchor_alignment() {
        let child = gradient(4.0, Axis::Read, 1.0).with_anchor(2.0).with_time(1.0);
        let parent = Composite::builder()
            .dur(6.0)
            .anchor(3.0)
            .time(10.0)
            .child(child)
            .build()
            .unwrap();
        assert_eq!(parent.child_time(&parent.children()[0], parent.time()), 12.0);

        let mut renderer = TraceRenderer::default();
        render(&parent.into(), &mut renderer).unwrap();
        assert_eq!(renderer.gradients, vec![(12.0, 1.0)]);
    }

    #[test]
    fn test_loop_anchor_aligned_in_parent() {
        let values = ParameterList::new(vec![1.0, 2.0]).unwrap();
        let sweep = Loop::builder(gradient(1.0, Axis::Read, &values))
            .add_list(&values)
            .anchor(1.5)
            .build()
            .unwrap();
        let parent = Composite::builder()
            .dur(6.0)
            .anchor(4.0)
            .child(sweep)
            .build()
            .unwrap();
        assert_eq!(parent.child_time(&parent.children()[0], 0.0), 2.5);

        let mut renderer = TraceRenderer::default();
        render(&parent.into(), &mut renderer).unwrap();
        assert_eq!(renderer.gradients, vec![(2.5, 1.0), (3.5, 2.0)]);
    }

    #[test]
    fn test_nested_alignment() {
        let inner = Composite::builder()
            .anchor(1.0)
            .time(2.0)
            .child(gradient(2.0, Axis::Slice, 1.0).with_anchor(1.0))
            .build()
            .unwrap();
        let outer = Composite::builder()
            .anchor(5.0)
            .child(inner)
            .build()
            .unwrap();
        let mut renderer = TraceRenderer::default();
        render(&outer.into(), &mut renderer).unwrap();
        // inner: 2 + 0 - 1 + 5 = 6; leaf: 0 + 6 - 1 + 1 = 6
        assert_eq!(renderer.gradients, vec![(6.0, 1.0)]);
    }

    #[test]
    fn test_children_rendered_in_append_order() {
        let mut composite = Composite::new();
        composite.add(gradient(1.0, Axis::Read, 1.0).with_time(5.0));
        composite.add(pulse(2.0));
        composite.add(gradient(1.0, Axis::Read, 2.0).with_time(-3.0));
        composite.add(acquisition(4));
        let mut renderer = TraceRenderer::default();
        render(&composite.into(), &mut renderer).unwrap();
        assert_eq!(renderer.gradients, vec![(5.0, 1.0), (-3.0, 2.0)]);
        // pulse anchor 1.0, acquisition anchor 1.0
        assert_eq!(renderer.others, vec![-1.0, -1.0]);
    }

    #[test]
    fn test_children_unchanged_after_render() {
        let composite = Composite::builder()
            .anchor(3.0)
            .time(10.0)
            .child(gradient(4.0, Axis::Read, 1.0).with_anchor(2.0).with_time(1.0))
            .child(gradient(4.0, Axis::Phase, 1.0).with_anchor(1.0).with_time(-1.0))
            .build()
            .unwrap();
        let before = composite.children().to_vec();
        let node: Node = composite.into();

        let mut renderer = TraceRenderer::default();
        render(&node, &mut renderer).unwrap();
        let Node::Composite(obj) = &node else {
            unreachable!()
        };
        assert_eq!(obj.children(), before.as_slice());

        let mut failing = FailingRenderer {
            fail_at: 2,
            visited: 0,
        };
        assert!(render(&node, &mut failing).is_err());
        assert_eq!(failing.visited, 2);
        assert_eq!(obj.children(), before.as_slice());
        assert_eq!(obj.children()[0].time(), 1.0);
        assert_eq!(obj.children()[1].time(), -1.0);
    }

    #[test]
    fn test_build_keeps_own_timing_and_is_idempotent() {
        let composite = Composite::builder()
            .dur(7.5)
            .anchor(0.25)
            .child(gradient(1.0, Axis::Read, 1.0))
            .build()
            .unwrap();
        let first = composite.build().unwrap();
        let second = first.build().unwrap();
        assert_eq!(first, composite);
        assert_eq!(first, second);
        assert_eq!(second.dur().to_bits(), 7.5f64.to_bits());
        assert_eq!(second.anchor().to_bits(), 0.25f64.to_bits());
    }

    #[test]
    fn test_plain_composite_is_not_serializable() {
        let err = Composite::new().serialize().unwrap_err();
        assert!(matches!(
            err,
            Error::UnserializableVariant {
                variant: "Composite"
            }
        ));
    }

    struct Block {
        thk: f64,
        complete: bool,
    }

    impl RequiredParameters for Block {
        const VARIANT: &'static str = "Block";
        const REQUIRED: &'static [&'static str] = &["thk", "flip"];

        fn parameters(&self) -> ParameterRecord {
            let record = ParameterRecord::new().with("thk", self.thk);
            if self.complete {
                record.with("flip", 20.0)
            } else {
                record
            }
        }
    }

    #[test]
    fn test_declared_composite_serializes() {
        let composite = Composite::builder()
            .parameters(&Block {
                thk: 5.0,
                complete: true,
            })
            .build()
            .unwrap();
        let record = Node::from(composite).serialize().unwrap();
        assert_eq!(record.names().collect::<Vec<_>>(), ["thk", "flip"]);
    }

    #[test]
    fn test_declared_composite_missing_parameter() {
        let err = Composite::builder()
            .parameters(&Block {
                thk: 5.0,
                complete: false,
            })
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            Error::MissingParameter {
                variant: "Block",
                parameter: "flip"
            }
        ));
    }
}
