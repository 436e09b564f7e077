//! `unless`: keep every left-hand series whose identity does not appear on the
//! right-hand side. Values of surviving series are copied through unchanged.

use std::collections::HashMap;
use std::sync::Arc;

use stepql_core::hash::{signature_func, Signature};
use stepql_core::prelude::{Block, Builder, NodeId, SeriesMeta, StepIter, Tags, VectorMatching};
use stepql_core::Error;

use super::BaseOp;
use crate::traits::{Controller, OpError, Processor};

/// Uses all values from the lhs which do not exist in the rhs.
pub const UNLESS_TYPE: &str = "unless";

/// Descriptor for an `unless` between two upstream nodes.
pub fn new_unless_op(l_node: NodeId, r_node: NodeId, matching: VectorMatching) -> BaseOp {
    BaseOp {
        operator_type: UNLESS_TYPE,
        l_node,
        r_node,
        matching,
        processor_fn: new_unless_node,
    }
}

type SignatureFn = Box<dyn Fn(&Tags) -> Signature + Send + Sync>;

pub struct UnlessNode {
    op: BaseOp,
    controller: Arc<dyn Controller>,
    signature: SignatureFn,
}

pub fn new_unless_node(op: BaseOp, controller: Arc<dyn Controller>) -> Box<dyn Processor> {
    Box::new(UnlessNode::new(op, controller))
}

impl UnlessNode {
    pub fn new(op: BaseOp, controller: Arc<dyn Controller>) -> Self {
        let signature = Box::new(signature_func(&op.matching));
        Self {
            op,
            controller,
            signature,
        }
    }

    pub fn op(&self) -> &BaseOp {
        &self.op
    }
}

impl Processor for UnlessNode {
    fn process(&self, lhs: &dyn Block, rhs: &dyn Block) -> Result<Arc<dyn Block>, OpError> {
        let mut l_iter = lhs.step_iter()?;
        let r_iter = rhs.step_iter()?;

        let steps = l_iter.step_count();
        if steps != r_iter.step_count() {
            return Err(OpError::MismatchedStepCounts {
                left: steps,
                right: r_iter.step_count(),
            });
        }

        let l_series = l_iter.series_meta();
        let l_ids = exclusion(l_series, r_iter.series_meta(), &self.signature);
        let taken: Vec<SeriesMeta> = l_ids.iter().map(|&idx| l_series[idx].clone()).collect();

        #[cfg(feature = "tracing")]
        tracing::trace!(
            op = self.op.operator_type,
            left = l_series.len(),
            right = r_iter.series_meta().len(),
            survivors = l_ids.len(),
            steps,
            "unless exclusion"
        );

        let mut builder = self.controller.block_builder(l_iter.meta().clone(), taken)?;
        builder.add_cols(steps)?;
        add_values_at_indices(&l_ids, l_iter.as_mut(), builder.as_mut())?;

        Ok(builder.build())
    }
}

/// Copy the values at `indices` from every step of `iter` into `builder`,
/// one builder row per step.
fn add_values_at_indices(
    indices: &[usize],
    iter: &mut (dyn StepIter + '_),
    builder: &mut (dyn Builder + '_),
) -> Result<(), OpError> {
    let mut row = 0;
    while iter.next() {
        let step = iter.current()?;
        let values = step.values();
        for &idx in indices {
            let value = values.get(idx).copied().ok_or_else(|| {
                Error::Invariant(format!(
                    "step {row} has {} values, series index {idx} requested",
                    values.len()
                ))
            })?;
            builder.append_value(row, value);
        }
        row += 1;
    }
    Ok(())
}

/// Indices into `lhs` of series whose signature does not occur in `rhs`,
/// ascending.
///
/// Left series sharing a signature collapse onto the last of them: only that
/// index can survive.
pub fn exclusion<F>(lhs: &[SeriesMeta], rhs: &[SeriesMeta], signature: F) -> Vec<usize>
where
    F: Fn(&Tags) -> Signature,
{
    // `None` marks a signature seen on the right.
    let mut left_sigs: HashMap<Signature, Option<usize>> = HashMap::with_capacity(lhs.len());
    for (idx, meta) in lhs.iter().enumerate() {
        left_sigs.insert(signature(&meta.tags), Some(idx));
    }

    for meta in rhs {
        if let Some(slot) = left_sigs.get_mut(&signature(&meta.tags)) {
            *slot = None;
        }
    }

    let mut unique_left = Vec::with_capacity(left_sigs.len());
    unique_left.extend(left_sigs.into_values().flatten());
    // Map iteration order is arbitrary.
    unique_left.sort_unstable();
    unique_left
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use stepql_core::prelude::{BlockMeta, Bounds, ColumnBlock, ColumnBlockBuilder, Step};

    fn series(pairs: &[(&str, &str)]) -> SeriesMeta {
        SeriesMeta::new("m", pairs.iter().copied().collect())
    }

    fn block(steps: usize, rows: Vec<(SeriesMeta, Vec<f64>)>) -> ColumnBlock {
        let meta = BlockMeta {
            bounds: Bounds::new(0, steps as i64 * 10, 10),
            tags: Tags::new(),
        };
        ColumnBlock::from_series(meta, steps, rows).unwrap()
    }

    fn rows_of(block: &dyn Block) -> (Vec<SeriesMeta>, Vec<Vec<f64>>) {
        let mut iter = block.step_iter().unwrap();
        let metas = iter.series_meta().to_vec();
        let mut steps = Vec::new();
        while iter.next() {
            steps.push(iter.current().unwrap().values().to_vec());
        }
        (metas, steps)
    }

    #[derive(Default)]
    struct TestController {
        builders: AtomicUsize,
        fail_builder: bool,
        fail_cols: bool,
    }

    struct NoColsBuilder;

    impl Builder for NoColsBuilder {
        fn add_cols(&mut self, num: usize) -> stepql_core::Result<()> {
            Err(Error::StepLimit {
                requested: num,
                limit: 0,
            })
        }
        fn append_value(&mut self, _row: usize, _value: f64) {}
        fn build(self: Box<Self>) -> Arc<dyn Block> {
            Arc::new(ColumnBlock::default())
        }
    }

    impl Controller for TestController {
        fn block_builder(
            &self,
            meta: BlockMeta,
            series_meta: Vec<SeriesMeta>,
        ) -> stepql_core::Result<Box<dyn Builder>> {
            self.builders.fetch_add(1, Ordering::SeqCst);
            if self.fail_builder {
                return Err(Error::SeriesLimit {
                    requested: series_meta.len(),
                    limit: 0,
                });
            }
            if self.fail_cols {
                return Ok(Box::new(NoColsBuilder));
            }
            Ok(Box::new(ColumnBlockBuilder::new(meta, series_meta)))
        }
    }

    fn node(ctrl: Arc<TestController>, matching: VectorMatching) -> Box<dyn Processor> {
        new_unless_op(NodeId::new(1), NodeId::new(2), matching).processor(ctrl)
    }

    /// Block whose step iterator fails on open or at one step, or drops the
    /// last value of every step.
    struct FlakyBlock {
        inner: ColumnBlock,
        fail_open: bool,
        fail_at: Option<usize>,
        short_values: bool,
    }

    struct FlakyIter<'a> {
        inner: Box<dyn StepIter + 'a>,
        pos: usize,
        fail_at: Option<usize>,
        short_values: bool,
    }

    impl Block for FlakyBlock {
        fn step_iter(&self) -> stepql_core::Result<Box<dyn StepIter + '_>> {
            if self.fail_open {
                return Err(Error::Storage("cannot open".into()));
            }
            Ok(Box::new(FlakyIter {
                inner: self.inner.step_iter()?,
                pos: 0,
                fail_at: self.fail_at,
                short_values: self.short_values,
            }))
        }
    }

    impl StepIter for FlakyIter<'_> {
        fn next(&mut self) -> bool {
            self.pos += 1;
            self.inner.next()
        }
        fn current(&self) -> stepql_core::Result<Step<'_>> {
            if let Some(at) = self.fail_at.filter(|&at| at + 1 == self.pos) {
                return Err(Error::Storage(format!("step {at} lost")));
            }
            let step = self.inner.current()?;
            if self.short_values {
                let keep = step.values.len().saturating_sub(1);
                return Ok(Step {
                    time: step.time,
                    values: &step.values[..keep],
                });
            }
            Ok(step)
        }
        fn step_count(&self) -> usize {
            self.inner.step_count()
        }
        fn series_meta(&self) -> &[SeriesMeta] {
            self.inner.series_meta()
        }
        fn meta(&self) -> &BlockMeta {
            self.inner.meta()
        }
    }

    #[test]
    fn exclusion_keeps_unmatched_left_in_order() {
        let f = signature_func(&VectorMatching::default());
        let lhs = vec![
            series(&[("host", "a")]),
            series(&[("host", "b")]),
            series(&[("host", "c")]),
            series(&[("host", "d")]),
        ];
        let rhs = vec![series(&[("host", "c")]), series(&[("host", "a")]), series(&[("host", "z")])];
        assert_eq!(exclusion(&lhs, &rhs, &f), vec![1, 3]);
    }

    #[test]
    fn exclusion_empty_sides() {
        let f = signature_func(&VectorMatching::default());
        let lhs = vec![series(&[("host", "a")]), series(&[("host", "b")])];
        assert_eq!(exclusion(&[], &lhs, &f), Vec::<usize>::new());
        assert_eq!(exclusion(&lhs, &[], &f), vec![0, 1]);
        assert_eq!(exclusion(&lhs, &lhs, &f), Vec::<usize>::new());
    }

    #[test]
    fn duplicate_left_signatures_collapse_to_last() {
        let f = signature_func(&VectorMatching::on(["tag"]));
        let lhs = vec![
            series(&[("tag", "x"), ("id", "A")]),
            series(&[("tag", "y"), ("id", "B")]),
            series(&[("tag", "x"), ("id", "C")]),
        ];
        // A is dropped even though nothing on the right excludes it.
        assert_eq!(exclusion(&lhs, &[], &f), vec![1, 2]);
        assert_eq!(exclusion(&lhs, &[series(&[("tag", "x")])], &f), vec![1]);
    }

    #[test]
    fn exclusion_is_deterministic_across_runs() {
        let f = signature_func(&VectorMatching::on(["k"]));
        let lhs: Vec<_> = (0..64)
            .map(|i| series(&[("k", i.to_string().as_str())]))
            .collect();
        let rhs: Vec<_> = (0..64)
            .filter(|i| i % 3 == 0)
            .map(|i| series(&[("k", i.to_string().as_str())]))
            .collect();
        let first = exclusion(&lhs, &rhs, &f);
        let expected: Vec<usize> = (0..64).filter(|i| i % 3 != 0).collect();
        assert_eq!(first, expected);
        for _ in 0..10 {
            assert_eq!(exclusion(&lhs, &rhs, &f), first);
        }
    }

    #[test]
    fn process_copies_surviving_values() {
        let ctrl = Arc::new(TestController::default());
        let lhs = block(
            3,
            vec![
                (series(&[("host", "a"), ("dc", "1")]), vec![1.0, 2.0, 3.0]),
                (series(&[("host", "b"), ("dc", "1")]), vec![4.0, 5.0, 6.0]),
                (series(&[("host", "c"), ("dc", "1")]), vec![7.0, 8.0, 9.0]),
            ],
        );
        let rhs = block(3, vec![(series(&[("host", "b"), ("dc", "2")]), vec![0.0; 3])]);

        let out = node(ctrl.clone(), VectorMatching::ignoring(["dc"]))
            .process(&lhs, &rhs)
            .unwrap();
        let (metas, steps) = rows_of(out.as_ref());
        assert_eq!(
            metas,
            vec![
                series(&[("host", "a"), ("dc", "1")]),
                series(&[("host", "c"), ("dc", "1")]),
            ]
        );
        assert_eq!(steps, vec![vec![1.0, 7.0], vec![2.0, 8.0], vec![3.0, 9.0]]);
        assert_eq!(ctrl.builders.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_right_is_a_no_op() {
        let ctrl = Arc::new(TestController::default());
        let lhs = block(
            2,
            vec![
                (series(&[("host", "a")]), vec![1.0, 2.0]),
                (series(&[("host", "b")]), vec![3.0, f64::INFINITY]),
            ],
        );
        let rhs = block(2, vec![]);
        let out = node(ctrl, VectorMatching::default())
            .process(&lhs, &rhs)
            .unwrap();
        assert_eq!(rows_of(out.as_ref()), rows_of(&lhs));
    }

    #[test]
    fn full_exclusion_keeps_step_count() {
        let ctrl = Arc::new(TestController::default());
        let lhs = block(4, vec![(series(&[("host", "a")]), vec![1.0; 4])]);
        let rhs = block(4, vec![(series(&[("host", "a")]), vec![9.0; 4])]);
        let out = node(ctrl, VectorMatching::default())
            .process(&lhs, &rhs)
            .unwrap();
        let iter = out.step_iter().unwrap();
        assert_eq!(iter.step_count(), 4);
        assert!(iter.series_meta().is_empty());
        assert_eq!(iter.meta(), lhs.meta());
    }

    #[test]
    fn empty_left_yields_empty_block() {
        let ctrl = Arc::new(TestController::default());
        let lhs = block(3, vec![]);
        let rhs = block(3, vec![(series(&[("host", "a")]), vec![1.0; 3])]);
        let out = node(ctrl, VectorMatching::default())
            .process(&lhs, &rhs)
            .unwrap();
        let (metas, steps) = rows_of(out.as_ref());
        assert!(metas.is_empty());
        assert_eq!(steps.len(), 3);
    }

    #[test]
    fn mismatched_step_counts_build_nothing() {
        let ctrl = Arc::new(TestController::default());
        let lhs = block(5, vec![(series(&[("host", "a")]), vec![1.0; 5])]);
        let rhs = block(6, vec![]);
        let err = node(ctrl.clone(), VectorMatching::default())
            .process(&lhs, &rhs)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            OpError::MismatchedStepCounts { left: 5, right: 6 }
        ));
        assert_eq!(ctrl.builders.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn iterator_open_errors_pass_through() {
        let ctrl = Arc::new(TestController::default());
        let good = block(2, vec![]);
        let bad = FlakyBlock {
            inner: block(2, vec![]),
            fail_open: true,
            fail_at: None,
            short_values: false,
        };
        let p = node(ctrl.clone(), VectorMatching::default());
        for err in [
            p.process(&bad, &good).err().unwrap(),
            p.process(&good, &bad).err().unwrap(),
        ] {
            assert!(matches!(err, OpError::Block(Error::Storage(ref m)) if m == "cannot open"));
        }
        assert_eq!(ctrl.builders.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn step_errors_abort_without_output() {
        let ctrl = Arc::new(TestController::default());
        let lhs = FlakyBlock {
            inner: block(3, vec![(series(&[("host", "a")]), vec![1.0, 2.0, 3.0])]),
            fail_open: false,
            fail_at: Some(1),
            short_values: false,
        };
        let rhs = block(3, vec![]);
        let err = node(ctrl, VectorMatching::default())
            .process(&lhs, &rhs)
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "storage error: step 1 lost");
    }

    #[test]
    fn short_step_values_are_an_invariant_error() {
        let ctrl = Arc::new(TestController::default());
        let lhs = FlakyBlock {
            inner: block(
                2,
                vec![
                    (series(&[("host", "a")]), vec![1.0, 2.0]),
                    (series(&[("host", "b")]), vec![3.0, 4.0]),
                ],
            ),
            fail_open: false,
            fail_at: None,
            short_values: true,
        };
        let rhs = block(2, vec![]);
        let result = node(ctrl.clone(), VectorMatching::default()).process(&lhs, &rhs);
        assert!(matches!(
            result,
            Err(OpError::Block(Error::Invariant(ref m))) if m.contains("series index 1")
        ));
        assert_eq!(ctrl.builders.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn builder_errors_pass_through() {
        let lhs = block(2, vec![(series(&[("host", "a")]), vec![1.0, 2.0])]);
        let rhs = block(2, vec![]);

        let ctrl = Arc::new(TestController {
            fail_builder: true,
            ..Default::default()
        });
        let err = node(ctrl, VectorMatching::default())
            .process(&lhs, &rhs)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            OpError::Block(Error::SeriesLimit {
                requested: 1,
                limit: 0
            })
        ));

        let ctrl = Arc::new(TestController {
            fail_cols: true,
            ..Default::default()
        });
        let err = node(ctrl, VectorMatching::default())
            .process(&lhs, &rhs)
            .err()
            .unwrap();
        assert!(matches!(
            err,
            OpError::Block(Error::StepLimit {
                requested: 2,
                limit: 0
            })
        ));
    }

    #[test]
    fn descriptor_carries_configuration() {
        let op = new_unless_op(NodeId::new(3), NodeId::new(4), VectorMatching::on(["job"]));
        assert_eq!(op.operator_type, UNLESS_TYPE);
        assert_eq!(op.l_node, NodeId::new(3));
        assert_eq!(op.r_node, NodeId::new(4));
        assert_eq!(op.matching, VectorMatching::on(["job"]));

        let n = UnlessNode::new(op, Arc::new(TestController::default()));
        assert_eq!(n.op().matching.matching_labels, vec!["job".to_string()]);
    }
}
