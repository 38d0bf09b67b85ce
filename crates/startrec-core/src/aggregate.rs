//! Cross-query aggregation.
//!
//! Per-query results are folded into a [`Summary`] that keeps only a sum and
//! a count per measure label. Summaries built on different threads can be
//! merged in any order, and the final value does not depend on which query
//! was added first beyond floating-point summation order.

use crate::evaluate::QueryEvaluation;
use crate::measures::{Measure, MeasureKind, Reduction};
use crate::result::{Cutoff, MeasureResult};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Running sum and count for one measure label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Accumulator {
    pub sum: f64,
    pub count: usize,
}

impl Accumulator {
    pub fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn merge(&mut self, other: &Accumulator) {
        self.sum += other.sum;
        self.count += other.count;
    }

    /// Final value under `reduction`; 0.0 when nothing was added.
    pub fn finish(&self, reduction: Reduction) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        match reduction {
            Reduction::Mean => self.sum / self.count as f64,
            Reduction::Sum => self.sum,
            Reduction::GeometricMean => (self.sum / self.count as f64).exp(),
        }
    }
}

/// Measure and evaluation point; orders entries by catalogue, then cutoff.
type Key = (MeasureKind, Option<Cutoff>);

#[derive(Debug, Clone)]
struct Entry {
    label: String,
    reduction: Reduction,
    acc: Accumulator,
}

/// One aggregated measure value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateValue {
    pub label: String,
    pub value: f64,
    /// Number of queries that contributed
    pub queries: usize,
}

/// Order-independent aggregate over many queries.
///
/// Entries are reported in catalogue order, then by cutoff.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    entries: BTreeMap<Key, Entry>,
    queries: usize,
}

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one query's result for one measure.
    ///
    /// Call at most once per query and measure; [`Summary::add_query`]
    /// takes care of that for a whole [`QueryEvaluation`].
    pub fn add(&mut self, measure: &Measure, result: &MeasureResult) {
        let reduction = measure.reduction();
        for (key, label, value) in points(measure, result) {
            self.entry(key, label, reduction).add(value);
        }
    }

    /// Adds every result of one query and counts the query.
    ///
    /// A point reported by two measures (`P` and `P@10` both give `P_10`)
    /// contributes once.
    pub fn add_query(&mut self, evaluation: &QueryEvaluation) {
        let mut seen = HashSet::new();
        for (measure, result) in evaluation.results() {
            let reduction = measure.reduction();
            for (key, label, value) in points(measure, result) {
                if seen.insert(key) {
                    self.entry(key, label, reduction).add(value);
                }
            }
        }
        self.queries += 1;
    }

    /// Folds another summary into this one.
    pub fn merge(&mut self, other: Summary) {
        for (key, entry) in other.entries {
            self.entry(key, entry.label, entry.reduction)
                .merge(&entry.acc);
        }
        self.queries += other.queries;
    }

    /// Number of queries added through [`Summary::add_query`].
    pub fn num_queries(&self) -> usize {
        self.queries
    }

    /// Final aggregated values.
    pub fn finish(&self) -> Vec<AggregateValue> {
        self.entries
            .values()
            .map(|e| AggregateValue {
                label: e.label.clone(),
                value: e.acc.finish(e.reduction),
                queries: e.acc.count,
            })
            .collect()
    }

    fn entry(
        &mut self,
        key: Key,
        label: String,
        reduction: Reduction,
    ) -> &mut Accumulator {
        &mut self
            .entries
            .entry(key)
            .or_insert_with(|| Entry {
                label,
                reduction,
                acc: Accumulator::default(),
            })
            .acc
    }
}

/// Flattens one result into keyed, labelled values.
fn points(measure: &Measure, result: &MeasureResult) -> Vec<(Key, String, f64)> {
    let kind = measure.kind();
    match result {
        MeasureResult::Value(v) => vec![((kind, measure.cutoff()), measure.label(), *v)],
        MeasureResult::Sweep(points) => points
            .iter()
            .map(|p| {
                let label = format!("{}_{}", measure.label(), p.cutoff);
                ((kind, Some(p.cutoff)), label, p.value)
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::STANDARD_CUTOFFS;
    use crate::measures::MeasureParams;
    use crate::ranking::RankedList;
    use crate::registry::resolve;

    fn evaluate(grades: &[u32], scores: &[f64], names: &[&str]) -> QueryEvaluation {
        let list = RankedList::align(grades, scores).unwrap();
        let measures: Vec<Measure> = names.iter().map(|n| resolve(n).unwrap()).collect();
        QueryEvaluation::evaluate(&measures, &list, &MeasureParams::default()).unwrap()
    }

    fn value(summary: &Summary, label: &str) -> f64 {
        summary
            .finish()
            .into_iter()
            .find(|v| v.label == label)
            .map(|v| v.value)
            .unwrap()
    }

    #[test]
    fn test_mean_and_sum() {
        let mut summary = Summary::new();
        // AP 1.0 and 0.5; 2 and 2 retrieved
        summary.add_query(&evaluate(&[1, 0], &[2.0, 1.0], &["map", "num_ret"]));
        summary.add_query(&evaluate(&[0, 1], &[2.0, 1.0], &["map", "num_ret"]));

        assert_eq!(summary.num_queries(), 2);
        assert!((value(&summary, "map") - 0.75).abs() < 1e-9);
        assert!((value(&summary, "num_ret") - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_geometric_mean() {
        let mut summary = Summary::new();
        // AP 1.0 and 0.25
        summary.add_query(&evaluate(&[1, 0], &[2.0, 1.0], &["gm_map"]));
        summary.add_query(&evaluate(&[0, 0, 0, 1], &[4.0, 3.0, 2.0, 1.0], &["gm_map"]));

        // sqrt(1.0 * 0.25) = 0.5
        assert!((value(&summary, "gm_map") - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_sweep_labels_in_cutoff_order() {
        let mut summary = Summary::new();
        summary.add_query(&evaluate(&[1, 0], &[2.0, 1.0], &["success", "map"]));

        let labels: Vec<String> = summary.finish().into_iter().map(|v| v.label).collect();
        // Catalogue order puts map before success
        assert_eq!(labels, vec!["map", "success_1", "success_5", "success_10"]);
    }

    #[test]
    fn test_merge_is_order_independent() {
        let a = evaluate(&[1, 0, 1], &[3.0, 2.0, 1.0], &["map", "P@2"]);
        let b = evaluate(&[0, 1, 0], &[3.0, 2.0, 1.0], &["map", "P@2"]);
        let c = evaluate(&[0, 0, 1], &[3.0, 2.0, 1.0], &["map", "P@2"]);

        let mut left = Summary::new();
        left.add_query(&a);
        left.add_query(&b);
        let mut right = Summary::new();
        right.add_query(&c);
        left.merge(right);

        let mut reversed = Summary::new();
        reversed.add_query(&c);
        let mut tail = Summary::new();
        tail.add_query(&b);
        tail.add_query(&a);
        reversed.merge(tail);

        assert_eq!(left.num_queries(), 3);
        for (x, y) in left.finish().iter().zip(reversed.finish().iter()) {
            assert_eq!(x.label, y.label);
            assert!((x.value - y.value).abs() < 1e-12);
        }
    }

    #[test]
    fn test_repeated_measure_counts_once() {
        let list = RankedList::align(&[1, 0, 0], &[3.0, 2.0, 1.0]).unwrap();
        let num_ret = resolve("num_ret").unwrap();
        let evaluation =
            QueryEvaluation::evaluate(&[num_ret, num_ret], &list, &MeasureParams::default())
                .unwrap();

        let mut summary = Summary::new();
        summary.add_query(&evaluation);

        assert_eq!(
            summary.finish(),
            vec![AggregateValue {
                label: "num_ret".to_string(),
                value: 3.0,
                queries: 1,
            }]
        );
    }

    #[test]
    fn test_swept_and_pinned_share_one_point() {
        let mut summary = Summary::new();
        summary.add_query(&evaluate(&[1, 0], &[2.0, 1.0], &["P", "P@10"]));
        summary.add_query(&evaluate(&[0, 1], &[2.0, 1.0], &["P", "P@10"]));

        let values = summary.finish();
        assert_eq!(values.len(), STANDARD_CUTOFFS.len());
        let p10 = values.iter().find(|v| v.label == "P_10").unwrap();
        assert_eq!(p10.queries, 2);
        assert!((p10.value - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_recall_level_point_and_sweep_agree() {
        let mut summary = Summary::new();
        summary.add_query(&evaluate(
            &[1, 0, 1],
            &[3.0, 2.0, 1.0],
            &["iprec_at_recall", "iprec_at_recall@0.5"],
        ));

        let values = summary.finish();
        assert_eq!(values.len(), 11);
        let half = values
            .iter()
            .find(|v| v.label == "iprec_at_recall_0.50")
            .unwrap();
        assert_eq!(half.queries, 1);
        assert!((half.value - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_accumulator() {
        assert_eq!(Accumulator::default().finish(Reduction::Mean), 0.0);
        assert_eq!(Accumulator::default().finish(Reduction::GeometricMean), 0.0);
    }
}
