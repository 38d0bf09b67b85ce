//! Public evaluation entry points.
//!
//! These are the operations a caller (CLI, binding layer, test harness) uses:
//! list the catalogue, explain a measure, and compute a measure for one
//! query's relevance labels and scores.
//!
//! # Example
//!
//! ```
//! use startrec_core::{compute, MeasureParams};
//!
//! let ndcg = compute("ndcg", &[0, 1, 0], &[1.0, 0.0, 1.5], &MeasureParams::default()).unwrap();
//! assert!((ndcg.as_value().unwrap() - 0.5).abs() < 1e-9);
//!
//! let p = compute("P", &[1, 0, 1], &[0.9, 0.8, 0.7], &MeasureParams::default().with_cutoff(2)).unwrap();
//! assert!((p.as_value().unwrap() - 0.5).abs() < 1e-9);
//! ```

use crate::error::Result;
use crate::measures::{Measure, MeasureParams};
use crate::ranking::{Grade, RankedList};
use crate::registry;
use crate::result::{Cutoff, MeasureResult};
use std::collections::HashSet;

/// Canonical measure names in catalogue order.
pub fn list_measure_names() -> Vec<&'static str> {
    registry::list_measure_names()
}

/// Human-readable explanation of a measure (canonical name or alias).
pub fn get_explanation(name: &str) -> Result<&'static str> {
    registry::explain(name)
}

/// Computes one measure for one query.
///
/// `relevance[i]` and `scores[i]` describe the same document. The measure
/// name is resolved before the input is aligned, so an unknown name is
/// reported even when the sequences are also malformed.
pub fn compute(
    name: &str,
    relevance: &[Grade],
    scores: &[f64],
    params: &MeasureParams,
) -> Result<MeasureResult> {
    let measure = registry::resolve(name)?;
    let list = RankedList::align(relevance, scores)?;
    measure.compute(&list, params)
}

/// Like [`compute`], for input with unjudged (`None` label) or unretrieved
/// (`None` score) documents.
pub fn compute_partial(
    name: &str,
    relevance: &[Option<Grade>],
    scores: &[Option<f64>],
    params: &MeasureParams,
) -> Result<MeasureResult> {
    let measure = registry::resolve(name)?;
    let list = RankedList::align_partial(relevance, scores)?;
    measure.compute(&list, params)
}

/// Several measures evaluated on one query's ranking.
///
/// The ranking is built once and shared by every measure. Evaluation is
/// atomic: if any measure fails, no partial result is returned.
#[derive(Debug, Clone)]
pub struct QueryEvaluation {
    results: Vec<(Measure, MeasureResult)>,
}

impl QueryEvaluation {
    /// Evaluates `measures` on `list` with shared parameters.
    ///
    /// A cutoff in `params` applies to every measure whose name does not
    /// already fix a rank (`P@10` keeps 10). Each stored measure is pinned
    /// to the point it was evaluated at, and a measure whose label repeats
    /// an earlier one is evaluated once.
    pub fn evaluate(
        measures: &[Measure],
        list: &RankedList,
        params: &MeasureParams,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut results = Vec::with_capacity(measures.len());

        for measure in measures {
            let params = match measure.cutoff() {
                Some(Cutoff::Rank(_)) => MeasureParams {
                    cutoff: None,
                    ..*params
                },
                _ => *params,
            };
            let pinned = measure.pinned(&params)?;
            if !seen.insert(pinned.label()) {
                continue;
            }
            results.push((pinned, measure.compute(list, &params)?));
        }

        Ok(Self { results })
    }

    /// Measure/result pairs in the order the measures were given.
    pub fn results(&self) -> &[(Measure, MeasureResult)] {
        &self.results
    }

    /// Result for a measure label (`map`, `P_10` for a pinned `P@10`).
    pub fn get(&self, label: &str) -> Option<&MeasureResult> {
        self.results
            .iter()
            .find(|(m, _)| m.label() == label)
            .map(|(_, r)| r)
    }

    /// Every value flattened to `(label, value)`, sweeps expanded.
    ///
    /// A label produced twice (`P` swept and `P@10` both give `P_10`) is
    /// kept once.
    pub fn labelled(&self) -> Vec<(String, f64)> {
        let mut seen = HashSet::new();
        self.results
            .iter()
            .flat_map(|(m, r)| r.labelled(&m.label()))
            .filter(|(label, _)| seen.insert(label.clone()))
            .collect()
    }
}
