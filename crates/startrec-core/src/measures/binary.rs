//! Binary-relevance measures: precision, recall and their set-based forms.
//!
//! Grades are binarized at the threshold: a document is relevant when its
//! grade is at least the threshold, otherwise (or when unjudged) it is not.

use crate::ranking::{Grade, RankedList};

/// Relevant documents among the top `k` retrieved.
fn relevant_in_top(list: &RankedList, k: usize, threshold: Grade) -> usize {
    list.retrieved()
        .iter()
        .take(k)
        .filter(|d| d.is_relevant(threshold))
        .count()
}

/// Computes Precision@k.
///
/// # Formula
///
/// ```text
/// P@k = |relevant ∩ top_k| / k
/// ```
///
/// The denominator is always `k`: when fewer than `k` documents were
/// retrieved the missing slots count as non-relevant.
pub fn precision_at(list: &RankedList, k: usize, threshold: Grade) -> f64 {
    if k == 0 {
        return 0.0;
    }
    relevant_in_top(list, k, threshold) as f64 / k as f64
}

/// Computes Recall@k.
///
/// # Formula
///
/// ```text
/// R@k = |relevant ∩ top_k| / |relevant|
/// ```
///
/// Returns 0.0 when the judgment set holds no relevant document.
pub fn recall_at(list: &RankedList, k: usize, threshold: Grade) -> f64 {
    let total_relevant = list.num_relevant(threshold);
    if total_relevant == 0 {
        return 0.0;
    }
    relevant_in_top(list, k, threshold) as f64 / total_relevant as f64
}

/// Computes R-Precision: precision at depth R, where R is the number of
/// relevant documents. Returns 0.0 when R = 0.
pub fn r_precision(list: &RankedList, threshold: Grade) -> f64 {
    let total_relevant = list.num_relevant(threshold);
    if total_relevant == 0 {
        return 0.0;
    }
    relevant_in_top(list, total_relevant, threshold) as f64 / total_relevant as f64
}

/// Precision over the whole retrieved set.
pub fn set_precision(list: &RankedList, threshold: Grade) -> f64 {
    if list.is_empty() {
        return 0.0;
    }
    list.num_relevant_retrieved(threshold) as f64 / list.num_retrieved() as f64
}

/// Recall over the whole retrieved set.
pub fn set_recall(list: &RankedList, threshold: Grade) -> f64 {
    recall_at(list, list.num_retrieved(), threshold)
}

/// Harmonic mean of set precision and set recall.
///
/// Returns 0.0 if both precision and recall are 0.
pub fn set_f1(list: &RankedList, threshold: Grade) -> f64 {
    let precision = set_precision(list, threshold);
    let recall = set_recall(list, threshold);

    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Set precision times set recall: `relevant_retrieved² / (retrieved * relevant)`.
pub fn set_map(list: &RankedList, threshold: Grade) -> f64 {
    set_precision(list, threshold) * set_recall(list, threshold)
}
