//! Rank-position measures: average precision, reciprocal rank, bpref and
//! interpolated precision.
//!
//! # References
//!
//! - Voorhees & Harman (2005). "TREC: Experiment and Evaluation in Information Retrieval"
//! - Buckley & Voorhees (2004). "Retrieval evaluation with incomplete information"

use crate::config::{GEOMETRIC_MEAN_FLOOR, RECALL_LEVELS};
use crate::ranking::{Grade, RankedList};

// ============================================================================
// Average Precision
// ============================================================================

/// Computes Average Precision, counting only relevant documents ranked
/// within `depth` (all ranks when `None`).
///
/// # Formula
///
/// ```text
/// AP = (1 / |relevant|) * Σ P(r) * rel(r)
/// where P(r) is precision at rank r
/// and rel(r) is 1 if the document at r is relevant, 0 otherwise
/// ```
///
/// The denominator is the number of relevant documents in the judgment set,
/// retrieved or not. Returns 0.0 if there are none.
pub fn average_precision(list: &RankedList, threshold: Grade, depth: Option<usize>) -> f64 {
    let total_relevant = list.num_relevant(threshold);
    if total_relevant == 0 {
        return 0.0;
    }

    let depth = depth.unwrap_or(usize::MAX);
    let mut precision_sum = 0.0;
    let mut relevant_found = 0;

    for (i, doc) in list.retrieved().iter().take(depth).enumerate() {
        if doc.is_relevant(threshold) {
            relevant_found += 1;
            precision_sum += relevant_found as f64 / (i + 1) as f64;
        }
    }

    precision_sum / total_relevant as f64
}

/// Log of average precision, floored so a zero does not dominate the
/// geometric mean taken across queries.
pub fn log_average_precision(list: &RankedList, threshold: Grade) -> f64 {
    average_precision(list, threshold, None)
        .max(GEOMETRIC_MEAN_FLOOR)
        .ln()
}

// ============================================================================
// Reciprocal Rank
// ============================================================================

/// Computes Reciprocal Rank: `1 / rank` of the first relevant document, or
/// 0.0 if none was retrieved.
pub fn reciprocal_rank(list: &RankedList, threshold: Grade) -> f64 {
    list.retrieved()
        .iter()
        .position(|d| d.is_relevant(threshold))
        .map_or(0.0, |i| 1.0 / (i + 1) as f64)
}

/// 1.0 if a relevant document appears in the top `k`, else 0.0.
pub fn success_at(list: &RankedList, k: usize, threshold: Grade) -> f64 {
    if list
        .retrieved()
        .iter()
        .take(k)
        .any(|d| d.is_relevant(threshold))
    {
        1.0
    } else {
        0.0
    }
}

// ============================================================================
// bpref
// ============================================================================

/// Computes bpref, which only looks at judged documents.
///
/// # Formula
///
/// ```text
/// bpref = (1 / R) * Σ_r (1 - min(n_r, R) / min(R, N))
/// ```
///
/// summed over relevant retrieved documents r, where `n_r` is the number of
/// judged non-relevant documents ranked above r, `R` the number of relevant
/// and `N` the number of judged non-relevant documents. Unjudged documents
/// are skipped entirely. Returns 0.0 when R = 0.
pub fn bpref(list: &RankedList, threshold: Grade) -> f64 {
    let total_relevant = list.num_relevant(threshold);
    if total_relevant == 0 {
        return 0.0;
    }
    let denominator = total_relevant.min(list.num_judged_nonrelevant(threshold)) as f64;

    let mut nonrelevant_so_far = 0usize;
    let mut sum = 0.0;

    for doc in list.retrieved() {
        if doc.is_judged_nonrelevant(threshold) {
            nonrelevant_so_far += 1;
        } else if doc.is_relevant(threshold) {
            if nonrelevant_so_far > 0 {
                // nonrelevant_so_far > 0 implies N > 0, so denominator > 0
                sum += 1.0 - nonrelevant_so_far.min(total_relevant) as f64 / denominator;
            } else {
                sum += 1.0;
            }
        }
    }

    sum / total_relevant as f64
}

// ============================================================================
// Interpolated Precision
// ============================================================================

/// Interpolated precision at recall levels 0.0, 0.1, ..., 1.0.
///
/// The value at level `l` is the highest precision reached at any rank whose
/// recall is at least `l`; 0.0 when no rank reaches `l`. Levels are compared
/// in integer arithmetic (`found * 10 >= level * R`) so 0.3 is hit exactly.
pub fn interpolated_precision(list: &RankedList, threshold: Grade) -> Vec<f64> {
    let mut levels = vec![0.0; RECALL_LEVELS as usize];
    let total_relevant = list.num_relevant(threshold);
    if total_relevant == 0 {
        return levels;
    }

    // (relevant found so far, precision) at every relevant rank
    let mut points = Vec::new();
    let mut found = 0usize;
    for (i, doc) in list.retrieved().iter().enumerate() {
        if doc.is_relevant(threshold) {
            found += 1;
            points.push((found, found as f64 / (i + 1) as f64));
        }
    }

    // Walk from the deepest point up. A level is settled once the next point
    // falls below it, since every point that qualifies for it is deeper.
    let mut best = 0.0f64;
    let mut level = RECALL_LEVELS as usize;
    for &(found, precision) in points.iter().rev() {
        while level > 0 && (level - 1) * total_relevant > found * 10 {
            levels[level - 1] = best;
            level -= 1;
        }
        best = best.max(precision);
    }
    for value in &mut levels[..level] {
        *value = best;
    }

    levels
}

/// Mean interpolated precision over the 11 standard recall levels.
pub fn eleven_point_average(list: &RankedList, threshold: Grade) -> f64 {
    let levels = interpolated_precision(list, threshold);
    levels.iter().sum::<f64>() / levels.len() as f64
}
