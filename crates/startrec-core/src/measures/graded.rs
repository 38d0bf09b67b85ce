//! Graded-relevance measures (NDCG).
//!
//! # References
//!
//! - Järvelin & Kekäläinen (2002). "Cumulated gain-based evaluation of IR techniques"

use crate::ranking::{Grade, RankedList};
use serde::{Deserialize, Serialize};

/// Maps a relevance grade to the reward a document contributes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gain {
    /// gain = grade
    #[default]
    Linear,
    /// gain = 2^grade - 1 (rel=0 -> 0, rel=1 -> 1, rel=2 -> 3)
    Exponential,
}

impl Gain {
    /// Computes the gain for a relevance grade.
    #[inline]
    pub fn apply(self, grade: Grade) -> f64 {
        match self {
            Gain::Linear => f64::from(grade),
            Gain::Exponential => f64::from(grade).exp2() - 1.0,
        }
    }
}

/// Discount factor for a 1-indexed rank: log₂(rank + 1).
#[inline]
fn discount(rank: usize) -> f64 {
    (rank as f64 + 1.0).log2()
}

/// Discounted cumulative gain of a grade sequence in rank order.
fn dcg(grades: impl Iterator<Item = Grade>, gain: Gain) -> f64 {
    grades
        .enumerate()
        .map(|(i, grade)| gain.apply(grade) / discount(i + 1))
        .sum()
}

/// Computes NDCG over the whole ranking.
///
/// # Formula
///
/// ```text
/// DCG  = Σ gain(rel_r) / log₂(r + 1)  over every retrieved rank r
/// IDCG = DCG of all judged grades sorted descending
/// NDCG = DCG / IDCG
/// ```
///
/// Unjudged documents contribute no gain. Returns 0.0 if IDCG is 0 (no
/// document has a positive grade).
pub fn ndcg(list: &RankedList, gain: Gain) -> f64 {
    let dcg = dcg(list.retrieved().iter().map(|d| d.gain_grade()), gain);
    let idcg = dcg_ideal(list, usize::MAX, gain);
    normalize(dcg, idcg)
}

/// Computes NDCG@k: both the ranking and the ideal ranking are cut at `k`.
pub fn ndcg_at(list: &RankedList, k: usize, gain: Gain) -> f64 {
    let dcg = dcg(
        list.retrieved().iter().take(k).map(|d| d.gain_grade()),
        gain,
    );
    let idcg = dcg_ideal(list, k, gain);
    normalize(dcg, idcg)
}

fn dcg_ideal(list: &RankedList, k: usize, gain: Gain) -> f64 {
    dcg(list.ideal_grades().iter().take(k).copied(), gain)
}

fn normalize(dcg: f64, idcg: f64) -> f64 {
    // Avoid division by zero (no relevant documents)
    if idcg == 0.0 {
        0.0
    } else {
        dcg / idcg
    }
}
