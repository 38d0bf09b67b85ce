//! Relevance/score alignment.
//!
//! Turns one query's parallel sequences of relevance grades and system scores
//! into a [`RankedList`]: retrieved documents ordered by descending score, plus
//! the full judged set that recall-style denominators and ideal rankings need.
//!
//! # Tie-breaking
//!
//! Documents with equal scores keep their input order (lowest position
//! first). The sort is stable and the position is used as an explicit
//! secondary key, so repeated calls with identical input always produce the
//! same ranking.

use crate::error::{EvalError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use tracing::trace;

/// Relevance grade. 0 is not relevant; larger is more relevant.
pub type Grade = u32;

/// A document within one query: its input position, its grade if judged and
/// its score if retrieved.
///
/// The input position doubles as the query-local document identifier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JudgedDocument {
    /// Position in the caller's input sequences
    pub position: usize,
    /// Relevance grade, `None` when the document is unjudged
    pub grade: Option<Grade>,
    /// System score, `None` when the document was not retrieved
    pub score: Option<f64>,
}

impl JudgedDocument {
    /// Creates a new document record.
    pub fn new(position: usize, grade: Option<Grade>, score: Option<f64>) -> Self {
        Self {
            position,
            grade,
            score,
        }
    }

    /// Returns true if the document carries a relevance judgment.
    pub fn is_judged(&self) -> bool {
        self.grade.is_some()
    }

    /// Returns true if the system under evaluation scored the document.
    pub fn is_retrieved(&self) -> bool {
        self.score.is_some()
    }

    /// Returns true if the document is judged with a grade of at least `threshold`.
    pub fn is_relevant(&self, threshold: Grade) -> bool {
        self.grade.is_some_and(|g| g >= threshold)
    }

    /// Returns true if the document is judged but graded below `threshold`.
    pub fn is_judged_nonrelevant(&self, threshold: Grade) -> bool {
        self.grade.is_some_and(|g| g < threshold)
    }

    /// Grade used by graded measures; unjudged documents contribute nothing.
    pub fn gain_grade(&self) -> Grade {
        self.grade.unwrap_or(0)
    }
}

/// One query's documents, ranked by descending score.
///
/// Immutable once built. Several measures can evaluate the same list without
/// re-ranking it.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedList {
    /// Retrieved documents in rank order (rank 1 first)
    retrieved: Vec<JudgedDocument>,
    /// Grades of every judged document, retrieved or not, highest first
    ideal: Vec<Grade>,
}

impl RankedList {
    /// Aligns fully judged, fully scored input.
    ///
    /// Position `i` in `grades` and `scores` describes the same document.
    ///
    /// # Errors
    ///
    /// - [`EvalError::LengthMismatch`] if the sequences differ in length
    /// - [`EvalError::InvalidParameter`] if any score is NaN
    ///
    /// # Example
    ///
    /// ```
    /// use startrec_core::RankedList;
    ///
    /// let list = RankedList::align(&[0, 1, 0], &[1.0, 0.0, 1.5]).unwrap();
    /// let order: Vec<usize> = list.retrieved().iter().map(|d| d.position).collect();
    /// assert_eq!(order, vec![2, 0, 1]);
    /// ```
    pub fn align(grades: &[Grade], scores: &[f64]) -> Result<Self> {
        check_lengths(grades.len(), scores.len())?;
        Self::from_documents(
            grades
                .iter()
                .zip(scores)
                .enumerate()
                .map(|(i, (&g, &s))| JudgedDocument::new(i, Some(g), Some(s))),
        )
    }

    /// Aligns input where documents may be unjudged (`None` grade) or
    /// unretrieved (`None` score).
    ///
    /// Unretrieved documents never receive a rank but still count toward the
    /// number of relevant documents and the ideal ranking.
    pub fn align_partial(grades: &[Option<Grade>], scores: &[Option<f64>]) -> Result<Self> {
        check_lengths(grades.len(), scores.len())?;
        Self::from_documents(
            grades
                .iter()
                .zip(scores)
                .enumerate()
                .map(|(i, (&g, &s))| JudgedDocument::new(i, g, s)),
        )
    }

    /// Builds a ranking from explicit document records.
    ///
    /// # Errors
    ///
    /// [`EvalError::InvalidParameter`] if two records share a position or a
    /// score is NaN.
    pub fn from_documents(documents: impl IntoIterator<Item = JudgedDocument>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut retrieved = Vec::new();
        let mut ideal = Vec::new();
        let mut total = 0usize;

        for doc in documents {
            total += 1;
            if !seen.insert(doc.position) {
                return Err(EvalError::invalid(format!(
                    "duplicate document at position {}",
                    doc.position
                )));
            }
            if doc.score.is_some_and(f64::is_nan) {
                return Err(EvalError::invalid(format!(
                    "score at position {} is NaN",
                    doc.position
                )));
            }
            if let Some(grade) = doc.grade {
                ideal.push(grade);
            }
            if doc.is_retrieved() {
                retrieved.push(doc);
            }
        }

        retrieved.sort_by(rank_order);
        ideal.sort_unstable_by(|a, b| b.cmp(a));

        trace!(
            documents = total,
            retrieved = retrieved.len(),
            judged = ideal.len(),
            "aligned ranking"
        );

        Ok(Self { retrieved, ideal })
    }

    /// Retrieved documents in rank order.
    pub fn retrieved(&self) -> &[JudgedDocument] {
        &self.retrieved
    }

    /// Number of retrieved documents.
    pub fn num_retrieved(&self) -> usize {
        self.retrieved.len()
    }

    /// Returns true if no document was retrieved.
    pub fn is_empty(&self) -> bool {
        self.retrieved.is_empty()
    }

    /// Grades of all judged documents sorted highest first.
    pub fn ideal_grades(&self) -> &[Grade] {
        &self.ideal
    }

    /// Highest grade in the judgment set (0 when nothing is judged).
    pub fn max_grade(&self) -> Grade {
        self.ideal.first().copied().unwrap_or(0)
    }

    /// Number of judged documents graded at least `threshold`.
    pub fn num_relevant(&self, threshold: Grade) -> usize {
        // `ideal` is sorted descending, so relevant grades form a prefix
        self.ideal.partition_point(|&g| g >= threshold)
    }

    /// Number of judged documents graded below `threshold`.
    pub fn num_judged_nonrelevant(&self, threshold: Grade) -> usize {
        self.ideal.len() - self.num_relevant(threshold)
    }

    /// Number of relevant documents among the retrieved ones.
    pub fn num_relevant_retrieved(&self, threshold: Grade) -> usize {
        self.retrieved
            .iter()
            .filter(|d| d.is_relevant(threshold))
            .count()
    }

    /// Returns a copy keeping only the top `depth` retrieved documents.
    ///
    /// The judged set is unchanged, so denominators still see every relevant
    /// document.
    pub fn truncated(&self, depth: usize) -> Self {
        Self {
            retrieved: self.retrieved.iter().take(depth).copied().collect(),
            ideal: self.ideal.clone(),
        }
    }
}

fn check_lengths(relevance: usize, scores: usize) -> Result<()> {
    if relevance != scores {
        return Err(EvalError::LengthMismatch { relevance, scores });
    }
    Ok(())
}

/// Descending score, then ascending input position.
fn rank_order(a: &JudgedDocument, b: &JudgedDocument) -> Ordering {
    let sa = a.score.unwrap_or(f64::NEG_INFINITY);
    let sb = b.score.unwrap_or(f64::NEG_INFINITY);
    sb.partial_cmp(&sa)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.position.cmp(&b.position))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(list: &RankedList) -> Vec<usize> {
        list.retrieved().iter().map(|d| d.position).collect()
    }

    #[test]
    fn test_orders_by_descending_score() {
        let list = RankedList::align(&[0, 0, 1, 1], &[0.1, 0.4, 0.35, 0.8]).unwrap();
        assert_eq!(positions(&list), vec![3, 1, 2, 0]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let list = RankedList::align(&[1, 0, 2, 0], &[0.5, 0.9, 0.5, 0.5]).unwrap();
        assert_eq!(positions(&list), vec![1, 0, 2, 3]);

        // Same input, same ranking
        let again = RankedList::align(&[1, 0, 2, 0], &[0.5, 0.9, 0.5, 0.5]).unwrap();
        assert_eq!(list, again);
    }

    #[test]
    fn test_negative_zero_ties_with_zero() {
        let list = RankedList::align(&[0, 1], &[0.0, -0.0]).unwrap();
        assert_eq!(positions(&list), vec![0, 1]);
    }

    #[test]
    fn test_length_mismatch() {
        let err = RankedList::align(&[0, 1, 0], &[1.0, 2.0]).unwrap_err();
        assert_eq!(
            err,
            EvalError::LengthMismatch {
                relevance: 3,
                scores: 2
            }
        );
    }

    #[test]
    fn test_nan_score_rejected() {
        let err = RankedList::align(&[0, 1], &[1.0, f64::NAN]).unwrap_err();
        assert!(matches!(err, EvalError::InvalidParameter(_)));
    }

    #[test]
    fn test_empty_input_is_valid() {
        let list = RankedList::align(&[], &[]).unwrap();
        assert!(list.is_empty());
        assert_eq!(list.max_grade(), 0);
        assert_eq!(list.num_relevant(1), 0);
    }

    #[test]
    fn test_partial_alignment_counts_unretrieved_relevant() {
        // Position 1 is relevant but unretrieved; position 2 is retrieved but unjudged
        let list = RankedList::align_partial(
            &[Some(0), Some(2), None, Some(1)],
            &[Some(0.3), None, Some(0.9), Some(0.1)],
        )
        .unwrap();

        assert_eq!(positions(&list), vec![2, 0, 3]);
        assert_eq!(list.num_relevant(1), 2);
        assert_eq!(list.num_relevant_retrieved(1), 1);
        assert_eq!(list.num_judged_nonrelevant(1), 1);
        assert_eq!(list.ideal_grades(), &[2, 1, 0]);
    }

    #[test]
    fn test_threshold_counts() {
        let list = RankedList::align(&[0, 1, 2, 3], &[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(list.num_relevant(1), 3);
        assert_eq!(list.num_relevant(2), 2);
        assert_eq!(list.num_relevant(4), 0);
        assert_eq!(list.max_grade(), 3);
    }

    #[test]
    fn test_duplicate_position_rejected() {
        let docs = vec![
            JudgedDocument::new(0, Some(1), Some(1.0)),
            JudgedDocument::new(0, Some(0), Some(2.0)),
        ];
        assert!(matches!(
            RankedList::from_documents(docs),
            Err(EvalError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_truncated_keeps_judgments() {
        let list = RankedList::align(&[1, 1, 1], &[3.0, 2.0, 1.0]).unwrap();
        let top = list.truncated(1);
        assert_eq!(top.num_retrieved(), 1);
        assert_eq!(top.num_relevant(1), 3);
        // Original is untouched
        assert_eq!(list.num_retrieved(), 3);
    }
}
