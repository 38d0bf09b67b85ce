//! Per-query measure results.

use serde::Serialize;
use std::fmt;

/// The point a swept measure was evaluated at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cutoff {
    /// Rank depth k (top k documents)
    Rank(usize),
    /// Recall level in tenths: 0 = 0.0, 10 = 1.0
    RecallTenths(u8),
}

impl Cutoff {
    /// Recall level as a fraction, for [`Cutoff::RecallTenths`].
    pub fn recall_level(&self) -> Option<f64> {
        match self {
            Cutoff::Rank(_) => None,
            Cutoff::RecallTenths(t) => Some(f64::from(*t) / 10.0),
        }
    }
}

impl fmt::Display for Cutoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cutoff::Rank(k) => write!(f, "{}", k),
            Cutoff::RecallTenths(t) => write!(f, "{:.2}", f64::from(*t) / 10.0),
        }
    }
}

/// One value of a swept measure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CutoffValue {
    pub cutoff: Cutoff,
    pub value: f64,
}

/// The outcome of evaluating one measure on one query.
///
/// Swept families (`P`, `recall`, `ndcg_cut`, ...) evaluated without a
/// specific cutoff produce one value per standard cutoff; everything else is
/// a single scalar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MeasureResult {
    Value(f64),
    Sweep(Vec<CutoffValue>),
}

impl MeasureResult {
    /// Returns the scalar value, or `None` for a sweep.
    pub fn as_value(&self) -> Option<f64> {
        match self {
            MeasureResult::Value(v) => Some(*v),
            MeasureResult::Sweep(_) => None,
        }
    }

    /// All values in order (a single element for scalars).
    pub fn values(&self) -> Vec<f64> {
        match self {
            MeasureResult::Value(v) => vec![*v],
            MeasureResult::Sweep(points) => points.iter().map(|p| p.value).collect(),
        }
    }

    /// Value at a given cutoff of a sweep.
    pub fn at(&self, cutoff: Cutoff) -> Option<f64> {
        match self {
            MeasureResult::Value(_) => None,
            MeasureResult::Sweep(points) => points
                .iter()
                .find(|p| p.cutoff == cutoff)
                .map(|p| p.value),
        }
    }

    /// Flattens the result into `(label, value)` pairs, labelling sweep
    /// points `<name>_<cutoff>` (e.g. `P_10`, `iprec_at_recall_0.30`).
    pub fn labelled(&self, name: &str) -> Vec<(String, f64)> {
        match self {
            MeasureResult::Value(v) => vec![(name.to_string(), *v)],
            MeasureResult::Sweep(points) => points
                .iter()
                .map(|p| (format!("{}_{}", name, p.cutoff), p.value))
                .collect(),
        }
    }
}
