//! Evaluation configuration constants.
//!
//! These values define the defaults every measure uses when the caller does
//! not override them. They follow the conventions of the TREC evaluation
//! tooling so results line up with published numbers.
//!
//! # Usage
//!
//! ```
//! use startrec_core::config::{DEFAULT_RELEVANCE_THRESHOLD, STANDARD_CUTOFFS};
//!
//! assert_eq!(DEFAULT_RELEVANCE_THRESHOLD, 1);
//! assert_eq!(STANDARD_CUTOFFS[1], 10);
//! ```

// =============================================================================
// Relevance
// =============================================================================

/// Minimum grade counted as relevant by binary measures.
///
/// Grade 0 is always non-relevant. Raising the threshold turns e.g. a
/// 0/1/2 scale into "only highly relevant counts".
pub const DEFAULT_RELEVANCE_THRESHOLD: u32 = 1;

// =============================================================================
// Cutoff Sets
// =============================================================================

/// Rank cutoffs swept by `P`, `recall`, `map_cut` and `ndcg_cut`.
pub const STANDARD_CUTOFFS: &[usize] = &[5, 10, 15, 20, 30, 100, 200, 500, 1000];

/// Rank cutoffs swept by `success`.
pub const SUCCESS_CUTOFFS: &[usize] = &[1, 5, 10];

/// Number of interpolated recall levels (0.0, 0.1, ..., 1.0).
pub const RECALL_LEVELS: u8 = 11;

// =============================================================================
// Numeric Floors
// =============================================================================

/// Floor applied to average precision before taking its logarithm for
/// `gm_map`, so a single zero query does not send the geometric mean to 0.
pub const GEOMETRIC_MEAN_FLOOR: f64 = 0.00001;
