//! # startrec Core
//!
//! TREC-style retrieval quality measures for a single query: given graded
//! relevance labels and the scores a ranking system assigned, compute average
//! precision, NDCG, precision/recall at k, reciprocal rank and friends.
//!
//! ## Modules
//!
//! - [`registry`] - Measure catalogue, aliases and name resolution
//! - [`ranking`] - Relevance/score alignment into a ranked list
//! - [`measures`] - Evaluators for the binary, rank-position and graded families
//! - [`result`] - Per-query results (scalars and cutoff sweeps)
//! - [`aggregate`] - Order-independent aggregation across queries
//! - [`evaluate`] - Top-level `compute` / `get_explanation` entry points
//! - [`config`] - Default thresholds and cutoff sets
//! - [`error`] - Error type shared by all operations
//!
//! ## Example
//!
//! ```
//! use startrec_core::{compute, get_explanation, list_measure_names, MeasureParams};
//!
//! assert!(list_measure_names().contains(&"ndcg"));
//! assert!(!get_explanation("mrr").unwrap().is_empty());
//!
//! let ap = compute("map", &[0, 0, 1, 1], &[0.1, 0.4, 0.35, 0.8], &MeasureParams::default())
//!     .unwrap();
//! assert!((ap.as_value().unwrap() - 0.8333).abs() < 1e-3);
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod measures;
pub mod ranking;
pub mod registry;
pub mod result;

pub use aggregate::{AggregateValue, Summary};
pub use error::{EvalError, Result};
pub use evaluate::{compute, compute_partial, get_explanation, list_measure_names, QueryEvaluation};
pub use measures::{Gain, Measure, MeasureKind, MeasureParams, Reduction};
pub use ranking::{Grade, JudgedDocument, RankedList};
pub use result::{Cutoff, CutoffValue, MeasureResult};
