//! Measure registry.
//!
//! A fixed catalogue of canonical measure names, each bound to one
//! [`MeasureKind`] and an explanation, plus a static alias table. The lookup
//! index is built once on first use and is read-only afterwards.
//!
//! # Name syntax
//!
//! | Form | Example | Meaning |
//! |------|---------|---------|
//! | canonical | `ndcg_cut` | the measure as catalogued |
//! | alias | `mrr` | same as `recip_rank` |
//! | `name@k` | `P@10`, `ndcg@10` | swept family pinned at k, or the cut variant of `ndcg`/`map` |
//! | `name@level` | `iprec_at_recall@0.3` | one interpolated recall level |
//! | `name_k` | `P_10`, `iprec_at_recall_0.30` | result-label form of the above |

use crate::error::{EvalError, Result};
use crate::measures::{Measure, MeasureKind, Sweep};
use crate::result::Cutoff;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::debug;

/// A catalogue entry.
#[derive(Debug)]
pub struct MeasureDef {
    /// Canonical name
    pub name: &'static str,
    /// Implementation the name binds to
    pub kind: MeasureKind,
    /// Human-readable description
    pub explanation: &'static str,
}

const fn def(name: &'static str, kind: MeasureKind, explanation: &'static str) -> MeasureDef {
    MeasureDef {
        name,
        kind,
        explanation,
    }
}

// =============================================================================
// Catalogue
// =============================================================================

static CATALOGUE: &[MeasureDef] = &[
    def(
        "num_ret",
        MeasureKind::NumRet,
        "Number of documents retrieved for the query.",
    ),
    def(
        "num_rel",
        MeasureKind::NumRel,
        "Number of relevant documents in the judgment set, retrieved or not.",
    ),
    def(
        "num_rel_ret",
        MeasureKind::NumRelRet,
        "Number of relevant documents retrieved.",
    ),
    def(
        "map",
        MeasureKind::Map,
        "Mean Average Precision. Precision is measured at the rank of every \
         relevant retrieved document; the sum is divided by the total number \
         of relevant documents, so unretrieved relevant documents count as \
         zero precision. 0 when no document is relevant.",
    ),
    def(
        "gm_map",
        MeasureKind::GmMap,
        "Geometric Mean Average Precision. Per query this is the natural log \
         of average precision floored at 0.00001; across queries the mean of \
         the logs is exponentiated. Rewards improving poorly performing \
         queries more than map does.",
    ),
    def(
        "map_cut",
        MeasureKind::MapCut,
        "Average precision counting only relevant documents ranked at or \
         above cutoff k, still divided by the total number of relevant \
         documents. Cutoffs: 5, 10, 15, 20, 30, 100, 200, 500, 1000.",
    ),
    def(
        "recip_rank",
        MeasureKind::RecipRank,
        "Reciprocal Rank of the first relevant document retrieved, or 0 if \
         none is retrieved. Averaged across queries this is MRR.",
    ),
    def(
        "success",
        MeasureKind::Success,
        "1 if a relevant document is retrieved in the top k, else 0. \
         Cutoffs: 1, 5, 10.",
    ),
    def(
        "bpref",
        MeasureKind::Bpref,
        "Binary preference. For each relevant retrieved document, penalises \
         the number of judged non-relevant documents ranked above it, capped \
         at R and normalised by min(R, N). Unjudged documents are ignored, \
         which makes it robust to incomplete judgments.",
    ),
    def(
        "Rprec",
        MeasureKind::RPrec,
        "R-Precision: precision after R documents have been retrieved, \
         where R is the number of relevant documents for the query.",
    ),
    def(
        "P",
        MeasureKind::Precision,
        "Precision at cutoff k: relevant documents in the top k divided by k. \
         If fewer than k documents are retrieved the missing ranks count as \
         non-relevant. Cutoffs: 5, 10, 15, 20, 30, 100, 200, 500, 1000.",
    ),
    def(
        "recall",
        MeasureKind::Recall,
        "Recall at cutoff k: relevant documents in the top k divided by the \
         total number of relevant documents; 0 when there are none. \
         Cutoffs: 5, 10, 15, 20, 30, 100, 200, 500, 1000.",
    ),
    def(
        "set_P",
        MeasureKind::SetPrecision,
        "Set precision: relevant retrieved divided by retrieved.",
    ),
    def(
        "set_recall",
        MeasureKind::SetRecall,
        "Set recall: relevant retrieved divided by relevant.",
    ),
    def(
        "set_F",
        MeasureKind::SetF,
        "Set F1: harmonic mean of set precision and set recall.",
    ),
    def(
        "set_map",
        MeasureKind::SetMap,
        "Set MAP: set precision times set recall, i.e. \
         relevant_retrieved^2 / (retrieved * relevant).",
    ),
    def(
        "iprec_at_recall",
        MeasureKind::IprecAtRecall,
        "Interpolated precision at recall levels 0.0, 0.1, ..., 1.0: the \
         highest precision reached at any rank whose recall is at least the \
         level. 0 for levels the ranking never reaches. \
         `iprec_at_recall@0.3` selects a single level.",
    ),
    def(
        "11pt_avg",
        MeasureKind::ElevenPointAverage,
        "Mean interpolated precision over the 11 recall levels \
         0.0, 0.1, ..., 1.0.",
    ),
    def(
        "ndcg",
        MeasureKind::Ndcg,
        "Normalized Discounted Cumulative Gain over the whole ranking. Gain \
         is the relevance grade (linear by default), discounted by \
         log2(rank + 1), and normalised by the gain of the ideal ordering of \
         all judged documents. 0 when no document has a positive grade.",
    ),
    def(
        "ndcg_cut",
        MeasureKind::NdcgCut,
        "NDCG at cutoff k: both the ranking and the ideal ordering are cut at \
         k. Cutoffs: 5, 10, 15, 20, 30, 100, 200, 500, 1000.",
    ),
];

/// Alternative spellings accepted by [`resolve`], mapped to canonical names.
static ALIASES: &[(&str, &str)] = &[
    ("ap", "map"),
    ("average_precision", "map"),
    ("mrr", "recip_rank"),
    ("rr", "recip_rank"),
    ("reciprocal_rank", "recip_rank"),
    ("precision", "P"),
    ("precision_at_k", "P"),
    ("recall_at_k", "recall"),
    ("r_precision", "Rprec"),
    ("rprec", "Rprec"),
    ("ndcg_at_k", "ndcg_cut"),
    ("f1", "set_F"),
    ("f_measure", "set_F"),
    ("interpolated_precision", "iprec_at_recall"),
];

static INDEX: Lazy<HashMap<&'static str, &'static MeasureDef>> = Lazy::new(|| {
    let mut index: HashMap<&'static str, &'static MeasureDef> =
        CATALOGUE.iter().map(|def| (def.name, def)).collect();

    for &(alias, canonical) in ALIASES {
        if let Some(def) = index.get(canonical).copied() {
            index.insert(alias, def);
        }
    }

    index
});

fn lookup(name: &str) -> Option<&'static MeasureDef> {
    INDEX.get(name).copied()
}

fn lookup_kind(kind: MeasureKind) -> Option<&'static MeasureDef> {
    CATALOGUE.iter().find(|def| def.kind == kind)
}

// =============================================================================
// Public API
// =============================================================================

/// Canonical measure names in catalogue order.
pub fn list_measure_names() -> Vec<&'static str> {
    CATALOGUE.iter().map(|def| def.name).collect()
}

/// Resolves a canonical name, alias or cutoff-suffixed name.
///
/// # Errors
///
/// - [`EvalError::UnknownMeasure`] if no catalogue entry matches
/// - [`EvalError::InvalidParameter`] if a rank suffix is 0 or negative, or a
///   recall-level suffix is not one of 0.0, 0.1, ..., 1.0
///
/// # Example
///
/// ```
/// use startrec_core::registry::resolve;
/// use startrec_core::Cutoff;
///
/// let measure = resolve("P@10").unwrap();
/// assert_eq!(measure.name(), "P");
/// assert_eq!(measure.cutoff(), Some(Cutoff::Rank(10)));
/// ```
pub fn resolve(name: &str) -> Result<Measure> {
    let measure = match lookup(name) {
        Some(def) => Measure::new(def, None),
        None => resolve_with_cutoff(name)?,
    };

    debug!(
        requested = name,
        canonical = measure.name(),
        cutoff = ?measure.cutoff(),
        "resolved measure"
    );

    Ok(measure)
}

/// Returns the explanation text for a measure.
pub fn explain(name: &str) -> Result<&'static str> {
    resolve(name).map(|measure| measure.explanation())
}

fn resolve_with_cutoff(name: &str) -> Result<Measure> {
    let unknown = || EvalError::UnknownMeasure(name.to_string());

    let (base, suffix) = name
        .rsplit_once('@')
        .or_else(|| name.rsplit_once('_'))
        .ok_or_else(unknown)?;
    let def = lookup(base).ok_or_else(unknown)?;

    match def.kind.sweep() {
        Some(Sweep::Ranks(_)) => Ok(Measure::new(def, Some(parse_rank(name, suffix)?))),
        Some(Sweep::RecallLevels) => {
            Ok(Measure::new(def, Some(parse_recall_level(name, suffix)?)))
        }
        None => {
            let cutoff = parse_rank(name, suffix)?;
            def.kind
                .cut_variant()
                .and_then(lookup_kind)
                .map(|cut| Measure::new(cut, Some(cutoff)))
                .ok_or_else(unknown)
        }
    }
}

/// Parses a rank suffix (`10` in `P@10`).
fn parse_rank(name: &str, suffix: &str) -> Result<Cutoff> {
    let cutoff: i64 = suffix
        .parse()
        .map_err(|_| EvalError::UnknownMeasure(name.to_string()))?;
    if cutoff <= 0 {
        return Err(EvalError::invalid(format!(
            "cutoff in measure name {} must be at least 1",
            name
        )));
    }
    usize::try_from(cutoff)
        .map(Cutoff::Rank)
        .map_err(|_| EvalError::UnknownMeasure(name.to_string()))
}

/// Parses a recall-level suffix (`0.30` in `iprec_at_recall_0.30`).
fn parse_recall_level(name: &str, suffix: &str) -> Result<Cutoff> {
    let level: f64 = suffix
        .parse()
        .map_err(|_| EvalError::UnknownMeasure(name.to_string()))?;
    let tenths = (level * 10.0).round();
    if !(0.0..=1.0).contains(&level) || (level * 10.0 - tenths).abs() > 1e-9 {
        return Err(EvalError::invalid(format!(
            "recall level in measure name {} must be one of 0.0, 0.1, ..., 1.0",
            name
        )));
    }
    Ok(Cutoff::RecallTenths(tenths as u8))
}
