//! Measure evaluators.
//!
//! Every supported measure is a variant of the closed [`MeasureKind`] enum.
//! The numeric work lives in one module per family:
//!
//! | Module | Measures |
//! |--------|----------|
//! | [`binary`] | `P`, `recall`, `Rprec`, `set_P`, `set_recall`, `set_F`, `set_map` |
//! | [`rank`] | `map`, `gm_map`, `map_cut`, `recip_rank`, `success`, `bpref`, `iprec_at_recall`, `11pt_avg` |
//! | [`graded`] | `ndcg`, `ndcg_cut` |
//!
//! Evaluators are pure functions of `(RankedList, parameters)`: they hold no
//! state and never mutate the ranking, so one [`RankedList`] can be shared
//! across threads and measures.

pub mod binary;
pub mod graded;
pub mod rank;

pub use graded::Gain;

use crate::config::{
    DEFAULT_RELEVANCE_THRESHOLD, RECALL_LEVELS, STANDARD_CUTOFFS, SUCCESS_CUTOFFS,
};
use crate::error::{EvalError, Result};
use crate::ranking::{Grade, RankedList};
use crate::registry::MeasureDef;
use crate::result::{Cutoff, CutoffValue, MeasureResult};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// The closed set of measure implementations, in catalogue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum MeasureKind {
    NumRet,
    NumRel,
    NumRelRet,
    Map,
    GmMap,
    MapCut,
    RecipRank,
    Success,
    Bpref,
    RPrec,
    Precision,
    Recall,
    SetPrecision,
    SetRecall,
    SetF,
    SetMap,
    IprecAtRecall,
    ElevenPointAverage,
    Ndcg,
    NdcgCut,
}

/// Points a swept family is evaluated at when no cutoff is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sweep {
    /// Rank depths
    Ranks(&'static [usize]),
    /// The 11 interpolated recall levels
    RecallLevels,
}

/// How per-query values of a measure combine across queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    /// Arithmetic mean
    Mean,
    /// Plain sum (document counts)
    Sum,
    /// `exp` of the mean of per-query logarithms
    GeometricMean,
}

/// How a measure is evaluated on one ranking.
///
/// Every [`MeasureKind`] maps to exactly one variant, so scalar and swept
/// measures never share an evaluation path.
#[derive(Clone, Copy)]
enum Evaluator {
    /// One value over the (depth-limited) ranking
    Scalar(fn(&RankedList, &Resolved) -> f64),
    /// One value per rank depth
    AtRank(&'static [usize], fn(&RankedList, usize, &Resolved) -> f64),
    /// Interpolated precision at the 11 recall levels
    AtRecallLevel,
}

impl MeasureKind {
    fn evaluator(self) -> Evaluator {
        use Evaluator::{AtRank, AtRecallLevel, Scalar};

        match self {
            MeasureKind::NumRet => Scalar(|list, _| list.num_retrieved() as f64),
            MeasureKind::NumRel => Scalar(|list, p| list.num_relevant(p.threshold) as f64),
            MeasureKind::NumRelRet => {
                Scalar(|list, p| list.num_relevant_retrieved(p.threshold) as f64)
            }
            MeasureKind::Map => Scalar(|list, p| rank::average_precision(list, p.threshold, None)),
            MeasureKind::GmMap => Scalar(|list, p| rank::log_average_precision(list, p.threshold)),
            MeasureKind::MapCut => AtRank(STANDARD_CUTOFFS, |list, k, p| {
                rank::average_precision(list, p.threshold, Some(k))
            }),
            MeasureKind::RecipRank => Scalar(|list, p| rank::reciprocal_rank(list, p.threshold)),
            MeasureKind::Success => {
                AtRank(SUCCESS_CUTOFFS, |list, k, p| rank::success_at(list, k, p.threshold))
            }
            MeasureKind::Bpref => Scalar(|list, p| rank::bpref(list, p.threshold)),
            MeasureKind::RPrec => Scalar(|list, p| binary::r_precision(list, p.threshold)),
            MeasureKind::Precision => AtRank(STANDARD_CUTOFFS, |list, k, p| {
                binary::precision_at(list, k, p.threshold)
            }),
            MeasureKind::Recall => {
                AtRank(STANDARD_CUTOFFS, |list, k, p| binary::recall_at(list, k, p.threshold))
            }
            MeasureKind::SetPrecision => Scalar(|list, p| binary::set_precision(list, p.threshold)),
            MeasureKind::SetRecall => Scalar(|list, p| binary::set_recall(list, p.threshold)),
            MeasureKind::SetF => Scalar(|list, p| binary::set_f1(list, p.threshold)),
            MeasureKind::SetMap => Scalar(|list, p| binary::set_map(list, p.threshold)),
            MeasureKind::IprecAtRecall => AtRecallLevel,
            MeasureKind::ElevenPointAverage => {
                Scalar(|list, p| rank::eleven_point_average(list, p.threshold))
            }
            MeasureKind::Ndcg => Scalar(|list, p| graded::ndcg(list, p.gain)),
            MeasureKind::NdcgCut => {
                AtRank(STANDARD_CUTOFFS, |list, k, p| graded::ndcg_at(list, k, p.gain))
            }
        }
    }

    /// Standard evaluation points for swept families, `None` for scalars.
    pub fn sweep(self) -> Option<Sweep> {
        match self.evaluator() {
            Evaluator::Scalar(_) => None,
            Evaluator::AtRank(ks, _) => Some(Sweep::Ranks(ks)),
            Evaluator::AtRecallLevel => Some(Sweep::RecallLevels),
        }
    }

    /// The rank-swept variant a `name@k` suffix selects for a scalar measure.
    pub fn cut_variant(self) -> Option<MeasureKind> {
        match self {
            MeasureKind::Ndcg => Some(MeasureKind::NdcgCut),
            MeasureKind::Map => Some(MeasureKind::MapCut),
            _ => None,
        }
    }

    /// Cross-query reduction for this measure.
    pub fn reduction(self) -> Reduction {
        match self {
            MeasureKind::NumRet | MeasureKind::NumRel | MeasureKind::NumRelRet => Reduction::Sum,
            MeasureKind::GmMap => Reduction::GeometricMean,
            _ => Reduction::Mean,
        }
    }
}

/// Caller-supplied measure parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MeasureParams {
    /// Rank cutoff. Selects one point of a rank-swept family; truncates the
    /// ranking for every other measure, `iprec_at_recall` included.
    pub cutoff: Option<usize>,
    /// Minimum grade counted as relevant (default 1).
    pub threshold: Option<Grade>,
    /// Highest grade of the judgment scale. Bounds `threshold`; defaults to
    /// the highest grade observed in the query.
    pub max_grade: Option<Grade>,
    /// Gain function for graded measures.
    #[serde(default)]
    pub gain: Gain,
}

impl MeasureParams {
    pub fn with_cutoff(mut self, cutoff: usize) -> Self {
        self.cutoff = Some(cutoff);
        self
    }

    pub fn with_threshold(mut self, threshold: Grade) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn with_max_grade(mut self, max_grade: Grade) -> Self {
        self.max_grade = Some(max_grade);
        self
    }

    pub fn with_gain(mut self, gain: Gain) -> Self {
        self.gain = gain;
        self
    }
}

/// Validated parameters handed to the evaluators.
#[derive(Debug, Clone, Copy)]
struct Resolved {
    threshold: Grade,
    gain: Gain,
}

/// What one `compute` call evaluates, after the name and parameters agree.
#[derive(Clone, Copy)]
enum Plan {
    Scalar(fn(&RankedList, &Resolved) -> f64),
    RankSweep(&'static [usize], fn(&RankedList, usize, &Resolved) -> f64),
    RankPoint(usize, fn(&RankedList, usize, &Resolved) -> f64),
    RecallSweep,
    RecallPoint(u8),
}

/// A measure resolved from the registry, optionally pinned to one point by
/// its name (`P@10`, `ndcg_cut_20`, `iprec_at_recall_0.30`).
#[derive(Debug, Clone, Copy)]
pub struct Measure {
    def: &'static MeasureDef,
    cutoff: Option<Cutoff>,
}

impl PartialEq for Measure {
    fn eq(&self, other: &Self) -> bool {
        self.def.kind == other.def.kind && self.cutoff == other.cutoff
    }
}

impl Eq for Measure {}

impl Measure {
    pub(crate) fn new(def: &'static MeasureDef, cutoff: Option<Cutoff>) -> Self {
        Self { def, cutoff }
    }

    /// Canonical name.
    pub fn name(&self) -> &'static str {
        self.def.name
    }

    pub fn kind(&self) -> MeasureKind {
        self.def.kind
    }

    /// Point fixed by the measure name, if any.
    pub fn cutoff(&self) -> Option<Cutoff> {
        self.cutoff
    }

    pub fn explanation(&self) -> &'static str {
        self.def.explanation
    }

    pub fn reduction(&self) -> Reduction {
        self.def.kind.reduction()
    }

    /// Result label: the canonical name, suffixed with the pinned point
    /// (`P_10`, `iprec_at_recall_0.30`) when there is one.
    pub fn label(&self) -> String {
        match self.cutoff {
            Some(point) => format!("{}_{}", self.def.name, point),
            None => self.def.name.to_string(),
        }
    }

    /// This measure as `params` evaluates it: a rank-swept family given a
    /// cutoff is pinned to that rank, so `P` with cutoff 5 labels as `P_5`.
    ///
    /// # Errors
    ///
    /// Same cutoff errors as [`Measure::compute`].
    pub fn pinned(&self, params: &MeasureParams) -> Result<Measure> {
        let cutoff = match self.plan(params)? {
            Plan::RankPoint(k, _) => Some(Cutoff::Rank(k)),
            Plan::RecallPoint(tenths) => Some(Cutoff::RecallTenths(tenths)),
            Plan::Scalar(_) | Plan::RankSweep(..) | Plan::RecallSweep => None,
        };
        Ok(Measure::new(self.def, cutoff))
    }

    /// Evaluates this measure on one query's ranking.
    ///
    /// # Errors
    ///
    /// [`EvalError::InvalidParameter`] when the cutoff is 0, disagrees with
    /// the cutoff in the measure name, or the threshold is 0 or above
    /// `max(1, max_grade)`.
    pub fn compute(&self, list: &RankedList, params: &MeasureParams) -> Result<MeasureResult> {
        let plan = self.plan(params)?;
        let resolved = Resolved {
            threshold: validate_threshold(params, list)?,
            gain: params.gain,
        };
        let depth_limited = || match params.cutoff {
            Some(k) => Cow::Owned(list.truncated(k)),
            None => Cow::Borrowed(list),
        };

        let result = match plan {
            Plan::Scalar(eval) => MeasureResult::Value(eval(&depth_limited(), &resolved)),
            Plan::RankPoint(k, eval) => MeasureResult::Value(eval(list, k, &resolved)),
            Plan::RankSweep(ks, eval) => MeasureResult::Sweep(
                ks.iter()
                    .map(|&k| CutoffValue {
                        cutoff: Cutoff::Rank(k),
                        value: eval(list, k, &resolved),
                    })
                    .collect(),
            ),
            Plan::RecallPoint(tenths) => {
                let levels = rank::interpolated_precision(&depth_limited(), resolved.threshold);
                MeasureResult::Value(levels[usize::from(tenths)])
            }
            Plan::RecallSweep => {
                let levels = rank::interpolated_precision(&depth_limited(), resolved.threshold);
                MeasureResult::Sweep(
                    (0..RECALL_LEVELS)
                        .zip(levels)
                        .map(|(tenths, value)| CutoffValue {
                            cutoff: Cutoff::RecallTenths(tenths),
                            value,
                        })
                        .collect(),
                )
            }
        };

        Ok(result)
    }

    fn plan(&self, params: &MeasureParams) -> Result<Plan> {
        if params.cutoff == Some(0) {
            return Err(EvalError::invalid("cutoff must be at least 1"));
        }

        match (self.def.kind.evaluator(), self.cutoff) {
            (Evaluator::Scalar(eval), None) => Ok(Plan::Scalar(eval)),
            (Evaluator::AtRank(ks, eval), None) => Ok(match params.cutoff {
                Some(k) => Plan::RankPoint(k, eval),
                None => Plan::RankSweep(ks, eval),
            }),
            (Evaluator::AtRank(_, eval), Some(Cutoff::Rank(named))) => match params.cutoff {
                Some(given) if given != named => Err(EvalError::invalid(format!(
                    "cutoff {} conflicts with {} in measure name {}",
                    given,
                    named,
                    self.label()
                ))),
                _ => Ok(Plan::RankPoint(named, eval)),
            },
            (Evaluator::AtRecallLevel, None) => Ok(Plan::RecallSweep),
            (Evaluator::AtRecallLevel, Some(Cutoff::RecallTenths(tenths)))
                if tenths < RECALL_LEVELS =>
            {
                Ok(Plan::RecallPoint(tenths))
            }
            (_, Some(point)) => Err(EvalError::invalid(format!(
                "{} cannot be evaluated at {}",
                self.def.name, point
            ))),
        }
    }
}

fn validate_threshold(params: &MeasureParams, list: &RankedList) -> Result<Grade> {
    let Some(threshold) = params.threshold else {
        return Ok(DEFAULT_RELEVANCE_THRESHOLD);
    };
    if threshold == 0 {
        return Err(EvalError::invalid(
            "relevance threshold must be at least 1 (grade 0 is never relevant)",
        ));
    }
    let highest = params.max_grade.unwrap_or_else(|| list.max_grade());
    if threshold > highest.max(DEFAULT_RELEVANCE_THRESHOLD) {
        return Err(EvalError::invalid(format!(
            "relevance threshold {} is above the highest grade {}",
            threshold, highest
        )));
    }
    Ok(threshold)
}
