//! Batch evaluation over many queries.
//!
//! Reads a JSON array of queries, evaluates every requested measure per
//! query and folds the results into a [`Summary`].

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use startrec_core::{
    AggregateValue, Measure, MeasureParams, QueryEvaluation, RankedList, Summary,
};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// One query's input: grades and scores paired by position.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryInput {
    pub query_id: String,
    pub relevance: Vec<u32>,
    pub scores: Vec<f64>,
}

/// Flattened per-query value.
#[derive(Debug, Clone, Serialize)]
pub struct LabelledValue {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Serialize)]
pub struct QueryReport {
    pub query_id: String,
    pub values: Vec<LabelledValue>,
}

#[derive(Debug, Serialize)]
pub struct BatchReport {
    pub num_queries: usize,
    pub measures: Vec<String>,
    pub aggregate: Vec<AggregateValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_query: Option<Vec<QueryReport>>,
}

pub struct BatchOptions {
    /// Keep every query's values in the report
    pub per_query: bool,
    /// Draw a progress bar on stderr
    pub progress: bool,
}

/// Loads queries from a JSON file.
pub fn load_queries(path: &Path) -> Result<Vec<QueryInput>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse queries from {}", path.display()))
}

/// Evaluates every query. The first failing query aborts the batch.
///
/// The relevance threshold is checked against the highest grade in the
/// whole batch, so a query without top-graded documents is still valid.
pub fn run_batch(
    queries: &[QueryInput],
    measures: &[Measure],
    params: &MeasureParams,
    options: &BatchOptions,
) -> Result<BatchReport> {
    let pb = if options.progress {
        let pb = ProgressBar::new(queries.len() as u64);
        pb.set_style(ProgressStyle::default_bar().template("{msg} [{bar:40}] {pos}/{len}")?);
        pb.set_message("Queries");
        pb
    } else {
        ProgressBar::hidden()
    };

    let corpus_max = queries
        .iter()
        .flat_map(|q| q.relevance.iter().copied())
        .max()
        .unwrap_or(0);
    let params = MeasureParams {
        max_grade: params.max_grade.or(Some(corpus_max)),
        ..*params
    };

    let mut summary = Summary::new();
    let mut per_query = Vec::new();

    for query in queries {
        let list = RankedList::align(&query.relevance, &query.scores)
            .with_context(|| format!("Query '{}'", query.query_id))?;
        let evaluation = QueryEvaluation::evaluate(measures, &list, &params)
            .with_context(|| format!("Query '{}'", query.query_id))?;

        debug!(
            query_id = %query.query_id,
            retrieved = list.num_retrieved(),
            "evaluated query"
        );

        summary.add_query(&evaluation);
        if options.per_query {
            per_query.push(QueryReport {
                query_id: query.query_id.clone(),
                values: evaluation
                    .labelled()
                    .into_iter()
                    .map(|(label, value)| LabelledValue { label, value })
                    .collect(),
            });
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    Ok(BatchReport {
        num_queries: summary.num_queries(),
        measures: measures.iter().map(|m| m.label()).collect(),
        aggregate: summary.finish(),
        per_query: options.per_query.then_some(per_query),
    })
}
