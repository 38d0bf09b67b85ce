//! startrec CLI - retrieval quality measures from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalogue
//! startrec list
//! startrec explain ndcg
//!
//! # One query
//! startrec compute ndcg --relevance 0,1,0 --scores 1.0,0.0,1.5
//! startrec compute P --relevance 1,0,1 --scores 0.9,0.8,0.7 --cutoff 2
//!
//! # Many queries from a JSON file, mean per measure
//! startrec batch runs.json --measures map,ndcg,P@10 --per-query
//! ```

mod batch;
mod output;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use startrec_core::registry::resolve;
use startrec_core::{Gain, Measure, MeasureParams};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Measures reported by `batch` when `--measures` is not given.
const DEFAULT_BATCH_MEASURES: &[&str] = &["map", "recip_rank", "ndcg", "P@10", "recall@100"];

/// TREC-style retrieval quality measures.
///
/// Scores a ranking against graded relevance judgments with average
/// precision, NDCG, precision/recall at k, reciprocal rank and more.
#[derive(Parser)]
#[command(name = "startrec", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// List canonical measure names
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Explain what a measure computes
    Explain {
        /// Measure name or alias
        name: String,
    },
    /// Compute one measure for one query
    Compute(ComputeArgs),
    /// Evaluate every query in a JSON file and report the aggregate
    Batch(BatchArgs),
}

#[derive(Args)]
struct ComputeArgs {
    /// Measure name, alias or `name@k`
    name: String,

    /// Relevance grade per document (comma-separated)
    #[arg(long, value_delimiter = ',', required = true)]
    relevance: Vec<u32>,

    /// System score per document, same order as --relevance (comma-separated)
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true, required = true)]
    scores: Vec<f64>,

    #[command(flatten)]
    params: ParamArgs,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct BatchArgs {
    /// JSON file: array of {"query_id", "relevance", "scores"}
    input: PathBuf,

    /// Measures to evaluate (comma-separated)
    #[arg(long, value_delimiter = ',')]
    measures: Option<Vec<String>>,

    #[command(flatten)]
    params: ParamArgs,

    /// Show per-query breakdown
    #[arg(long)]
    per_query: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ParamArgs {
    /// Rank cutoff k. In `batch`, measures named with a rank (`P@10`) keep it
    #[arg(long)]
    cutoff: Option<usize>,

    /// Minimum grade counted as relevant. In `batch`, checked against the
    /// highest grade across all queries
    #[arg(long)]
    threshold: Option<u32>,

    /// Gain function for graded measures
    #[arg(long, value_enum, default_value = "linear")]
    gain: GainArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GainArg {
    Linear,
    Exponential,
}

impl From<GainArg> for Gain {
    fn from(arg: GainArg) -> Self {
        match arg {
            GainArg::Linear => Gain::Linear,
            GainArg::Exponential => Gain::Exponential,
        }
    }
}

impl ParamArgs {
    fn to_params(&self) -> MeasureParams {
        MeasureParams {
            cutoff: self.cutoff,
            threshold: self.threshold,
            max_grade: None,
            gain: self.gain.into(),
        }
    }
}

fn resolve_all<S: AsRef<str>>(names: &[S]) -> Result<Vec<Measure>> {
    names
        .iter()
        .map(|name| {
            let name = name.as_ref();
            resolve(name).with_context(|| format!("Resolving measure '{}'", name))
        })
        .collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("info")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::List { json } => {
            let names = startrec_core::list_measure_names();
            let output = if json {
                output::format_list_json(&names)
            } else {
                output::format_list_human(&names)
            };
            println!("{}", output);
        }
        Command::Explain { name } => {
            let measure = resolve(&name).with_context(|| format!("Explaining '{}'", name))?;
            println!("{}", output::format_explanation(&measure));
        }
        Command::Compute(args) => {
            let result = startrec_core::compute(
                &args.name,
                &args.relevance,
                &args.scores,
                &args.params.to_params(),
            )
            .with_context(|| format!("Computing '{}'", args.name))?;

            let label = resolve(&args.name)?.pinned(&args.params.to_params())?.label();
            let output = if args.json {
                output::format_result_json(&label, &result)
            } else {
                output::format_result_human(&label, &result)
            };
            println!("{}", output);
        }
        Command::Batch(args) => {
            let measures = match &args.measures {
                Some(names) => resolve_all(names)?,
                None => resolve_all(DEFAULT_BATCH_MEASURES)?,
            };
            let queries = batch::load_queries(&args.input)?;
            info!(
                queries = queries.len(),
                measures = measures.len(),
                "evaluating batch"
            );

            let report = batch::run_batch(
                &queries,
                &measures,
                &args.params.to_params(),
                &batch::BatchOptions {
                    per_query: args.per_query,
                    progress: !args.json,
                },
            )?;

            let output = if args.json {
                output::format_batch_json(&report)
            } else {
                output::format_batch_human(&report)
            };
            println!("{}", output);
        }
    }

    Ok(())
}
