//! Output formatting for measure results.
//!
//! Supports both human-readable terminal output and JSON for scripting.

use crate::batch::BatchReport;
use serde::Serialize;
use startrec_core::{Measure, MeasureResult};

/// Width of the label column in human output.
const LABEL_WIDTH: usize = 24;

#[derive(Serialize)]
struct JsonResult<'a> {
    measure: &'a str,
    result: &'a MeasureResult,
    values: Vec<JsonValue>,
}

#[derive(Serialize)]
struct JsonValue {
    label: String,
    value: f64,
}

/// Formats the catalogue as one name per line.
pub fn format_list_human(names: &[&str]) -> String {
    names.join("\n")
}

/// Formats the catalogue as a JSON array.
pub fn format_list_json(names: &[&str]) -> String {
    serde_json::to_string_pretty(names).unwrap_or_else(|_| "[]".to_string())
}

/// Formats a measure's explanation, wrapped for the terminal.
pub fn format_explanation(measure: &Measure) -> String {
    format!(
        "{}\n\n{}",
        measure.label(),
        wrap_text(measure.explanation(), 72)
    )
}

/// Formats a single result, one `label value` line per value.
pub fn format_result_human(label: &str, result: &MeasureResult) -> String {
    result
        .labelled(label)
        .iter()
        .map(|(l, v)| format!("{:<width$}{:.4}", l, v, width = LABEL_WIDTH))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Formats a single result as JSON.
pub fn format_result_json(label: &str, result: &MeasureResult) -> String {
    let output = JsonResult {
        measure: label,
        result,
        values: result
            .labelled(label)
            .into_iter()
            .map(|(label, value)| JsonValue { label, value })
            .collect(),
    };
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
}

/// Formats a batch report as a table, followed by the per-query breakdown
/// when present.
pub fn format_batch_human(report: &BatchReport) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "Evaluated {} quer{}\n\n",
        report.num_queries,
        if report.num_queries == 1 { "y" } else { "ies" }
    ));

    for value in &report.aggregate {
        output.push_str(&format!(
            "{:<width$}{:.4}\n",
            value.label,
            value.value,
            width = LABEL_WIDTH
        ));
    }

    if let Some(per_query) = &report.per_query {
        output.push_str(&format!("\n{}\nPER-QUERY\n", "-".repeat(40)));
        for query in per_query {
            for value in &query.values {
                output.push_str(&format!(
                    "{:<width$}{:<12}{:.4}\n",
                    value.label,
                    query.query_id,
                    value.value,
                    width = LABEL_WIDTH
                ));
            }
        }
    }

    output.trim_end().to_string()
}

/// Formats a batch report as JSON.
pub fn format_batch_json(report: &BatchReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}

/// Greedy word wrap at `width` columns.
fn wrap_text(text: &str, width: usize) -> String {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if !line.is_empty() && line.len() + 1 + word.len() > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }

    lines.join("\n")
}
