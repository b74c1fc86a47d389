use crate::OutputFormat;
use crate::ontology;
use crate::util::{colorize_entity, colorize_header, colorize_literal, value_json, value_text};
use anyhow::Context;
use clap::Args;
use serde::Serialize;
use sqwrl::{EvaluationOptionsBuilder, QueryEngine, QueryResult, Value};
use std::fmt::Write;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// JSON ontology to query.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub ontology: PathBuf,
    /// Query text, e.g. `Person(?p) -> sqwrl:select(?p)`.
    #[arg(value_name = "QUERY", required_unless_present = "file")]
    pub query: Option<String>,
    /// Read the query from a file instead.
    #[arg(long, short = 'f', value_name = "FILE", conflicts_with = "query")]
    pub file: Option<PathBuf>,
    /// Cap on the number of rows, applied after `sqwrl:limit`.
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub(crate) struct ResultSummary {
    columns: Vec<String>,
    rows: Vec<Vec<serde_json::Value>>,
}

pub fn run(args: &QueryArgs, format: OutputFormat) -> anyhow::Result<String> {
    let text = match (&args.query, &args.file) {
        (Some(query), _) => query.clone(),
        (None, Some(path)) => {
            fs::read_to_string(path).with_context(|| format!("cannot read query {}", path.display()))?
        }
        (None, None) => anyhow::bail!("no query given"),
    };
    let ontology = ontology::load(&args.ontology)?;
    let mut options = EvaluationOptionsBuilder::new();
    if let Some(limit) = args.limit {
        options = options.with_result_limit(limit);
    }
    let result = QueryEngine::with_options(&ontology, options.build()).run_text(text.trim())?;
    tracing::info!(rows = result.row_count(), "query finished");

    Ok(match format {
        OutputFormat::Text => render_query_text(&result),
        OutputFormat::Json => serde_json::to_string_pretty(&summarize(&result))?,
    })
}

pub(crate) fn summarize(result: &QueryResult) -> ResultSummary {
    ResultSummary {
        columns: result.column_names().to_vec(),
        rows: result.rows().iter().map(|row| row.iter().map(value_json).collect()).collect(),
    }
}

fn render_query_text(result: &QueryResult) -> String {
    let header = result.column_names().join("\t");
    let mut out = colorize_header(&header);
    for row in result.rows() {
        out.push('\n');
        let cells: Vec<String> = row
            .iter()
            .map(|value| match value {
                Value::Literal(_) => colorize_literal(&value_text(value)),
                _ => colorize_entity(&value_text(value)),
            })
            .collect();
        out.push_str(&cells.join("\t"));
    }
    let _ = write!(out, "\n({} row{})", result.row_count(), if result.row_count() == 1 { "" } else { "s" });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{SAMPLE_ONTOLOGY, write_file};
    use rstest::rstest;
    use tempfile::tempdir;

    fn args(ontology: PathBuf, query: &str) -> QueryArgs {
        QueryArgs { ontology, query: Some(query.to_owned()), file: None, limit: None }
    }

    #[rstest]
    fn json_output_lists_columns_and_typed_rows() {
        let dir = tempdir().expect("tempdir");
        let path = write_file(dir.path(), "people.json", SAMPLE_ONTOLOGY);
        let output = run(
            &args(path, "hasAge(?p, ?a) -> sqwrl:select(?p, ?a) ^ sqwrl:orderBy(?a)"),
            OutputFormat::Json,
        )
        .expect("query run");
        let json: serde_json::Value = serde_json::from_str(&output).expect("json");
        assert_eq!(json["columns"], serde_json::json!(["p", "a"]));
        assert_eq!(json["rows"][0][0]["name"], "p2");
        assert_eq!(json["rows"][0][1]["datatype"], "xsd:byte");
    }

    #[rstest]
    fn text_output_ends_with_the_row_count() {
        let dir = tempdir().expect("tempdir");
        let path = write_file(dir.path(), "people.json", SAMPLE_ONTOLOGY);
        let mut a = args(path, "Person(?p) -> sqwrl:select(?p)");
        a.limit = Some(1);
        let output = run(&a, OutputFormat::Text).expect("query run");
        assert!(output.ends_with("(1 row)"));
    }

    #[rstest]
    fn query_can_come_from_a_file() {
        let dir = tempdir().expect("tempdir");
        let onto = write_file(dir.path(), "people.json", SAMPLE_ONTOLOGY);
        let query = write_file(dir.path(), "q.sqwrl", "Person(?p) -> sqwrl:count(?p)\n");
        let a = QueryArgs { ontology: onto, query: None, file: Some(query), limit: None };
        let json: serde_json::Value =
            serde_json::from_str(&run(&a, OutputFormat::Json).expect("query run")).expect("json");
        assert_eq!(json["rows"][0][0]["value"], "3");
    }

    #[rstest]
    fn engine_errors_are_reported() {
        let dir = tempdir().expect("tempdir");
        let path = write_file(dir.path(), "people.json", SAMPLE_ONTOLOGY);
        let err = run(&args(path, "Person(?p) -> B(?p)"), OutputFormat::Text).unwrap_err();
        assert!(err.to_string().contains("syntax"));
    }

    #[rstest]
    fn missing_ontology_names_the_path() {
        let err = run(&args(PathBuf::from("/nonexistent/onto.json"), "A(?x) -> sqwrl:select(?x)"), OutputFormat::Text)
            .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/onto.json"));
    }
}
