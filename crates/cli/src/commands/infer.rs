use crate::OutputFormat;
use crate::ontology::{self, AxiomDoc, OntologyDocument};
use crate::util::{colorize_entity, colorize_header, parse_rules};
use anyhow::Context;
use clap::Args;
use serde::Serialize;
use sqwrl::{Axiom, EvaluationOptionsBuilder, InferenceReport, RuleEngine};
use std::fmt::Write;
use std::fs;
use std::path::PathBuf;

#[derive(Args, Debug, Clone)]
pub struct InferArgs {
    /// JSON ontology the rules read and extend.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub ontology: PathBuf,
    /// Rule file with one SWRL rule per line.
    #[arg(long, short = 'r', value_name = "FILE")]
    pub rules: PathBuf,
    /// Upper bound on rule rounds.
    #[arg(long)]
    pub max_iterations: Option<usize>,
    /// Write the extended ontology here as JSON.
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct InferenceSummary {
    iterations: usize,
    reached_fixpoint: bool,
    inferred: Vec<AxiomDoc>,
    abandoned: Vec<String>,
}

pub fn run(args: &InferArgs, format: OutputFormat) -> anyhow::Result<String> {
    let text = fs::read_to_string(&args.rules)
        .with_context(|| format!("cannot read rules {}", args.rules.display()))?;
    let rules = parse_rules(&text).with_context(|| format!("invalid rules in {}", args.rules.display()))?;
    let mut ontology = ontology::load(&args.ontology)?;

    let mut options = EvaluationOptionsBuilder::new();
    if let Some(n) = args.max_iterations {
        options = options.with_max_rule_iterations(n);
    }
    let report = RuleEngine::with_options(options.build()).infer(&mut ontology, &rules)?;
    tracing::info!(inferred = report.inferred.len(), iterations = report.iterations, "inference finished");

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&OntologyDocument::from_ontology(&ontology))?;
        fs::write(path, json).with_context(|| format!("cannot write {}", path.display()))?;
    }

    Ok(match format {
        OutputFormat::Text => render_inference_text(&report),
        OutputFormat::Json => serde_json::to_string_pretty(&summarize(&report))?,
    })
}

pub(crate) fn summarize(report: &InferenceReport) -> InferenceSummary {
    InferenceSummary {
        iterations: report.iterations,
        reached_fixpoint: report.reached_fixpoint,
        inferred: report.inferred.iter().map(AxiomDoc::from).collect(),
        abandoned: report.abandoned.iter().map(ToString::to_string).collect(),
    }
}

fn axiom_text(axiom: &Axiom) -> String {
    match axiom {
        Axiom::Declaration(e) => format!("Declaration({} {})", e.kind, e.name),
        Axiom::ClassAssertion { class, individual } => format!("{class}({individual})"),
        Axiom::ObjectPropertyAssertion { property, subject, object } => format!("{property}({subject}, {object})"),
        Axiom::DataPropertyAssertion { property, subject, value } => {
            format!("{property}({subject}, {})", value.render())
        }
        Axiom::SameIndividual(a, b) => format!("sameAs({a}, {b})"),
        Axiom::DifferentIndividuals(a, b) => format!("differentFrom({a}, {b})"),
        other => format!("{other:?}"),
    }
}

fn render_inference_text(report: &InferenceReport) -> String {
    let mut out = String::new();
    for axiom in &report.inferred {
        let _ = writeln!(out, "{}", colorize_entity(&axiom_text(axiom)));
    }
    let status = if report.reached_fixpoint { "fixpoint reached" } else { "iteration bound reached" };
    let summary = format!(
        "{} new axiom{} in {} round{}, {status}",
        report.inferred.len(),
        if report.inferred.len() == 1 { "" } else { "s" },
        report.iterations,
        if report.iterations == 1 { "" } else { "s" },
    );
    out.push_str(&colorize_header(&summary));
    if !report.abandoned.is_empty() {
        let _ = write!(out, "\n{} match(es) abandoned on errors", report.abandoned.len());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{SAMPLE_ONTOLOGY, write_file};
    use rstest::rstest;
    use tempfile::tempdir;

    const RULES: &str = "# adults\nhasAge(?p, ?a) ^ swrlb:greaterThanOrEqual(?a, 18) -> Adult(?p)\n";

    #[rstest]
    fn json_report_lists_inferred_axioms() {
        let dir = tempdir().expect("tempdir");
        let args = InferArgs {
            ontology: write_file(dir.path(), "people.json", SAMPLE_ONTOLOGY),
            rules: write_file(dir.path(), "adults.swrl", RULES),
            max_iterations: None,
            output: None,
        };
        let json: serde_json::Value =
            serde_json::from_str(&run(&args, OutputFormat::Json).expect("infer run")).expect("json");
        assert_eq!(json["reachedFixpoint"], true);
        let inferred = json["inferred"].as_array().expect("array");
        assert_eq!(inferred.len(), 2);
        assert_eq!(inferred[0]["type"], "classAssertion");
        assert_eq!(inferred[0]["class"], "Adult");
    }

    #[rstest]
    fn extended_ontology_is_written_back() {
        let dir = tempdir().expect("tempdir");
        let output = dir.path().join("out.json");
        let args = InferArgs {
            ontology: write_file(dir.path(), "people.json", SAMPLE_ONTOLOGY),
            rules: write_file(dir.path(), "adults.swrl", RULES),
            max_iterations: Some(5),
            output: Some(output.clone()),
        };
        let text = run(&args, OutputFormat::Text).expect("infer run");
        assert!(text.contains("Adult(p1)"));
        let written = ontology::load(&output).expect("reload");
        assert!(written.iter().any(|a| matches!(a, Axiom::ClassAssertion { class, .. } if class == "Adult")));
    }

    #[rstest]
    fn rule_syntax_errors_fail_the_command() {
        let dir = tempdir().expect("tempdir");
        let args = InferArgs {
            ontology: write_file(dir.path(), "people.json", SAMPLE_ONTOLOGY),
            rules: write_file(dir.path(), "bad.swrl", "A(?x) ->\n"),
            max_iterations: None,
            output: None,
        };
        let err = run(&args, OutputFormat::Text).unwrap_err();
        assert!(format!("{err:#}").contains("line 1"));
    }
}
