//! Check command - validate a value document against an exported schema

use anyhow::Result;
use meridian_schema::{
    check_array_with, check_dataset_with, check_dict_with, CheckOptions, Schema, SchemaIssues,
};
use meridian_types::{Attrs, DataArray, Dataset};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};

use crate::cli::config::Config;
use crate::cli::error::HelpfulError;
use crate::cli::output::{color_for_severity, print_table_colored};
use crate::cli::schema::load_schema;

/// Arguments for the check command
#[derive(Debug, clap::Args)]
pub struct CheckArgs {
    /// Value document (JSON): a labeled array, dataset, or dict
    pub value: PathBuf,

    /// Schema file (JSON) from 'meridian schema derive'
    #[arg(long)]
    pub schema: PathBuf,

    /// Report undeclared members as errors
    #[arg(long)]
    pub strict: bool,

    /// Output the issues report in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Run the check command. Exits non-zero when any error-severity issue is
/// found.
pub fn run(args: CheckArgs, config: &Config) -> Result<ExitCode> {
    let schema = load_schema(&args.schema)?;
    let options = CheckOptions {
        strict: args.strict || config.check.strict,
    };
    debug!(schema = ?schema.name(), strict = options.strict, "checking value");

    let issues = match &schema {
        Schema::Array(array_schema) => {
            let array: DataArray = load_value(&args.value)?;
            check_array_with(&array, array_schema, options)
        }
        Schema::Dataset(dataset_schema) => {
            let dataset: Dataset = load_value(&args.value)?;
            check_dataset_with(&dataset, dataset_schema, options)
        }
        Schema::Dict(dict_schema) => {
            let dict: Attrs = load_value(&args.value)?;
            check_dict_with(&dict, dict_schema, options)
        }
    };
    info!(
        value = %args.value.display(),
        issues = issues.len(),
        errors = issues.errors().count(),
        "check finished"
    );

    if args.json {
        let report = report_json(&schema, &issues, options.strict);
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&args.value, &schema, &issues);
    }

    Ok(if issues.has_errors() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    })
}

fn load_value<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(HelpfulError::file_not_found(path).into());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| HelpfulError::cannot_read_file(path, &e.to_string()))?;
    serde_json::from_str(&content)
        .map_err(|e| HelpfulError::json_parse_error(path, &e.to_string()).into())
}

fn report_json(schema: &Schema, issues: &SchemaIssues, strict: bool) -> serde_json::Value {
    let entries: Vec<serde_json::Value> = issues
        .iter()
        .map(|issue| {
            serde_json::json!({
                "path": issue.path_string(),
                "kind": issue.kind,
                "severity": issue.severity,
                "message": issue.message,
                "found": issue.found,
                "expected": issue.expected,
            })
        })
        .collect();

    serde_json::json!({
        "schema": schema.name(),
        "kind": schema.kind(),
        "strict": strict,
        "valid": !issues.has_errors(),
        "errors": issues.errors().count(),
        "advisories": issues.advisories().count(),
        "issues": entries,
    })
}

fn print_report(value: &Path, schema: &Schema, issues: &SchemaIssues) {
    let schema_name = schema.name().unwrap_or("<inline>");
    if issues.is_empty() {
        println!("OK {} matches {} ({})", value.display(), schema_name, schema.kind());
        return;
    }

    let rows = issues
        .iter()
        .map(|issue| {
            let color = Some(color_for_severity(issue.severity));
            let path = match issue.path_string() {
                p if p.is_empty() => "-".to_string(),
                p => p,
            };
            vec![
                (issue.severity.to_string(), color),
                (path, None),
                (issue.kind.to_string(), None),
                (issue.message.clone(), None),
            ]
        })
        .collect();
    print_table_colored(&["SEVERITY", "PATH", "KIND", "MESSAGE"], rows);

    let errors = issues.errors().count();
    let advisories = issues.advisories().count();
    let verdict = if errors > 0 { "FAILED" } else { "OK" };
    println!();
    println!(
        "{} {} against {}: {} error(s), {} advisory issue(s)",
        verdict,
        value.display(),
        schema_name,
        errors,
        advisories
    );
}
