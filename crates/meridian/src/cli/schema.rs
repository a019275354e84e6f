//! Schema commands - list classes, derive schemas, show exported schemas

use anyhow::{Context, Result};
use clap::Subcommand;
use meridian_schema::{
    export_schema_json, export_schema_json_file, import_schema_json_file, ArraySchemaRef,
    AttrSchemaRef, DerivationError, ExportError, Schema, SchemaRegistry,
};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::cli::error::HelpfulError;
use crate::cli::output::{format_orderings, print_table, summary_line};

/// Subcommands for schema management
#[derive(Subcommand, Debug, Clone)]
pub enum SchemaAction {
    /// List the classes in a definitions file
    List {
        /// Definitions file (TOML)
        defs: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Derive the schema of one class
    Derive {
        /// Definitions file (TOML)
        defs: PathBuf,
        /// Class to derive
        class: String,
        /// Write the schema JSON here instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Summarize an exported schema
    Show {
        /// Schema file (JSON)
        schema: PathBuf,
        #[arg(long)]
        json: bool,
    },
}

impl SchemaAction {
    pub fn wants_json(&self) -> bool {
        match self {
            SchemaAction::List { json, .. } => *json,
            SchemaAction::Derive { json, .. } => *json,
            SchemaAction::Show { json, .. } => *json,
        }
    }
}

pub fn run(action: SchemaAction) -> Result<()> {
    match action {
        SchemaAction::List { defs, json } => list_classes(&defs, json),
        SchemaAction::Derive {
            defs,
            class,
            out,
            json,
        } => derive_schema(&defs, &class, out.as_deref(), json),
        SchemaAction::Show { schema, json } => show_schema(&schema, json),
    }
}

fn load_registry(path: &Path) -> Result<SchemaRegistry> {
    if !path.exists() {
        return Err(HelpfulError::file_not_found(path).into());
    }
    SchemaRegistry::from_toml_file(path).map_err(|err| match err {
        DerivationError::Parse(details) => {
            HelpfulError::definitions_parse_error(path, &details).into()
        }
        DerivationError::Io { source, .. } => {
            HelpfulError::cannot_read_file(path, &source.to_string()).into()
        }
        other => anyhow::Error::new(other)
            .context(format!("Failed to load definitions: {}", path.display())),
    })
}

/// Load an exported schema, mapping failures to helpful errors
pub fn load_schema(path: &Path) -> Result<Schema> {
    if !path.exists() {
        return Err(HelpfulError::file_not_found(path).into());
    }
    import_schema_json_file(path).map_err(|err| match err {
        ExportError::Json(source) => HelpfulError::json_parse_error(path, &source.to_string()).into(),
        ExportError::Io { source, .. } => {
            HelpfulError::cannot_read_file(path, &source.to_string()).into()
        }
    })
}

fn list_classes(defs: &Path, json: bool) -> Result<()> {
    let registry = load_registry(defs)?;

    if json {
        let output: Vec<serde_json::Value> = registry
            .classes()
            .iter()
            .map(|class| {
                serde_json::json!({
                    "name": class.name,
                    "kind": class.kind,
                    "fields": class.fields.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
                    "docstring": class.docstring.as_deref().and_then(meridian_schema::definition::clean_docstring),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if registry.is_empty() {
        println!("No classes defined in {}", defs.display());
        return Ok(());
    }

    let rows = registry
        .classes()
        .iter()
        .map(|class| {
            let docstring = class
                .docstring
                .as_deref()
                .and_then(meridian_schema::definition::clean_docstring);
            vec![
                class.name.clone(),
                class.kind.to_string(),
                class.fields.len().to_string(),
                summary_line(docstring.as_deref()),
            ]
        })
        .collect();
    print_table(&["CLASS", "KIND", "FIELDS", "DESCRIPTION"], rows);
    Ok(())
}

fn derive_schema(defs: &Path, class: &str, out: Option<&Path>, json: bool) -> Result<()> {
    let registry = load_registry(defs)?;
    let schema = registry.derive(class).map_err(|err| match err {
        DerivationError::UnknownClass(_) => {
            let available: Vec<String> = registry.classes().iter().map(|c| c.name.clone()).collect();
            HelpfulError::unknown_class(class, defs, &available).into()
        }
        other => anyhow::Error::new(other).context(format!("Failed to derive '{}'", class)),
    })?;
    info!(class, kind = %schema.kind(), "derived schema");

    let Some(out) = out else {
        println!("{}", export_schema_json(&schema)?);
        return Ok(());
    };

    export_schema_json_file(&schema, out)
        .with_context(|| format!("Failed to write schema: {}", out.display()))?;
    let content_hash = schema.content_hash()?;
    if json {
        let output = serde_json::json!({
            "class": class,
            "kind": schema.kind(),
            "path": out.to_string_lossy(),
            "content_hash": content_hash,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("Derived {} schema '{}' -> {}", schema.kind(), class, out.display());
        println!("  sha256: {}", content_hash);
    }
    Ok(())
}

fn show_schema(path: &Path, json: bool) -> Result<()> {
    let schema = load_schema(path)?;
    let content_hash = schema.content_hash()?;

    if json {
        let output = serde_json::json!({
            "name": schema.name(),
            "kind": schema.kind(),
            "content_hash": content_hash,
            "schema": schema,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "SCHEMA {} ({})",
        schema.name().unwrap_or("<inline>"),
        schema.kind()
    );
    if let Some(docstring) = schema.docstring() {
        println!();
        for line in docstring.lines() {
            println!("  {}", line);
        }
    }
    println!();
    println!("sha256: {}", content_hash);

    match &schema {
        Schema::Array(array) => {
            println!("Dimensions: {}", format_orderings(&array.dimensions));
            println!(
                "Dtypes:     {}",
                array.dtypes.iter().map(|d| d.name()).collect::<Vec<_>>().join(", ")
            );
            print_members("COORDINATE", &array.coordinates);
            print_attributes(&array.attributes);
        }
        Schema::Dataset(dataset) => {
            println!("Dimensions: {}", format_orderings(&dataset.dimensions));
            print_members("COORDINATE", &dataset.coordinates);
            print_members("DATA VARIABLE", &dataset.data_vars);
            print_attributes(&dataset.attributes);
        }
        Schema::Dict(dict) => print_attributes(&dict.attributes),
    }
    Ok(())
}

fn required_label(optional: bool) -> String {
    let label = if optional { "no" } else { "yes" };
    label.to_string()
}

fn print_members(label: &str, members: &[ArraySchemaRef]) {
    if members.is_empty() {
        return;
    }
    let rows = members
        .iter()
        .map(|member| {
            vec![
                member.name.clone(),
                format_orderings(&member.schema.dimensions),
                member.schema.dtypes.iter().map(|d| d.name()).collect::<Vec<_>>().join(", "),
                required_label(member.optional),
                summary_line(member.docstring.as_deref()),
            ]
        })
        .collect();
    println!();
    print_table(&[label, "DIMS", "DTYPES", "REQUIRED", "DESCRIPTION"], rows);
}

fn print_attributes(attributes: &[AttrSchemaRef]) {
    if attributes.is_empty() {
        return;
    }
    let rows = attributes
        .iter()
        .map(|attr| {
            vec![
                attr.name.clone(),
                attr.attr_type.to_string(),
                required_label(attr.optional),
                attr.default
                    .as_ref()
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                summary_line(attr.docstring.as_deref()),
            ]
        })
        .collect();
    println!();
    print_table(&["ATTRIBUTE", "TYPE", "REQUIRED", "DEFAULT", "DESCRIPTION"], rows);
}
