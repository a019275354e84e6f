//! Helpful error types for CLI commands
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use std::fmt;
use std::path::Path;

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    /// The main error message
    pub message: String,
    /// Additional context about what was happening
    pub context: Option<String>,
    /// Suggestions for how to fix the error
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    /// Create a new helpful error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add a suggestion for fixing the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Add multiple suggestions
    pub fn with_suggestions(mut self, suggestions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.suggestions.extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    // === Common error constructors ===

    /// File does not exist
    pub fn file_not_found(path: &Path) -> Self {
        Self::new(format!("File not found: {}", path.display()))
            .with_context("The specified file does not exist")
            .with_suggestions([
                format!("TRY: Check if the file exists: ls -la {}", path.display()),
                format!("TRY: Look for similar files: ls {}",
                    path.parent().map(|p| p.display().to_string()).unwrap_or_else(|| ".".to_string())),
            ])
    }

    /// File cannot be read (permission or encoding error)
    pub fn cannot_read_file(path: &Path, reason: &str) -> Self {
        Self::new(format!("Cannot read file: {}", path.display()))
            .with_context(reason.to_string())
            .with_suggestions([
                format!("TRY: Check file permissions: ls -la {}", path.display()),
                "TRY: Ensure the file is UTF-8 text".to_string(),
            ])
    }

    /// JSON parsing error
    pub fn json_parse_error(path: &Path, details: &str) -> Self {
        Self::new(format!("JSON parse error: {}", details))
            .with_context(format!("Failed to parse JSON file: {}", path.display()))
            .with_suggestions([
                "TRY: Validate the JSON: cat FILE | python -m json.tool".to_string(),
                "TRY: Schemas must come from 'meridian schema derive'".to_string(),
                "TRY: Value documents need 'dims' and 'data' with a 'dtype'".to_string(),
            ])
    }

    /// Definition file is not valid TOML or has unknown keys
    pub fn definitions_parse_error(path: &Path, details: &str) -> Self {
        Self::new(format!("Invalid definitions: {}", details))
            .with_context(format!("Failed to parse definitions file: {}", path.display()))
            .with_suggestions([
                "TRY: Each class is a [[class]] table with name and kind".to_string(),
                "TRY: Fields are [[class.field]] tables with name and role".to_string(),
                "TRY: Valid roles: data, coord, data_of, coord_of, attr, value".to_string(),
            ])
    }

    /// Class name not present in the definitions
    pub fn unknown_class(class: &str, path: &Path, available: &[String]) -> Self {
        let mut err = Self::new(format!("Unknown class: '{}'", class))
            .with_context(format!("Definitions file: {}", path.display()))
            .with_suggestion(format!(
                "TRY: List the classes: meridian schema list {}",
                path.display()
            ));
        if !available.is_empty() {
            err = err.with_suggestion(format!("TRY: One of: {}", available.join(", ")));
        }
        err
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ERROR: {}", self.message)?;

        if let Some(ctx) = &self.context {
            writeln!(f, "CONTEXT: {}", ctx)?;
        }

        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for HelpfulError {}

/// Machine-readable form of a command failure.
pub fn error_json(err: &anyhow::Error) -> serde_json::Value {
    match err.downcast_ref::<HelpfulError>() {
        Some(helpful) => serde_json::json!({
            "error": {
                "message": helpful.message,
                "context": helpful.context,
                "suggestions": helpful.suggestions,
            }
        }),
        None => serde_json::json!({
            "error": {
                "message": err.to_string(),
                "context": err.chain().skip(1).map(|e| e.to_string()).collect::<Vec<_>>(),
                "suggestions": Vec::<String>::new(),
            }
        }),
    }
}

/// Print a command failure as JSON on stdout, keeping `--json` output
/// parseable.
pub fn print_json_error(err: &anyhow::Error) {
    match serde_json::to_string_pretty(&error_json(err)) {
        Ok(json) => println!("{}", json),
        Err(_) => eprintln!("{:?}", err),
    }
}
