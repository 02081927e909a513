//! Helpful error types for CLI commands
//!
//! Every error includes:
//! - What went wrong
//! - Context about the situation
//! - Suggestions for how to fix it

use std::fmt;
use std::path::Path;
use tablesplit_schema::SchemaError;

/// An error with helpful context and suggestions
#[derive(Debug)]
pub struct HelpfulError {
    /// The main error message
    pub message: String,
    /// Stable code for machine consumers, when one exists
    pub code: Option<&'static str>,
    /// Additional context about what was happening
    pub context: Option<String>,
    /// Suggestions for how to fix the error
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            context: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_suggestions(mut self, suggestions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.suggestions.extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    // === Common error constructors ===

    pub fn file_not_found(path: &Path) -> Self {
        Self::new(format!("File not found: {}", path.display()))
            .with_context("The specified file does not exist")
            .with_suggestions([
                format!("TRY: Check if the file exists: ls -la {}", path.display()),
                format!(
                    "TRY: Look for similar files: ls {}",
                    path.parent()
                        .map(|p| p.display().to_string())
                        .filter(|p| !p.is_empty())
                        .unwrap_or_else(|| ".".to_string())
                ),
            ])
    }

    pub fn cannot_read_file(path: &Path, reason: &str) -> Self {
        Self::new(format!("Cannot read file: {}", path.display()))
            .with_context(reason.to_string())
            .with_suggestion(format!("TRY: Check file permissions: ls -la {}", path.display()))
    }

    pub fn invalid_declaration(path: &Path, details: &str) -> Self {
        Self::new(format!("Invalid declaration: {}", details))
            .with_code("INVALID_DECLARATION")
            .with_context(format!("Failed to parse declaration file: {}", path.display()))
            .with_suggestions([
                "TRY: Declare each partition as a [[partitions]] table with an `id`".to_string(),
                "TRY: Use a .json extension for JSON declarations".to_string(),
            ])
    }

    pub fn invalid_records(path: &Path, details: &str) -> Self {
        Self::new(format!("Invalid expense records: {}", details))
            .with_context(format!("Failed to parse records file: {}", path.display()))
            .with_suggestions([
                "TRY: The file must hold a JSON array of expense records".to_string(),
                "TRY: Each record needs id, expense_type_id, company_id and date".to_string(),
            ])
    }

    /// Composition rejected the declaration
    pub fn composition_failed(path: &Path, err: &SchemaError) -> Self {
        Self::new(err.to_string())
            .with_code(err.code())
            .with_context(format!("Failed to compose declaration: {}", path.display()))
            .with_suggestions(schema_suggestions(err))
    }
}

fn schema_suggestions(err: &SchemaError) -> Vec<String> {
    match err {
        SchemaError::MissingPrimary => {
            vec!["TRY: Mark exactly one partition with is_primary = true".to_string()]
        }
        SchemaError::DuplicatePrimary { duplicate, .. } => vec![format!(
            "TRY: Remove is_primary from partition '{}'",
            duplicate
        )],
        SchemaError::MissingPrimaryKey(partition) => vec![format!(
            "TRY: Add identity_fields = [\"Id\"] to partition '{}'",
            partition
        )],
        SchemaError::MissingCapabilityCoverage {
            capability,
            missing_fields,
            ..
        } => vec![
            format!(
                "TRY: Declare {} on the primary and list them in its '{}' capability",
                missing_fields.join(", "),
                capability
            ),
            "TRY: Or drop the fields from the secondary's capability".to_string(),
        ],
        SchemaError::ConflictingCapability {
            capability,
            registered,
            ..
        } => vec![format!(
            "TRY: Declare capability '{}' as [{}] everywhere",
            capability,
            registered.join(", ")
        )],
        SchemaError::MissingIdentityNavigation { primary, .. } => vec![format!(
            "TRY: Add identity_navigation = {{ name = \"{0}\", target = \"{0}\" }}",
            primary
        )],
        SchemaError::MissingMirrorTarget {
            partition, field, ..
        } => vec![format!(
            "TRY: Declare field '{}' on partition '{}'",
            field, partition
        )],
        SchemaError::UnsupportedDegenerateStructure { .. } => {
            vec!["TRY: Give every index, foreign key and navigation at least one field".to_string()]
        }
        SchemaError::DuplicatePartition(_) => {
            vec!["TRY: Give every partition a unique id".to_string()]
        }
        SchemaError::DuplicateField { field, .. } => {
            vec![format!("TRY: Remove the repeated declaration of '{}'", field)]
        }
        SchemaError::UnknownField { partition, field } => vec![format!(
            "TRY: Declare field '{}' on partition '{}'",
            field, partition
        )],
        SchemaError::ComposerClosed { .. } => Vec::new(),
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => writeln!(f, "ERROR [{}]: {}", code, self.message)?,
            None => writeln!(f, "ERROR: {}", self.message)?,
        }
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

/// Print an error as a JSON object on stdout
pub fn print_json_error(err: &anyhow::Error) {
    let value = match err.downcast_ref::<HelpfulError>() {
        Some(helpful) => serde_json::json!({
            "error": {
                "message": helpful.message,
                "code": helpful.code,
                "context": helpful.context,
                "suggestions": helpful.suggestions,
            }
        }),
        None => serde_json::json!({
            "error": {
                "message": format!("{:#}", err),
            }
        }),
    };
    match serde_json::to_string_pretty(&value) {
        Ok(text) => println!("{}", text),
        Err(_) => eprintln!("{:?}", err),
    }
}
