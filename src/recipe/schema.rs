use crate::block::Delimiters;
use crate::region::RegionRewrite;
use serde::Deserialize;
use std::fmt;

/// A recipe: an ordered list of patch steps against target files.
///
/// Steps run in order and share no state; each re-reads its target, so two
/// steps touching the same file compose and whichever runs last wins.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct RecipeConfig {
    #[serde(default)]
    pub meta: Metadata,
    #[serde(default)]
    pub steps: Vec<StepDefinition>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// When true, step file paths resolve against the base directory given
    /// at run time instead of the current directory.
    #[serde(default)]
    pub base_dir_relative: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StepDefinition {
    pub id: String,
    pub file: String,
    pub action: Action,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Action {
    /// Replace the first span matching a multi-line pattern. An empty
    /// template deletes the span.
    Rewrite {
        pattern: String,
        #[serde(default)]
        template: String,
        /// Treat a non-matching pattern as "nothing to do" instead of a
        /// failure.
        #[serde(default)]
        allow_no_match: bool,
    },
    /// Drop a marker line and the delimited block that follows it.
    DeleteBlock {
        marker: String,
        #[serde(default)]
        open: Option<String>,
        #[serde(default)]
        close: Option<String>,
        #[serde(default)]
        allow_no_marker: bool,
        /// Accept a block that never closes (drops everything from the
        /// marker to end of file).
        #[serde(default)]
        allow_unterminated: bool,
    },
}

impl Action {
    /// Resolve the delimiter pair, defaulting to `{`/`}`.
    pub fn delimiters(&self) -> Result<Delimiters, String> {
        let Action::DeleteBlock { open, close, .. } = self else {
            return Ok(Delimiters::default());
        };
        let defaults = Delimiters::default();
        let open = parse_delimiter(open.as_deref(), defaults.open)?;
        let close = parse_delimiter(close.as_deref(), defaults.close)?;
        if open == close {
            return Err("open and close delimiters must differ".to_string());
        }
        Ok(Delimiters { open, close })
    }
}

fn parse_delimiter(value: Option<&str>, default: char) -> Result<char, String> {
    let Some(value) = value else {
        return Ok(default);
    };
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Ok(ch),
        _ => Err(format!(
            "delimiter must be a single character, got {value:?}"
        )),
    }
}

impl RecipeConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.steps.is_empty() {
            issues.push(ValidationIssue::EmptyStepList);
        }

        for step in &self.steps {
            if step.id.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    step_id: None,
                    field: "id",
                });
            }
            if step.file.trim().is_empty() {
                issues.push(ValidationIssue::MissingField {
                    step_id: Some(step.id.clone()),
                    field: "file",
                });
            }

            match &step.action {
                Action::Rewrite { pattern, .. } => {
                    if pattern.trim().is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            step_id: Some(step.id.clone()),
                            field: "action.pattern",
                        });
                    } else if let Err(e) = RegionRewrite::new(pattern, "") {
                        issues.push(ValidationIssue::InvalidStep {
                            step_id: Some(step.id.clone()),
                            message: e.to_string(),
                        });
                    }
                }
                Action::DeleteBlock { marker, .. } => {
                    if marker.is_empty() {
                        issues.push(ValidationIssue::MissingField {
                            step_id: Some(step.id.clone()),
                            field: "action.marker",
                        });
                    }
                    if let Err(message) = step.action.delimiters() {
                        issues.push(ValidationIssue::InvalidStep {
                            step_id: Some(step.id.clone()),
                            message,
                        });
                    }
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone)]
pub enum ValidationIssue {
    EmptyStepList,
    MissingField {
        step_id: Option<String>,
        field: &'static str,
    },
    InvalidStep {
        step_id: Option<String>,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyStepList => write!(f, "recipe contains no steps"),
            ValidationIssue::MissingField { step_id, field } => match step_id {
                Some(id) => write!(f, "step '{id}' missing required field '{field}'"),
                None => write!(f, "step missing required field '{field}'"),
            },
            ValidationIssue::InvalidStep { step_id, message } => match step_id {
                Some(id) => write!(f, "step '{id}' is invalid: {message}"),
                None => write!(f, "invalid step: {message}"),
            },
        }
    }
}
