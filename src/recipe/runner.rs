//! Recipe runner - executes patch steps with explicit per-step outcomes
//!
//! Each step is a strict read → compute → write cycle against its target
//! file. Steps share no state: a step always sees the text the previous step
//! left on disk, so steps against the same file compose in order.

use crate::block::{delete_block_text, TextDeleteOutcome};
use crate::recipe::schema::{Action, RecipeConfig, StepDefinition};
use crate::region::{RegionError, RegionRewrite, RewriteOutcome};
use crate::splice::{apply_to_file, SpliceError};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result of running a single step.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "StepResult should be checked for NoChange"]
pub enum StepResult {
    /// The target span was found and the file rewritten (or would be, under
    /// dry-run). `before` and `after` carry the full file contents so
    /// callers can render a diff without re-reading.
    Patched {
        file: PathBuf,
        before: String,
        after: String,
    },
    /// Nothing to do: the pattern or marker was absent and the step allows
    /// that, or the file already carries the patched text.
    NoChange { file: PathBuf, reason: String },
}

impl StepResult {
    pub fn file(&self) -> &Path {
        match self {
            StepResult::Patched { file, .. } | StepResult::NoChange { file, .. } => file,
        }
    }
}

/// Errors during step execution.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("pattern matched nothing in {file}")]
    NoMatch { file: PathBuf },

    #[error("marker line not found in {file}")]
    NoMarker { file: PathBuf },

    #[error("block after marker never closes in {file} (lines {start}..={end} would be dropped)")]
    Unterminated {
        file: PathBuf,
        start: usize,
        end: usize,
    },

    #[error("invalid delimiters: {0}")]
    Delimiters(String),

    #[error(transparent)]
    Region(#[from] RegionError),

    #[error(transparent)]
    Splice(#[from] SpliceError),
}

/// Run every step of a recipe in order.
///
/// Step file paths resolve against `base_dir` when the recipe's meta says
/// `base_dir_relative`. A failing step does not stop the run; each step
/// reports its own result, mirroring one-script-per-patch execution.
pub fn run_recipe(
    config: &RecipeConfig,
    base_dir: &Path,
    dry_run: bool,
) -> Vec<(String, Result<StepResult, RunError>)> {
    config
        .steps
        .iter()
        .map(|step| {
            let result = run_step(step, base_dir, config.meta.base_dir_relative, dry_run);
            (step.id.clone(), result)
        })
        .collect()
}

/// Run one step: locate the span in the target file and splice it out.
pub fn run_step(
    step: &StepDefinition,
    base_dir: &Path,
    base_dir_relative: bool,
    dry_run: bool,
) -> Result<StepResult, RunError> {
    let file = if base_dir_relative {
        base_dir.join(&step.file)
    } else {
        PathBuf::from(&step.file)
    };

    // Set when the span is absent but the step tolerates that; the splice
    // then carries the text through unchanged.
    let mut no_change: Option<&'static str> = None;

    let splice = apply_to_file(&file, dry_run, |original| match &step.action {
        Action::Rewrite {
            pattern,
            template,
            allow_no_match,
        } => {
            let rewrite = RegionRewrite::new(pattern, template.as_str())?;
            match rewrite.rewrite(original)? {
                RewriteOutcome::Rewritten { text, .. } => Ok(text),
                RewriteOutcome::NoMatch => {
                    if *allow_no_match {
                        no_change = Some("pattern not found");
                        Ok(original.to_string())
                    } else {
                        Err(RunError::NoMatch { file: file.clone() })
                    }
                }
            }
        }

        Action::DeleteBlock {
            marker,
            allow_no_marker,
            allow_unterminated,
            ..
        } => {
            let delims = step.action.delimiters().map_err(RunError::Delimiters)?;
            match delete_block_text(original, marker, delims) {
                TextDeleteOutcome::Deleted { text, .. } => Ok(text),
                TextDeleteOutcome::Unterminated { text, span } => {
                    if *allow_unterminated {
                        Ok(text)
                    } else {
                        Err(RunError::Unterminated {
                            file: file.clone(),
                            start: span.start,
                            end: span.end,
                        })
                    }
                }
                TextDeleteOutcome::NoMarker => {
                    if *allow_no_marker {
                        no_change = Some("marker not found");
                        Ok(original.to_string())
                    } else {
                        Err(RunError::NoMarker { file: file.clone() })
                    }
                }
            }
        }
    })?;

    if let Some(reason) = no_change {
        return Ok(StepResult::NoChange {
            file,
            reason: reason.to_string(),
        });
    }

    // Rewrites that land on already-patched text are a no-op, not a write.
    if !splice.changed() {
        return Ok(StepResult::NoChange {
            file,
            reason: "already applied".to_string(),
        });
    }

    Ok(StepResult::Patched {
        file,
        before: splice.original,
        after: splice.modified,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::schema::Metadata;
    use std::fs;

    fn rewrite_step(file: &str, pattern: &str, template: &str) -> StepDefinition {
        StepDefinition {
            id: "rewrite".to_string(),
            file: file.to_string(),
            action: Action::Rewrite {
                pattern: pattern.to_string(),
                template: template.to_string(),
                allow_no_match: false,
            },
        }
    }

    fn delete_step(file: &str, marker: &str) -> StepDefinition {
        StepDefinition {
            id: "delete".to_string(),
            file: file.to_string(),
            action: Action::DeleteBlock {
                marker: marker.to_string(),
                open: None,
                close: None,
                allow_no_marker: false,
                allow_unterminated: false,
            },
        }
    }

    #[test]
    fn test_rewrite_step_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("route.ts");
        fs::write(&target, "before start middle end after\n").unwrap();

        let step = rewrite_step("route.ts", r"(start).*end", "$1 patched end");
        let result = run_step(&step, dir.path(), true, false).unwrap();

        assert!(matches!(result, StepResult::Patched { .. }));
        assert_eq!(
            fs::read_to_string(&target).unwrap(),
            "before start patched end after\n"
        );
    }

    #[test]
    fn test_dry_run_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("route.ts");
        fs::write(&target, "start middle end\n").unwrap();

        let step = rewrite_step("route.ts", r"(start).*end", "$1 end");
        let result = run_step(&step, dir.path(), true, true).unwrap();

        let StepResult::Patched { before, after, .. } = result else {
            panic!("expected Patched");
        };
        assert_eq!(before, "start middle end\n");
        assert_eq!(after, "start end\n");
        assert_eq!(fs::read_to_string(&target).unwrap(), "start middle end\n");
    }

    #[test]
    fn test_strict_no_match_fails() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("route.ts"), "nothing here\n").unwrap();

        let step = rewrite_step("route.ts", r"(start).*end", "$1");
        let result = run_step(&step, dir.path(), true, false);
        assert!(matches!(result, Err(RunError::NoMatch { .. })));
    }

    #[test]
    fn test_lenient_no_match_reports_no_change() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("route.ts"), "nothing here\n").unwrap();

        let mut step = rewrite_step("route.ts", r"(start).*end", "$1");
        let Action::Rewrite { allow_no_match, .. } = &mut step.action else {
            unreachable!();
        };
        *allow_no_match = true;

        let result = run_step(&step, dir.path(), true, false).unwrap();
        assert!(matches!(result, StepResult::NoChange { .. }));
    }

    #[test]
    fn test_second_application_is_no_change() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("route.ts");
        fs::write(&target, "start middle end\n").unwrap();

        // Template keeps both landmarks, so the pattern still matches after
        // the first application and the second run changes nothing.
        let step = rewrite_step("route.ts", r"(start)\n?.*?end", "$1\nend");
        let first = run_step(&step, dir.path(), true, false).unwrap();
        assert!(matches!(first, StepResult::Patched { .. }));

        let second = run_step(&step, dir.path(), true, false).unwrap();
        let StepResult::NoChange { reason, .. } = second else {
            panic!("expected NoChange, got {second:?}");
        };
        assert_eq!(reason, "already applied");
    }

    #[test]
    fn test_delete_block_step() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("route.ts");
        fs::write(
            &target,
            "keep\n// Ask for period if not specified\nif (!period) {\n  ask();\n}\nkeep too\n",
        )
        .unwrap();

        let step = delete_step("route.ts", "Ask for period");
        let result = run_step(&step, dir.path(), true, false).unwrap();

        assert!(matches!(result, StepResult::Patched { .. }));
        assert_eq!(fs::read_to_string(&target).unwrap(), "keep\nkeep too\n");
    }

    #[test]
    fn test_strict_unterminated_fails_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("route.ts");
        let content = "keep\nMARK\nif (x) {\n  never closed\n";
        fs::write(&target, content).unwrap();

        let step = delete_step("route.ts", "MARK");
        let result = run_step(&step, dir.path(), true, false);

        assert!(matches!(result, Err(RunError::Unterminated { .. })));
        assert_eq!(fs::read_to_string(&target).unwrap(), content);
    }

    #[test]
    fn test_allowed_unterminated_keeps_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("route.ts");
        fs::write(&target, "keep\nMARK\nif (x) {\n  never closed\n").unwrap();

        let mut step = delete_step("route.ts", "MARK");
        let Action::DeleteBlock {
            allow_unterminated, ..
        } = &mut step.action
        else {
            unreachable!();
        };
        *allow_unterminated = true;

        let result = run_step(&step, dir.path(), true, false).unwrap();
        assert!(matches!(result, StepResult::Patched { .. }));
        assert_eq!(fs::read_to_string(&target).unwrap(), "keep\n");
    }

    #[test]
    fn test_missing_file_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let step = delete_step("absent.ts", "MARK");
        let result = run_step(&step, dir.path(), true, false);
        assert!(matches!(result, Err(RunError::Splice(_))));
    }

    #[test]
    fn test_run_recipe_continues_past_failures() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("route.ts"), "start middle end\n").unwrap();

        let config = RecipeConfig {
            meta: Metadata {
                name: "test".to_string(),
                description: None,
                base_dir_relative: true,
            },
            steps: vec![
                rewrite_step("route.ts", r"(nope).*never", "$1"),
                rewrite_step("route.ts", r"(start).*end", "$1 end"),
            ],
        };

        let results = run_recipe(&config, dir.path(), false);
        assert_eq!(results.len(), 2);
        assert!(results[0].1.is_err());
        assert!(matches!(results[1].1, Ok(StepResult::Patched { .. })));
        assert_eq!(
            fs::read_to_string(dir.path().join("route.ts")).unwrap(),
            "start end\n"
        );
    }
}
