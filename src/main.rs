use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use landmark_patch::block::{delete_block_text, Delimiters, TextDeleteOutcome};
use landmark_patch::recipe::{load_from_path, run_recipe, StepResult};
use landmark_patch::region::{RegionRewrite, RewriteOutcome};
use landmark_patch::splice::{apply_to_file, Splice};
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "landmark-patch")]
#[command(about = "Patch source files by textual landmarks", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace the first region matching a multi-line pattern
    Rewrite {
        /// File to patch
        file: PathBuf,

        /// Pattern anchored by landmark substrings; `.` matches newlines
        #[arg(short, long)]
        pattern: String,

        /// Replacement template ($1 re-emits capture group 1); empty deletes the span
        #[arg(short, long, default_value = "")]
        template: String,

        /// Exit successfully when the pattern matches nothing
        #[arg(long)]
        allow_no_match: bool,

        /// Dry run - show what would change without modifying the file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Delete a marker line and the delimited block that follows it
    DeleteBlock {
        /// File to patch
        file: PathBuf,

        /// Substring identifying the marker line
        #[arg(short, long)]
        marker: String,

        /// Opening delimiter tracked by the nesting counter
        #[arg(long, default_value = "{")]
        open: char,

        /// Closing delimiter tracked by the nesting counter
        #[arg(long, default_value = "}")]
        close: char,

        /// Exit successfully when no line contains the marker
        #[arg(long)]
        allow_no_marker: bool,

        /// Accept a block that never closes (drops marker through end of file)
        #[arg(long)]
        allow_unterminated: bool,

        /// Dry run - show what would change without modifying the file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },

    /// Run all steps of a TOML recipe
    Run {
        /// Path to the recipe file
        recipe: PathBuf,

        /// Base directory for step file paths (defaults to the recipe's directory)
        #[arg(short, long)]
        base_dir: Option<PathBuf>,

        /// Dry run - show what would change without modifying files
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Show unified diff of changes
        #[arg(short, long)]
        diff: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Rewrite {
            file,
            pattern,
            template,
            allow_no_match,
            dry_run,
            diff,
        } => cmd_rewrite(&file, &pattern, &template, allow_no_match, dry_run, diff),

        Commands::DeleteBlock {
            file,
            marker,
            open,
            close,
            allow_no_marker,
            allow_unterminated,
            dry_run,
            diff,
        } => cmd_delete_block(
            &file,
            &marker,
            Delimiters { open, close },
            allow_no_marker,
            allow_unterminated,
            dry_run,
            diff,
        ),

        Commands::Run {
            recipe,
            base_dir,
            dry_run,
            diff,
        } => cmd_run(&recipe, base_dir, dry_run, diff),
    }
}

/// Helper: Show a colored unified diff, grouped into hunks with context
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (patched)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            println!("{}", "  ...".dimmed());
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let old_line = change
                    .old_index()
                    .map_or_else(|| " ".repeat(4), |i| format!("{:4}", i + 1));
                let line = format!("{}", change);
                match change.tag() {
                    ChangeTag::Delete => print!("{} {}{}", old_line.dimmed(), "-".red(), line.red()),
                    ChangeTag::Insert => print!("{} {}{}", old_line.dimmed(), "+".green(), line.green()),
                    ChangeTag::Equal => print!("{}  {}", old_line.dimmed(), line),
                }
            }
        }
    }
    println!();
}

/// Helper: Report the outcome of one patch cycle.
///
/// `no_change` carries the reason when the span was absent but tolerated;
/// an unchanged splice otherwise means the patch was already applied.
fn report(file: &Path, splice: &Splice, no_change: Option<&str>, dry_run: bool, show_diff: bool) {
    if let Some(reason) = no_change {
        println!(
            "{} No change to {} ({})",
            "⊙".yellow(),
            file.display(),
            reason.dimmed()
        );
        return;
    }

    if !splice.changed() {
        println!(
            "{} Already applied, {} unchanged",
            "⊙".yellow(),
            file.display()
        );
        return;
    }

    if show_diff {
        display_diff(file, &splice.original, &splice.modified);
    }

    if dry_run {
        println!("{} Would patch {}", "[DRY RUN]".cyan(), file.display());
    } else {
        println!("{} Patched {}", "✓".green(), file.display());
    }
}

fn cmd_rewrite(
    file: &Path,
    pattern: &str,
    template: &str,
    allow_no_match: bool,
    dry_run: bool,
    show_diff: bool,
) -> Result<()> {
    let rewrite = RegionRewrite::new(pattern, template).context("invalid pattern")?;

    let mut no_change = None;
    let splice = apply_to_file(file, dry_run, |original: &str| -> Result<String> {
        match rewrite.rewrite(original)? {
            RewriteOutcome::Rewritten { text, span } => {
                println!(
                    "{}",
                    format!("Matched bytes {}..{}", span.start, span.end).dimmed()
                );
                Ok(text)
            }
            RewriteOutcome::NoMatch => {
                if allow_no_match {
                    no_change = Some("pattern not found");
                    return Ok(original.to_string());
                }
                eprintln!("{} Pattern not found in {}", "✗".red(), file.display());
                std::process::exit(1);
            }
        }
    })
    .with_context(|| format!("cannot patch {}", file.display()))?;

    report(file, &splice, no_change, dry_run, show_diff);
    Ok(())
}

fn cmd_delete_block(
    file: &Path,
    marker: &str,
    delims: Delimiters,
    allow_no_marker: bool,
    allow_unterminated: bool,
    dry_run: bool,
    show_diff: bool,
) -> Result<()> {
    if delims.open == delims.close {
        anyhow::bail!("open and close delimiters must differ");
    }

    let mut no_change = None;
    let splice = apply_to_file(file, dry_run, |original: &str| -> Result<String> {
        match delete_block_text(original, marker, delims) {
            TextDeleteOutcome::Deleted { text, span } => {
                println!(
                    "{}",
                    format!("Deleting lines {}..={}", span.start, span.end).dimmed()
                );
                Ok(text)
            }
            TextDeleteOutcome::Unterminated { text, span } => {
                if allow_unterminated {
                    println!(
                        "{}",
                        format!(
                            "Block never closes; deleting lines {}..={}",
                            span.start, span.end
                        )
                        .yellow()
                    );
                    return Ok(text);
                }
                eprintln!(
                    "{} Block after marker never closes in {} (lines {}..={} would be dropped)",
                    "✗".red(),
                    file.display(),
                    span.start,
                    span.end
                );
                eprintln!("  Re-run with --allow-unterminated to drop them anyway");
                std::process::exit(1);
            }
            TextDeleteOutcome::NoMarker => {
                if allow_no_marker {
                    no_change = Some("marker not found");
                    return Ok(original.to_string());
                }
                eprintln!("{} Marker not found in {}", "✗".red(), file.display());
                std::process::exit(1);
            }
        }
    })
    .with_context(|| format!("cannot patch {}", file.display()))?;

    report(file, &splice, no_change, dry_run, show_diff);
    Ok(())
}

fn cmd_run(recipe: &Path, base_dir: Option<PathBuf>, dry_run: bool, show_diff: bool) -> Result<()> {
    let config = load_from_path(recipe)
        .with_context(|| format!("cannot load recipe {}", recipe.display()))?;

    // Step paths resolve against the recipe's own directory unless overridden,
    // so a recipe checked in next to its targets is runnable from anywhere.
    let base_dir = match base_dir {
        Some(dir) => dir,
        None => recipe
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    if !config.meta.name.is_empty() {
        println!("{}", format!("Recipe: {}", config.meta.name).bold());
    }
    if let Some(description) = &config.meta.description {
        println!("{}", description.dimmed());
    }
    if dry_run {
        println!("{}", "[DRY RUN - no files will be modified]".cyan());
    }
    println!();

    let results = run_recipe(&config, &base_dir, dry_run);

    let mut patched = 0;
    let mut unchanged = 0;
    let mut failed = 0;

    for (step_id, result) in results {
        match result {
            Ok(StepResult::Patched {
                file,
                before,
                after,
            }) => {
                if dry_run {
                    println!(
                        "{} {}: Would patch {}",
                        "✓".green(),
                        step_id,
                        file.display()
                    );
                } else {
                    println!("{} {}: Patched {}", "✓".green(), step_id, file.display());
                }
                patched += 1;

                if show_diff {
                    display_diff(&file, &before, &after);
                }
            }
            Ok(StepResult::NoChange { file, reason }) => {
                println!(
                    "{} {}: No change to {} ({})",
                    "⊙".yellow(),
                    step_id,
                    file.display(),
                    reason.dimmed()
                );
                unchanged += 1;
            }
            Err(e) => {
                eprintln!("{} {}: Failed - {}", "✗".red(), step_id, e);
                failed += 1;
            }
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} patched", format!("{}", patched).green());
    println!("  {} unchanged", format!("{}", unchanged).yellow());
    println!("  {} failed", format!("{}", failed).red());

    if failed > 0 {
        std::process::exit(1);
    }

    Ok(())
}
