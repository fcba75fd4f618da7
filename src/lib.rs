//! Landmark Patch: source patching by textual landmarks
//!
//! A small patching toolkit for rewriting one known region of one known
//! file: locate a span by literal landmark substrings, splice in replacement
//! text, write the file back atomically. Two locate mechanisms are provided:
//!
//! - [`region::RegionRewrite`] - a multi-line regex (dot matches newline)
//!   anchored by a start and an end landmark; the first matching span is
//!   replaced by a template that re-emits the captured start landmark. An
//!   empty template deletes the span.
//! - [`block::delete_block`] - a line scanner that drops a marker line and
//!   the delimited block after it, using a nesting counter of opening vs.
//!   closing delimiters to find where the block ends.
//!
//! Neither mechanism parses the host language: delimiters inside strings or
//! comments are counted like any other character, and no attempt is made to
//! keep the result syntactically well-formed. This is a scalpel for files
//! whose shape you already know, not a refactoring engine.
//!
//! # Outcomes over silence
//!
//! Patches that find nothing report it. A non-matching pattern yields
//! [`region::RewriteOutcome::NoMatch`], an absent marker yields
//! [`block::DeleteOutcome::NoMarker`], and a block that never closes yields
//! [`block::DeleteOutcome::Unterminated`] - so a patch run cannot silently
//! ship an unpatched file.
//!
//! # Recipes
//!
//! The [`recipe`] module turns one-off calls into a declarative TOML file of
//! ordered steps, each naming its target file, its action, and whether a
//! missing span is acceptable. See [`recipe::run_recipe`].
//!
//! # Example
//!
//! ```no_run
//! use landmark_patch::region::{RegionRewrite, RewriteOutcome};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let rewrite = RegionRewrite::new(
//!     r#"(console\.log\("\[API\] Goal keyword detected"\);).*?if \(limit\) \{"#,
//!     "$1\n\n    const { amount: limit } = parseCommand(text);\n\n    if (limit) {",
//! )?;
//!
//! let source = std::fs::read_to_string("route.ts")?;
//! match rewrite.rewrite(&source)? {
//!     RewriteOutcome::Rewritten { text, .. } => std::fs::write("route.ts", text)?,
//!     RewriteOutcome::NoMatch => eprintln!("pattern not found"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod block;
pub mod recipe;
pub mod region;
pub mod splice;

// Re-exports
pub use block::{
    delete_block, delete_block_text, locate_block, BlockSpan, DeleteOutcome, Delimiters,
    LocatedBlock, TextDeleteOutcome,
};
pub use recipe::{
    load_from_path, load_from_str, run_recipe, run_step, Action, ConfigError, RecipeConfig,
    RunError, StepDefinition, StepResult,
};
pub use region::{RegionError, RegionRewrite, RegionSpan, RewriteOutcome};
pub use splice::{apply_to_file, read_source, write_source, Splice, SpliceError};
