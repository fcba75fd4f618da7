use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// Byte range of the replaced region within the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionSpan {
    /// Starting byte offset (inclusive)
    pub start: usize,
    /// Ending byte offset (exclusive)
    pub end: usize,
}

/// Largest input the rewriter will scan. Patterns anchored by two landmarks
/// can consume arbitrary text between them, so the input size is the only
/// liveness bound we enforce.
pub const MAX_INPUT_BYTES: usize = 8 * 1024 * 1024;

/// Compiled-pattern size limit passed to the regex engine.
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// A region rewrite: a multi-line pattern plus a replacement template.
///
/// The pattern is compiled with dot-matches-newline semantics so a single
/// expression can span from a start landmark (e.g. a known log statement)
/// across intervening lines to an end landmark (e.g. a control-structure
/// opener). The template may reference capture groups with `$1`..`$n`;
/// by convention group 1 is the start landmark, re-emitted verbatim so the
/// region boundary survives the rewrite. Literal `$` must be written `$$`.
#[derive(Debug, Clone)]
pub struct RegionRewrite {
    pattern: Regex,
    template: String,
}

#[derive(Error, Debug)]
pub enum RegionError {
    #[error("invalid region pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("input too large for region matching: {len} bytes (limit {limit})")]
    InputTooLarge { len: usize, limit: usize },
}

/// Outcome of applying a [`RegionRewrite`] to a text snapshot.
///
/// A pattern that matches nothing is reported as [`RewriteOutcome::NoMatch`]
/// rather than silently returning the input, so callers can decide whether
/// zero matches is acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "RewriteOutcome should be checked for NoMatch"]
pub enum RewriteOutcome {
    /// The first matching span was replaced. `span` is the byte range of the
    /// original text that was consumed.
    Rewritten { text: String, span: RegionSpan },
    /// The pattern matched nothing; the input is unchanged.
    NoMatch,
}

impl RegionRewrite {
    /// Compile `pattern` with `.` matching newlines.
    pub fn new(pattern: &str, template: impl Into<String>) -> Result<Self, RegionError> {
        let pattern = RegexBuilder::new(pattern)
            .dot_matches_new_line(true)
            .size_limit(PATTERN_SIZE_LIMIT)
            .build()?;
        Ok(Self {
            pattern,
            template: template.into(),
        })
    }

    /// A rewrite that deletes the matched span: substitution with empty text.
    pub fn deletion(pattern: &str) -> Result<Self, RegionError> {
        Self::new(pattern, "")
    }

    /// Replace the first span matching the pattern.
    ///
    /// Only the first match is rewritten; with a single known target at most
    /// one match is expected, and replacing all occurrences would turn an
    /// over-broad pattern into widespread damage.
    pub fn rewrite(&self, text: &str) -> Result<RewriteOutcome, RegionError> {
        if text.len() > MAX_INPUT_BYTES {
            return Err(RegionError::InputTooLarge {
                len: text.len(),
                limit: MAX_INPUT_BYTES,
            });
        }

        let Some(found) = self.pattern.find(text) else {
            return Ok(RewriteOutcome::NoMatch);
        };
        let span = RegionSpan {
            start: found.start(),
            end: found.end(),
        };

        let rewritten = self
            .pattern
            .replacen(text, 1, self.template.as_str())
            .into_owned();

        Ok(RewriteOutcome::Rewritten {
            text: rewritten,
            span,
        })
    }

    /// The source pattern this rewrite was compiled from.
    pub fn pattern_str(&self) -> &str {
        self.pattern.as_str()
    }
}
