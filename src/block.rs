//! Marker-triggered deletion of structurally delimited blocks.
//!
//! This is delimiter counting over raw lines, not parsing: an `{` or `}`
//! inside a string or comment is counted like any other. Good enough for a
//! known file shape; callers needing more should reach for a real parser.

/// Inclusive range of line indices selected for deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    /// Index of the marker line (inclusive)
    pub start: usize,
    /// Index of the last consumed line (inclusive)
    pub end: usize,
}

// A span always covers the marker line, so it is never empty.
#[allow(clippy::len_without_is_empty)]
impl BlockSpan {
    /// Number of lines the span covers.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }
}

/// The pair of nesting delimiters tracked by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    pub open: char,
    pub close: char,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            open: '{',
            close: '}',
        }
    }
}

impl Delimiters {
    /// Net nesting change for one line, and whether it contains any closing
    /// delimiter at all.
    fn scan_line(&self, line: &str) -> (i32, bool) {
        let mut delta = 0i32;
        let mut saw_close = false;
        for ch in line.chars() {
            if ch == self.open {
                delta += 1;
            } else if ch == self.close {
                delta -= 1;
                saw_close = true;
            }
        }
        (delta, saw_close)
    }
}

/// A block found by [`locate_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatedBlock {
    pub span: BlockSpan,
    /// Whether a line actually closed the block. When false the span runs to
    /// the last line of the input.
    pub terminated: bool,
}

/// Outcome of [`delete_block`].
///
/// Absent markers and unterminated blocks are distinguishable outcomes, not
/// silent no-ops: a one-shot patch that matched nothing is usually a bug at
/// the call site, and the caller gets to decide.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "DeleteOutcome should be checked for NoMarker/Unterminated"]
pub enum DeleteOutcome {
    /// Marker line and the balanced block after it were removed.
    Deleted { lines: Vec<String>, span: BlockSpan },
    /// Marker found but no line closed the block; everything from the marker
    /// to the end of input was dropped.
    Unterminated { lines: Vec<String>, span: BlockSpan },
    /// No line contains the marker; input is unchanged.
    NoMarker,
}

/// Locate the first block introduced after a line satisfying `predicate`.
///
/// The nesting counter starts at 0 on the line *after* the matching line;
/// delimiters on the matching line itself are not counted, so a marker line
/// that carries its own opening delimiter undercounts by one. Choose markers
/// that precede the delimiter.
///
/// The scan ends at the first line that both brings the counter to zero or
/// below and contains at least one closing delimiter. Without such a line the
/// span extends to the last line and `terminated` is false.
pub fn locate_block<S, F>(lines: &[S], predicate: F, delims: Delimiters) -> Option<LocatedBlock>
where
    S: AsRef<str>,
    F: Fn(&str) -> bool,
{
    let start = lines.iter().position(|line| predicate(line.as_ref()))?;

    let mut depth = 0i32;
    for (offset, line) in lines[start + 1..].iter().enumerate() {
        let (delta, saw_close) = delims.scan_line(line.as_ref());
        depth += delta;
        if depth <= 0 && saw_close {
            return Some(LocatedBlock {
                span: BlockSpan {
                    start,
                    end: start + 1 + offset,
                },
                terminated: true,
            });
        }
    }

    Some(LocatedBlock {
        span: BlockSpan {
            start,
            end: lines.len() - 1,
        },
        terminated: false,
    })
}

/// Delete the marker line and the delimited block that follows it.
///
/// Lines before and after the span are returned in order, untouched.
pub fn delete_block<S: AsRef<str>>(
    lines: &[S],
    marker: &str,
    delims: Delimiters,
) -> DeleteOutcome {
    let Some(located) = locate_block(lines, |line| line.contains(marker), delims) else {
        return DeleteOutcome::NoMarker;
    };

    let span = located.span;
    let kept = lines
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx < span.start || *idx > span.end)
        .map(|(_, line)| line.as_ref().to_string())
        .collect();

    if located.terminated {
        DeleteOutcome::Deleted { lines: kept, span }
    } else {
        DeleteOutcome::Unterminated { lines: kept, span }
    }
}

/// Outcome of [`delete_block_text`], mirroring [`DeleteOutcome`] over whole
/// text instead of a line sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "TextDeleteOutcome should be checked for NoMarker/Unterminated"]
pub enum TextDeleteOutcome {
    Deleted { text: String, span: BlockSpan },
    Unterminated { text: String, span: BlockSpan },
    NoMarker,
}

/// [`delete_block`] over whole-file text.
///
/// Lines are split on `\n` without stripping `\r`, so text untouched by the
/// deletion survives byte-for-byte, including a trailing newline.
pub fn delete_block_text(text: &str, marker: &str, delims: Delimiters) -> TextDeleteOutcome {
    // A trailing newline would produce a phantom "" segment under split('\n');
    // keep it out of the scan so an unterminated span cannot swallow it.
    let (body, had_newline) = match text.strip_suffix('\n') {
        Some(body) => (body, true),
        None => (text, false),
    };
    let lines: Vec<&str> = body.split('\n').collect();

    let rejoin = |kept: Vec<String>| {
        let mut out = kept.join("\n");
        if had_newline && !out.is_empty() {
            out.push('\n');
        }
        out
    };

    match delete_block(&lines, marker, delims) {
        DeleteOutcome::Deleted { lines, span } => TextDeleteOutcome::Deleted {
            text: rejoin(lines),
            span,
        },
        DeleteOutcome::Unterminated { lines, span } => TextDeleteOutcome::Unterminated {
            text: rejoin(lines),
            span,
        },
        DeleteOutcome::NoMarker => TextDeleteOutcome::NoMarker,
    }
}
