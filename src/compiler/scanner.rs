//! Directive scanning
//!
//! Splits template source into the positional instruction sequence. A
//! directive is `<%`, an optional `=` echo marker, a body that does not
//! cross a line break, and `%>`. Whitespace around the body is trimmed and
//! the first `%>` always closes the directive.

use once_cell::sync::Lazy;
use regex::Regex;

static DIRECTIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<%(=?)\s*(.*?)\s*%>").expect("directive pattern"));

/// One step of a compiled template, in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Text copied to the output verbatim
    Literal(String),
    /// Path or expression whose value is appended to the output
    Expression(String),
    /// Statement code executed in place
    Statement(String),
}

impl Instruction {
    /// The text carried by the instruction
    pub fn text(&self) -> &str {
        match self {
            Instruction::Literal(text)
            | Instruction::Expression(text)
            | Instruction::Statement(text) => text,
        }
    }
}

/// An instruction together with the byte offset of its text in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Located {
    pub instruction: Instruction,
    pub offset: usize,
}

/// Scan `source` into instructions. Empty literal runs between adjacent
/// directives are not emitted.
pub fn scan(source: &str) -> Vec<Instruction> {
    scan_located(source)
        .into_iter()
        .map(|located| located.instruction)
        .collect()
}

pub(crate) fn scan_located(source: &str) -> Vec<Located> {
    let mut out = Vec::new();
    let mut cursor = 0;

    for caps in DIRECTIVE.captures_iter(source) {
        let (Some(whole), Some(body)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        push_literal(&mut out, source, cursor, whole.start());

        let echo = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let text = body.as_str().trim().to_string();
        let instruction = if echo {
            Instruction::Expression(text)
        } else {
            Instruction::Statement(text)
        };
        out.push(Located {
            instruction,
            offset: body.start(),
        });

        cursor = whole.end();
    }
    push_literal(&mut out, source, cursor, source.len());

    out
}

fn push_literal(out: &mut Vec<Located>, source: &str, start: usize, end: usize) {
    if start < end {
        out.push(Located {
            instruction: Instruction::Literal(source[start..end].to_string()),
            offset: start,
        });
    }
}

/// Convert a byte offset into a 1-based line and column
pub(crate) fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(source.len());
    let before = &source[..offset];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}
