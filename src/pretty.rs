//! Streaming JSON pretty printer.
//!
//! A single left-to-right pass with constant state: nesting level, quote and
//! escape flags, and a one-slot pending newline. The input is never parsed
//! into a tree, so malformed input is reformatted on a best-effort basis
//! instead of rejected.

const INDENT: char = '\t';

/// Re-emit compact JSON text with one entry per line and one tab per level.
pub fn pretty_print(compact: &str) -> String {
    let mut out = String::with_capacity(compact.len() + compact.len() / 2);
    let mut level: usize = 0;
    let mut in_quotes = false;
    let mut in_escape = false;
    // Newline owed before the next emitted character, at this level.
    let mut pending: Option<usize> = None;

    for c in compact.chars() {
        let mut newline_at = pending.take();
        let mut emit = Some(c);
        let mut trailing_space = false;

        if in_escape {
            in_escape = false;
        } else if c == '"' {
            in_quotes = !in_quotes;
        } else if !in_quotes {
            match c {
                '}' | ']' => {
                    level = level.saturating_sub(1);
                    pending = None;
                    newline_at = Some(level);
                }
                '{' | '[' => {
                    level += 1;
                    pending = Some(level);
                }
                ',' => pending = Some(level),
                ':' => trailing_space = true,
                ' ' | '\t' | '\n' | '\r' => {
                    emit = None;
                    pending = newline_at.take();
                }
                _ => {}
            }
        } else if c == '\\' {
            in_escape = true;
        }

        if let Some(depth) = newline_at {
            out.push('\n');
            out.extend(std::iter::repeat(INDENT).take(depth));
        }
        if let Some(c) = emit {
            out.push(c);
        }
        if trailing_space {
            out.push(' ');
        }
    }

    out
}
