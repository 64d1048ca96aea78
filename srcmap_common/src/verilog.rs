//! Lightweight scanner for cell instantiations in a flat Verilog netlist.
//!
//! Only the `<type> <instance> (` shape is recognised. No elaboration is
//! performed: comments and `#( ... )` parameter overrides are removed, then
//! each remaining line is matched on its own.

use std::collections::HashSet;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Result, read_to_string};

/// Leading marker of a Verilog escaped identifier.
pub const ESCAPE: char = '\\';

lazy_static! {
    static ref INSTANCE_RE: Regex =
        Regex::new(r"^\s*(\S+)\s+(\\\S+|[\w$]+)\s*\(").expect("static regex");

    /// Statement keywords that the instantiation pattern would otherwise pick up.
    static ref RESERVED: HashSet<&'static str> = [
        "module", "input", "output", "wire", "reg", "assign", "endmodule", "inout",
        "parameter", "localparam", "always", "initial", "function", "task",
        "generate", "genvar", "supply0", "supply1", "if", "else", "begin", "end",
        "case", "default", "endcase", "for", "while", "defparam", "specify",
        "endspecify", "or", "and", "not", "buf",
    ]
    .into_iter()
    .collect();
}

/// One instantiation as it appears in the netlist.
///
/// `cell_type` keeps its escape marker, `instance_name` does not.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedCell {
    /// Instance name, escape marker removed.
    pub instance_name: String,
    /// Cell type token as written.
    pub cell_type: String,
}

impl ParsedCell {
    /// Creates a cell from its instance name and type token.
    pub fn new(instance_name: impl Into<String>, cell_type: impl Into<String>) -> Self {
        Self {
            instance_name: instance_name.into(),
            cell_type: cell_type.into(),
        }
    }
}

/// Reads `path` and returns its instantiations in order of appearance.
pub fn parse_netlist_file(path: &Path) -> Result<Vec<ParsedCell>> {
    let text = read_to_string(path)?;
    let cells = parse_instantiations(&text);
    tracing::debug!(
        "Parsed {} instantiations from {}",
        cells.len(),
        path.display()
    );
    Ok(cells)
}

/// Returns the instantiations in `source`, in order of appearance.
pub fn parse_instantiations(source: &str) -> Vec<ParsedCell> {
    let stripped = strip_parameter_blocks(&strip_comments(source));

    stripped
        .lines()
        .filter_map(|line| {
            let caps = INSTANCE_RE.captures(line)?;
            let cell_type = caps.get(1)?.as_str();
            let instance = caps.get(2)?.as_str();

            if is_reserved(cell_type) {
                return None;
            }

            Some(ParsedCell::new(
                instance.strip_prefix(ESCAPE).unwrap_or(instance),
                cell_type,
            ))
        })
        .collect()
}

/// True when `token` (escape marker ignored) is a statement keyword.
pub fn is_reserved(token: &str) -> bool {
    RESERVED.contains(token.strip_prefix(ESCAPE).unwrap_or(token))
}

/// Canonical spelling of a cell type for cross-format comparison.
pub fn normalize_type(cell_type: &str) -> String {
    cell_type
        .strip_prefix(ESCAPE)
        .unwrap_or(cell_type)
        .to_ascii_lowercase()
}

/// Removes `//` line comments and `/* */` block comments.
///
/// Block comments do not nest; the first `*/` closes. Newlines inside a block
/// comment are kept so line structure survives. Escaped identifiers are copied
/// verbatim up to their terminating whitespace.
pub fn strip_comments(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ESCAPE => {
                out.push(c);
                while let Some(&next) = chars.peek() {
                    if next.is_whitespace() {
                        break;
                    }
                    out.push(next);
                    chars.next();
                }
            }
            '/' if chars.peek() == Some(&'/') => {
                for next in chars.by_ref() {
                    if next == '\n' {
                        out.push('\n');
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for next in chars.by_ref() {
                    if prev == '*' && next == '/' {
                        break;
                    }
                    if next == '\n' {
                        out.push('\n');
                    }
                    prev = next;
                }
            }
            _ => out.push(c),
        }
    }

    out
}

/// Deletes every `#(` ... `)` region, including nested parentheses.
///
/// An unterminated region swallows the rest of the input.
pub fn strip_parameter_blocks(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            ESCAPE => {
                out.push(c);
                while let Some(&next) = chars.peek() {
                    if next.is_whitespace() {
                        break;
                    }
                    out.push(next);
                    chars.next();
                }
            }
            '#' if chars.peek() == Some(&'(') => {
                chars.next();
                let mut depth = 1usize;
                for next in chars.by_ref() {
                    match next {
                        '(' => depth += 1,
                        ')' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => out.push(c),
        }
    }

    out
}
