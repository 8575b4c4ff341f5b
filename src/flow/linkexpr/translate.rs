// SPDX-License-Identifier: MIT

//! Rewrites `$name` attribute references into engine lookups
//!
//! A reference starts at `$` and runs over ASCII alphanumerics, `.` and
//! `_`. When the character after `$` is `[`, brackets are part of the
//! reference too, up to the `]` that closes the first one:
//!
//! | written          | attribute   | rewritten                  |
//! |------------------|-------------|----------------------------|
//! | `$status`        | `status`    | `lookup("status")`         |
//! | `$order.total`   | `order.total` | `lookup("order.total")`  |
//! | `$order["total"]`| `order`     | `lookup("order")["total"]` |
//! | `$[node.out]`    | `node.out`  | `lookup("node.out")`       |

/// Result of translating one expression
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Translation {
    /// Referenced attribute names, in order of appearance, duplicates kept
    pub attributes: Vec<String>,
    /// Expression text with every reference replaced by a lookup
    pub rewritten: String,
}

/// Engine form of a reference to `name`
pub fn lookup_form(name: &str) -> String {
    format!("lookup(\"{}\")", name)
}

/// Find the attribute references in `expr` and rewrite them as lookups.
///
/// A `$` that is not followed by a name (end of input, whitespace, an
/// operator, `$[]`) is not a reference and stays in the text as written.
pub fn translate(expr: &str) -> Translation {
    let bytes = expr.as_bytes();
    let mut attributes = Vec::new();
    let mut rewritten = String::with_capacity(expr.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'$' {
            i += 1;
            continue;
        }

        let reference = scan_reference(bytes, i + 1);
        let name = reference.name(expr, i + 1);
        if name.is_empty() {
            i = reference.end;
            continue;
        }

        // Reference names are ASCII, so both slice bounds sit on char boundaries
        rewritten.push_str(&expr[copied..i]);
        rewritten.push_str(&lookup_form(name));
        attributes.push(name.to_string());
        copied = reference.end;
        i = reference.end;
    }
    rewritten.push_str(&expr[copied..]);

    Translation {
        attributes,
        rewritten,
    }
}

struct Reference {
    /// Started with `[`
    bracketed: bool,
    /// The opening bracket was matched
    closed: bool,
    /// Index one past the last byte of the reference
    end: usize,
}

impl Reference {
    /// Name without delimiting brackets
    fn name<'a>(&self, expr: &'a str, start: usize) -> &'a str {
        let raw = &expr[start..self.end];
        if !self.bracketed {
            return raw;
        }
        let inner = &raw[1..];
        if self.closed {
            &inner[..inner.len() - 1]
        } else {
            inner
        }
    }
}

fn scan_reference(bytes: &[u8], start: usize) -> Reference {
    let bracketed = bytes.get(start) == Some(&b'[');
    let mut depth = 0usize;
    let mut closed = false;
    let mut j = start;

    while let Some(&b) = bytes.get(j) {
        let accepted = match b {
            b'[' if bracketed && (j == start || depth > 0) => {
                depth += 1;
                true
            }
            b']' if depth > 0 => {
                depth -= 1;
                closed = depth == 0;
                true
            }
            _ => is_name_byte(b),
        };
        if !accepted {
            break;
        }
        j += 1;
    }

    Reference {
        bracketed,
        closed,
        end: j,
    }
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'.' || b == b'_'
}
