pub mod composite;
pub mod decode;
pub mod error;
pub mod json;
pub mod line;
pub mod scalar;
pub mod value;

use error::{SkipReason, Skipped};
use line::LineMatch;

pub use value::{Slot, Value, Variables};

// ── Options ────────────────────────────────────────────────────────

/// Resource limits applied while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Highest indexed-array subscript that is materialized. Pairs above it
    /// are skipped, so `[4000000000]=x` cannot allocate billions of slots.
    pub max_array_index: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_array_index: 1 << 20,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub limits: Limits,
}

// ── Core API ───────────────────────────────────────────────────────

/// The decoded variables plus everything that was ignored on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseReport {
    pub variables: Variables,
    pub skipped: Vec<Skipped>,
}

/// Parse a `declare -p` dump into a map of variable name to value.
///
/// Never fails: lines that are not variable declarations are ignored and
/// malformed values decode as far as they can.
///
/// Uses the default [`Limits`]: indexed-array pairs whose subscript is above
/// `1 << 20` are dropped. Use [`parse_with_options`] to raise the limit or to
/// see what was dropped.
pub fn parse(input: &str) -> Variables {
    parse_with_options(input, &ParseOptions::default()).variables
}

/// Like [`parse`], for dumps that may not be valid UTF-8.
pub fn parse_bytes(input: &[u8]) -> Variables {
    parse(&String::from_utf8_lossy(input))
}

/// Parse a dump, also reporting skipped lines and array elements.
pub fn parse_with_options(input: &str, options: &ParseOptions) -> ParseReport {
    let mut variables = Variables::new();
    let mut skipped = Vec::new();

    for (index, raw) in input.split('\n').enumerate() {
        let text = raw.trim();
        if text.is_empty() {
            continue;
        }
        let line_no = index + 1;
        match line::classify_line(text) {
            LineMatch::Declaration(decl) => {
                let value =
                    decode::decode_declaration(&decl, &options.limits, line_no, &mut skipped);
                tracing::trace!(line = line_no, name = decl.name, kind = value.kind(), "declaration");
                variables.insert(decl.name.to_string(), value);
            }
            LineMatch::Function => {
                tracing::debug!(line = line_no, "skipping function declaration");
                skipped.push(Skipped::new(
                    line_no,
                    SkipReason::FunctionDeclaration,
                    "Function declaration".to_string(),
                ));
            }
            LineMatch::NoMatch => {
                tracing::debug!(line = line_no, "skipping line that is not a declaration");
                skipped.push(Skipped::new(
                    line_no,
                    SkipReason::NotADeclaration,
                    "Not a variable declaration".to_string(),
                ));
            }
        }
    }

    ParseReport { variables, skipped }
}
