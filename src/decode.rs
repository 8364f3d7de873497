use crate::composite::decode_composite;
use crate::error::Skipped;
use crate::line::{Declaration, Flags};
use crate::scalar::{decode_integer, decode_scalar};
use crate::value::Value;
use crate::Limits;

/// How a declaration's value tail is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Scalar,
    Integer,
    /// `associative` is true for `-A`
    Composite { associative: bool },
}

impl Strategy {
    /// `A` wins over `a` when both are present, arrays win over `i`.
    pub fn for_flags(flags: Flags) -> Strategy {
        if flags.contains('A') {
            Strategy::Composite { associative: true }
        } else if flags.contains('a') {
            Strategy::Composite { associative: false }
        } else if flags.contains('i') {
            Strategy::Integer
        } else {
            Strategy::Scalar
        }
    }
}

/// Decode the value of one matched declaration.
pub fn decode_declaration(
    decl: &Declaration<'_>,
    limits: &Limits,
    line: usize,
    report: &mut Vec<Skipped>,
) -> Value {
    let tail = decl.tail.trim();
    match Strategy::for_flags(decl.flags) {
        Strategy::Scalar => Value::Text(decode_scalar(tail)),
        Strategy::Integer => decode_integer(tail),
        Strategy::Composite { associative } => {
            decode_composite(tail, associative, limits, line, report)
        }
    }
}
