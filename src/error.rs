use std::fmt;

/// Why a line (or one pair inside an array body) contributed nothing to the
/// result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The line does not fit `declare <flags>? <name>=<value>`.
    NotADeclaration,
    /// `declare -f ...` lines describe functions, not variables.
    FunctionDeclaration,
    /// A `[key]=value` pair with an unmatched bracket or missing `=`.
    MalformedPair,
    /// An indexed-array subscript above `Limits::max_array_index`.
    IndexOutOfRange,
}

impl SkipReason {
    /// Stable machine-readable code.
    pub fn code(self) -> &'static str {
        match self {
            SkipReason::NotADeclaration => "not-a-declaration",
            SkipReason::FunctionDeclaration => "function-declaration",
            SkipReason::MalformedPair => "malformed-pair",
            SkipReason::IndexOutOfRange => "index-out-of-range",
        }
    }
}

/// A non-fatal diagnostic: something in the input was ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    /// 1-based line number in the input
    pub line: usize,
    pub reason: SkipReason,
    pub message: String,
}

impl Skipped {
    pub fn new(line: usize, reason: SkipReason, message: String) -> Self {
        Skipped {
            line,
            reason,
            message,
        }
    }
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: {} ({})",
            self.line,
            self.message,
            self.reason.code()
        )
    }
}
