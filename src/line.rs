use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// `declare <flags>? <name>=<tail>`. The `regex` crate matches in linear
    /// time, so hostile input cannot make this blow up.
    static ref DECLARE_LINE: Regex =
        Regex::new(r"(?s)^declare\s+(?:(-[A-Za-z-]+)\s+)?([A-Za-z_][A-Za-z0-9_]*)=(.*)$")
            .unwrap();
}

/// Set of single-letter attribute codes from a `-xyz` flag token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags(u64);

impl Flags {
    /// Parse a flag token such as `-aix`. `--` (or any token with a second
    /// `-`) yields the empty set.
    pub fn from_token(token: &str) -> Flags {
        let letters = token.strip_prefix('-').unwrap_or(token);
        if letters.contains('-') {
            return Flags::default();
        }
        let mut bits = 0u64;
        for ch in letters.chars() {
            if let Some(bit) = Self::bit(ch) {
                bits |= bit;
            }
        }
        Flags(bits)
    }

    fn bit(ch: char) -> Option<u64> {
        match ch {
            'a'..='z' => Some(1 << (ch as u32 - 'a' as u32)),
            'A'..='Z' => Some(1 << (26 + ch as u32 - 'A' as u32)),
            _ => None,
        }
    }

    pub fn contains(self, ch: char) -> bool {
        Self::bit(ch).is_some_and(|bit| self.0 & bit != 0)
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `f` without `a` or `i`.
    ///
    /// Real function lines never carry `a`/`i`, so the extra condition is
    /// odd, but callers depend on the exact behavior.
    pub fn is_function(self) -> bool {
        self.contains('f') && !self.contains('a') && !self.contains('i')
    }
}

/// A recognized variable declaration, borrowing from the input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Declaration<'a> {
    pub flags: Flags,
    pub name: &'a str,
    /// Everything after the first `=`, untouched.
    pub tail: &'a str,
}

/// Outcome of matching one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineMatch<'a> {
    Declaration(Declaration<'a>),
    Function,
    NoMatch,
}

/// Match a trimmed line, distinguishing function lines from other misses.
pub fn classify_line(line: &str) -> LineMatch<'_> {
    let Some(caps) = DECLARE_LINE.captures(line) else {
        return LineMatch::NoMatch;
    };
    let flags = caps
        .get(1)
        .map(|m| Flags::from_token(m.as_str()))
        .unwrap_or_default();
    if flags.is_function() {
        return LineMatch::Function;
    }
    match (caps.get(2), caps.get(3)) {
        (Some(name), Some(tail)) => LineMatch::Declaration(Declaration {
            flags,
            name: name.as_str(),
            tail: tail.as_str(),
        }),
        _ => LineMatch::NoMatch,
    }
}

/// Match a trimmed line against the declaration grammar.
pub fn match_line(line: &str) -> Option<Declaration<'_>> {
    match classify_line(line) {
        LineMatch::Declaration(decl) => Some(decl),
        LineMatch::Function | LineMatch::NoMatch => None,
    }
}
