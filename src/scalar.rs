//! Decoding of single shell words as printed by `declare -p`.
//!
//! Bash prints plain values as `"..."` (with `\` and `"` escaped) and falls
//! back to ANSI-C `$'...'` quoting when the value holds control characters.
//! Array elements use the same two forms, keys may also appear single-quoted
//! or bare.

use crate::value::Value;

/// Quoting style of a raw token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quoting {
    /// `$'...'`
    AnsiC,
    /// `"..."`
    Double,
    /// `'...'`
    Single,
    Bare,
}

impl Quoting {
    /// Whether backslash escapes are interpreted inside this style.
    pub fn decodes_escapes(self) -> bool {
        matches!(self, Quoting::AnsiC | Quoting::Double)
    }
}

/// Classify a trimmed token and return its quoting style with the interior
/// (the token itself for `Bare`).
pub fn classify(token: &str) -> (Quoting, &str) {
    if token.len() >= 3 && token.starts_with("$'") && token.ends_with('\'') {
        return (Quoting::AnsiC, &token[2..token.len() - 1]);
    }
    if token.len() >= 2 {
        if token.starts_with('"') && token.ends_with('"') {
            return (Quoting::Double, &token[1..token.len() - 1]);
        }
        if token.starts_with('\'') && token.ends_with('\'') {
            return (Quoting::Single, &token[1..token.len() - 1]);
        }
    }
    (Quoting::Bare, token)
}

/// Decode one value token into text.
pub fn decode_scalar(token: &str) -> String {
    let (quoting, body) = classify(token);
    if quoting.decodes_escapes() {
        unescape(body)
    } else {
        body.to_string()
    }
}

/// Decode a `declare -i` value: an integer when the decoded text is one,
/// the decoded text otherwise.
pub fn decode_integer(token: &str) -> Value {
    let text = decode_scalar(token);
    match text.trim().parse::<i64>() {
        Ok(n) => Value::Integer(n),
        Err(_) => Value::Text(text),
    }
}

/// Replace backslash escapes. Unknown escapes drop the backslash; a trailing
/// lone backslash is kept.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('v') => out.push('\u{000B}'),
            Some('f') => out.push('\u{000C}'),
            Some('b') => out.push('\u{0008}'),
            Some('a') => out.push('\u{0007}'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("$'a'"), (Quoting::AnsiC, "a"));
        assert_eq!(classify("$''"), (Quoting::AnsiC, ""));
        assert_eq!(classify("\"a\""), (Quoting::Double, "a"));
        assert_eq!(classify("'a'"), (Quoting::Single, "a"));
        assert_eq!(classify("abc"), (Quoting::Bare, "abc"));
    }

    #[test]
    fn test_lone_quote_is_bare() {
        assert_eq!(decode_scalar("\""), "\"");
        assert_eq!(decode_scalar("'"), "'");
        assert_eq!(decode_scalar("$'"), "$'");
    }

    #[test]
    fn test_unbalanced_quotes_are_bare() {
        assert_eq!(decode_scalar("\"open"), "\"open");
        assert_eq!(decode_scalar("close'"), "close'");
        assert_eq!(decode_scalar("\"mixed'"), "\"mixed'");
    }

    #[test]
    fn test_single_quotes_are_verbatim() {
        assert_eq!(decode_scalar(r"'a\nb'"), r"a\nb");
    }

    #[test]
    fn test_bare_is_verbatim() {
        assert_eq!(decode_scalar(r"a\nb"), r"a\nb");
    }

    #[test]
    fn test_escape_table() {
        let cases = [
            (r"\n", "\n"),
            (r"\r", "\r"),
            (r"\t", "\t"),
            (r"\v", "\u{000B}"),
            (r"\f", "\u{000C}"),
            (r"\b", "\u{0008}"),
            (r"\a", "\u{0007}"),
            (r"\\", "\\"),
            (r#"\""#, "\""),
            (r"\z", "z"),
            (r"\$", "$"),
            (r"\'", "'"),
        ];
        for (escaped, expected) in cases {
            assert_eq!(unescape(escaped), expected, "escape {}", escaped);
        }
    }

    #[test]
    fn test_trailing_backslash_kept() {
        assert_eq!(unescape(r"abc\"), "abc\\");
        assert_eq!(unescape(r"\\\"), "\\\\");
    }

    #[test]
    fn test_unescape_keeps_multibyte() {
        assert_eq!(unescape(r"caf\é ü"), "café ü");
    }

    #[test]
    fn test_decode_integer() {
        assert_eq!(decode_integer("\"42\""), Value::Integer(42));
        assert_eq!(decode_integer("-7"), Value::from(-7i64));
        assert_eq!(decode_integer("\"+3\""), Value::Integer(3));
        assert_eq!(decode_integer("\" 12 \""), Value::Integer(12));
        assert_eq!(decode_integer("\"notnum\""), Value::from("notnum"));
        assert_eq!(decode_integer("\"12abc\""), Value::from("12abc"));
        assert_eq!(decode_integer("\"\""), Value::from(""));
        assert_eq!(
            decode_integer("\"99999999999999999999\""),
            Value::from("99999999999999999999")
        );
    }
}
