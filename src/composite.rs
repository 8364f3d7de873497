use std::collections::BTreeMap;

use crate::error::{SkipReason, Skipped};
use crate::scalar::decode_scalar;
use crate::value::{assign_slot, Slot, Value};
use crate::Limits;

/// One `[key]=value` pair, both parts still raw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPair<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

/// A pair or a stretch of text that could not be read as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Item<'a> {
    Pair(RawPair<'a>),
    Malformed(&'a str),
}

/// Scanner state over an array body (the text between the parentheses).
struct Scanner<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    // ── Helpers ──────────────────────────────────────────────────────

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek_char(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self, n: usize) {
        self.pos += n;
    }

    fn starts_with(&self, s: &str) -> bool {
        self.remaining().starts_with(s)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn skip_ws(&mut self) {
        while let Some(ch) = self.peek_char() {
            if !ch.is_whitespace() {
                break;
            }
            self.advance(ch.len_utf8());
        }
    }

    /// Advance to the next whitespace character (or the end).
    fn skip_word(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_whitespace() {
                break;
            }
            self.advance(ch.len_utf8());
        }
    }

    // ── Items ───────────────────────────────────────────────────────

    fn next_item(&mut self) -> Option<Item<'a>> {
        self.skip_ws();
        if self.at_end() {
            return None;
        }
        let start = self.pos;

        if self.peek_char() != Some('[') {
            self.skip_word();
            return Some(Item::Malformed(&self.input[start..self.pos]));
        }
        self.advance(1);

        let Some(close) = self.remaining().find(']') else {
            // No `]` anywhere after this point, so nothing else can parse.
            self.pos = self.input.len();
            return Some(Item::Malformed(&self.input[start..]));
        };
        let key = &self.remaining()[..close];
        self.advance(close + 1);

        if self.peek_char() != Some('=') {
            self.skip_word();
            return Some(Item::Malformed(&self.input[start..self.pos]));
        }
        self.advance(1);

        let value = self.read_word();
        Some(Item::Pair(RawPair { key, value }))
    }

    /// Read one shell word starting at the current position.
    fn read_word(&mut self) -> &'a str {
        let start = self.pos;
        if self.starts_with("$'") {
            self.advance(2);
            self.read_until_quote('\'', true);
        } else if self.starts_with("\"") {
            self.advance(1);
            self.read_until_quote('"', true);
        } else if self.starts_with("'") {
            self.advance(1);
            self.read_until_quote('\'', false);
        } else {
            while let Some(ch) = self.peek_char() {
                if ch.is_whitespace() || ch == ')' {
                    break;
                }
                self.advance(ch.len_utf8());
            }
        }
        &self.input[start..self.pos]
    }

    /// Consume up to and including the closing `quote`. With `escapes`, a
    /// backslash protects the character after it. Unterminated words run to
    /// the end of the body.
    fn read_until_quote(&mut self, quote: char, escapes: bool) {
        while let Some(ch) = self.peek_char() {
            self.advance(ch.len_utf8());
            if escapes && ch == '\\' {
                if let Some(next) = self.peek_char() {
                    self.advance(next.len_utf8());
                }
            } else if ch == quote {
                return;
            }
        }
    }
}

/// Split an array body into pairs and malformed stretches, in order.
pub fn tokenize(body: &str) -> Vec<Item<'_>> {
    let mut scanner = Scanner {
        input: body,
        pos: 0,
    };
    let mut items = Vec::new();
    while let Some(item) = scanner.next_item() {
        items.push(item);
    }
    items
}

/// Strip the optional outer quotes and the parentheses from a value tail.
/// `None` when the tail is not a parenthesized list.
pub fn array_body(tail: &str) -> Option<&str> {
    let mut text = tail.trim();
    if text.len() >= 2
        && ((text.starts_with('\'') && text.ends_with('\''))
            || (text.starts_with('"') && text.ends_with('"')))
    {
        text = text[1..text.len() - 1].trim();
    }
    if text.len() >= 2 && text.starts_with('(') && text.ends_with(')') {
        Some(text[1..text.len() - 1].trim())
    } else {
        None
    }
}

/// Remove one matching pair of `'...'` or `"..."` around a subscript.
pub fn strip_key_quotes(key: &str) -> &str {
    if key.len() >= 2
        && ((key.starts_with('\'') && key.ends_with('\''))
            || (key.starts_with('"') && key.ends_with('"')))
    {
        &key[1..key.len() - 1]
    } else {
        key
    }
}

/// Bash's permissive string-to-subscript conversion: leading digits, or 0.
/// `None` only when the digits do not fit in a `usize`.
pub fn leading_index(key: &str) -> Option<usize> {
    let digits = key
        .trim()
        .bytes()
        .take_while(|b| b.is_ascii_digit())
        .try_fold(0usize, |acc, b| {
            acc.checked_mul(10)?.checked_add(usize::from(b - b'0'))
        })?;
    Some(digits)
}

/// Decode a `declare -a`/`-A` value tail, appending diagnostics for
/// anything skipped. `line` is only used to label diagnostics.
pub fn decode_composite(
    tail: &str,
    associative: bool,
    limits: &Limits,
    line: usize,
    report: &mut Vec<Skipped>,
) -> Value {
    let mut items: Vec<Slot> = Vec::new();
    let mut map: BTreeMap<String, String> = BTreeMap::new();

    if let Some(body) = array_body(tail) {
        for item in tokenize(body) {
            let pair = match item {
                Item::Pair(pair) => pair,
                Item::Malformed(text) => {
                    tracing::debug!(line, text, "skipping malformed array pair");
                    report.push(Skipped::new(
                        line,
                        SkipReason::MalformedPair,
                        format!("Malformed array element `{}`", text),
                    ));
                    continue;
                }
            };
            let key = decode_scalar(strip_key_quotes(pair.key));
            let value = decode_scalar(pair.value);
            if associative {
                map.insert(key, value);
                continue;
            }
            match leading_index(&key).filter(|&i| i <= limits.max_array_index) {
                Some(index) => assign_slot(&mut items, index, value),
                None => {
                    tracing::debug!(line, key = key.as_str(), "array index out of range");
                    report.push(Skipped::new(
                        line,
                        SkipReason::IndexOutOfRange,
                        format!(
                            "Array index `{}` exceeds the limit of {}",
                            key, limits.max_array_index
                        ),
                    ));
                }
            }
        }
    }

    if associative {
        Value::Mapping(map)
    } else {
        Value::Sequence(items)
    }
}

/// Decode an array value tail with default limits, ignoring diagnostics.
pub fn decode_array(tail: &str, associative: bool) -> Value {
    decode_composite(tail, associative, &Limits::default(), 0, &mut Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(items: &[Option<&str>]) -> Value {
        Value::Sequence(
            items
                .iter()
                .map(|s| match s {
                    Some(s) => Slot::text(*s),
                    None => Slot::Absent,
                })
                .collect(),
        )
    }

    #[test]
    fn test_array_body_wrappers() {
        assert_eq!(array_body(r#"'([0]="a")'"#), Some(r#"[0]="a""#));
        assert_eq!(array_body(r#"([0]="a")"#), Some(r#"[0]="a""#));
        assert_eq!(array_body(r#"  ( [0]="a" )  "#), Some(r#"[0]="a""#));
        assert_eq!(array_body("()"), Some(""));
        assert_eq!(array_body("'()'"), Some(""));
        assert_eq!(array_body("\"x\""), None);
        assert_eq!(array_body("([0]=a"), None);
        assert_eq!(array_body("("), None);
        assert_eq!(array_body(""), None);
    }

    #[test]
    fn test_tokenize_word_forms() {
        let items = tokenize(r#"[0]="a b" [1]='c d' [2]=bare [3]=$'e\'f g' [4]="q\"r""#);
        let values: Vec<&str> = items
            .iter()
            .map(|item| match item {
                Item::Pair(p) => p.value,
                Item::Malformed(t) => panic!("unexpected malformed {}", t),
            })
            .collect();
        assert_eq!(
            values,
            vec![r#""a b""#, "'c d'", "bare", r"$'e\'f g'", r#""q\"r""#]
        );
    }

    #[test]
    fn test_tokenize_keys_taken_literally() {
        let items = tokenize(r#"["a b"]="1" [x=y]="2""#);
        assert_eq!(
            items,
            vec![
                Item::Pair(RawPair {
                    key: "\"a b\"",
                    value: "\"1\""
                }),
                Item::Pair(RawPair {
                    key: "x=y",
                    value: "\"2\""
                }),
            ]
        );
    }

    #[test]
    fn test_tokenize_malformed_pairs_are_isolated() {
        let items = tokenize(r#"junk [0]"a" [1]="b" [2="c""#);
        assert_eq!(items.len(), 4);
        assert_eq!(items[0], Item::Malformed("junk"));
        assert_eq!(items[1], Item::Malformed(r#"[0]"a""#));
        assert_eq!(
            items[2],
            Item::Pair(RawPair {
                key: "1",
                value: "\"b\""
            })
        );
        assert_eq!(items[3], Item::Malformed(r#"[2="c""#));
    }

    #[test]
    fn test_tokenize_quoted_value_runs_to_next_quote() {
        let items = tokenize(r#"[0]="never closed [1]="x""#);
        assert_eq!(items.len(), 2);
        assert_eq!(
            items[0],
            Item::Pair(RawPair {
                key: "0",
                value: r#""never closed [1]=""#
            })
        );
        assert_eq!(items[1], Item::Malformed("x\""));
    }

    #[test]
    fn test_tokenize_unterminated_value() {
        let items = tokenize(r#"[0]="abc [1]=def"#);
        assert_eq!(
            items,
            vec![Item::Pair(RawPair {
                key: "0",
                value: r#""abc [1]=def"#
            })]
        );
    }

    #[test]
    fn test_leading_index() {
        assert_eq!(leading_index("7"), Some(7));
        assert_eq!(leading_index("12abc"), Some(12));
        assert_eq!(leading_index("abc"), Some(0));
        assert_eq!(leading_index("-3"), Some(0));
        assert_eq!(leading_index(""), Some(0));
        assert_eq!(leading_index(" 4 "), Some(4));
        assert_eq!(leading_index("999999999999999999999999"), None);
    }

    #[test]
    fn test_indexed_array() {
        assert_eq!(
            decode_array(r#"'([0]="a" [1]="b")'"#, false),
            seq(&[Some("a"), Some("b")])
        );
    }

    #[test]
    fn test_sparse_array() {
        assert_eq!(
            decode_array(r#"'([5]="y" [2]="x")'"#, false),
            seq(&[None, None, Some("x"), None, None, Some("y")])
        );
    }

    #[test]
    fn test_index_overwrite() {
        assert_eq!(
            decode_array(r#"([1]="a" [0]="b" [1]="c")"#, false),
            seq(&[Some("b"), Some("c")])
        );
    }

    #[test]
    fn test_empty_string_element_is_not_absent() {
        assert_eq!(
            decode_array(r#"([1]="")"#, false),
            seq(&[None, Some("")])
        );
    }

    #[test]
    fn test_non_numeric_index_is_zero() {
        assert_eq!(
            decode_array(r#"([foo]="a" [-2]="b")"#, false),
            seq(&[Some("b")])
        );
    }

    #[test]
    fn test_associative_array() {
        let value = decode_array(r#"'([k]="v" [x]="y" [k]="w" ["sp ace"]="z")'"#, true);
        let map = value.as_mapping().unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map["k"], "w");
        assert_eq!(map["x"], "y");
        assert_eq!(map["sp ace"], "z");
    }

    #[test]
    fn test_strip_key_quotes() {
        assert_eq!(strip_key_quotes("'k'"), "k");
        assert_eq!(strip_key_quotes("\"a b\""), "a b");
        assert_eq!(strip_key_quotes("'\"x\"'"), "\"x\"");
        assert_eq!(strip_key_quotes("'mixed\""), "'mixed\"");
        assert_eq!(strip_key_quotes("'"), "'");
        assert_eq!(strip_key_quotes("plain"), "plain");
        assert_eq!(strip_key_quotes(" 'k' "), " 'k' ");
    }

    #[test]
    fn test_key_quotes_stripped_before_decoding() {
        let value = decode_array(r#"(['"x"']="1" ["\"q\""]="2" ['k']="3")"#, true);
        let map = value.as_mapping().unwrap();
        assert_eq!(map.len(), 3);
        assert_eq!(map["x"], "1");
        assert_eq!(map[r#"\"q\""#], "2");
        assert_eq!(map["k"], "3");
    }

    #[test]
    fn test_quoted_index_keys() {
        assert_eq!(
            decode_array(r#"(['1']="a" ["'3'"]="b")"#, false),
            seq(&[None, Some("a"), None, Some("b")])
        );
    }

    #[test]
    fn test_element_escapes_decoded() {
        assert_eq!(
            decode_array(r#"([0]=$'a\nb' [1]="c\"d" [2]='e\nf')"#, false),
            seq(&[Some("a\nb"), Some("c\"d"), Some(r"e\nf")])
        );
    }

    #[test]
    fn test_missing_parens_yield_empty() {
        assert_eq!(decode_array("\"oops\"", false), Value::Sequence(Vec::new()));
        assert_eq!(decode_array("", true), Value::Mapping(BTreeMap::new()));
    }

    #[test]
    fn test_index_limit() {
        let limits = Limits { max_array_index: 3 };
        let mut report = Vec::new();
        let value = decode_composite(r#"([1]="a" [4000000000]="b")"#, false, &limits, 9, &mut report);
        assert_eq!(value, seq(&[None, Some("a")]));
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].line, 9);
        assert_eq!(report[0].reason, SkipReason::IndexOutOfRange);
    }

    #[test]
    fn test_malformed_pair_reported() {
        let mut report = Vec::new();
        let value = decode_composite(
            r#"([0]="a" [1]x [2]="c")"#,
            false,
            &Limits::default(),
            2,
            &mut report,
        );
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].reason, SkipReason::MalformedPair);
        assert_eq!(value, seq(&[Some("a"), None, Some("c")]));
    }
}
