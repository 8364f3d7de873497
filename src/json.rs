use std::collections::BTreeMap;
use std::fmt::Write;

use crate::error::Skipped;
use crate::value::{Slot, Value, Variables};

/// JSON formatting style.
#[derive(Clone, Copy)]
pub enum JsonStyle {
    /// Compact: no whitespace between tokens.
    Compact,
    /// Pretty: 2-space indented, one entry per line.
    Pretty,
}

struct JsonWriter {
    buf: String,
    style: JsonStyle,
    depth: usize,
}

impl JsonWriter {
    fn new(style: JsonStyle) -> Self {
        JsonWriter {
            buf: String::new(),
            style,
            depth: 0,
        }
    }

    fn is_pretty(&self) -> bool {
        matches!(self.style, JsonStyle::Pretty)
    }

    fn newline(&mut self) {
        if self.is_pretty() {
            self.buf.push('\n');
            for _ in 0..self.depth {
                self.buf.push_str("  ");
            }
        }
    }

    fn space(&mut self) {
        if self.is_pretty() {
            self.buf.push(' ');
        }
    }

    fn write_variables(&mut self, vars: &Variables) {
        self.buf.push('{');
        self.depth += 1;

        let mut first = true;
        for (name, value) in vars {
            self.entry_sep(&mut first);
            self.write_key(name);
            self.write_value(value);
        }

        self.depth -= 1;
        if !vars.is_empty() {
            self.newline();
        }
        self.buf.push('}');
    }

    fn write_value(&mut self, value: &Value) {
        match value {
            Value::Text(s) => self.write_string_value(s),
            Value::Integer(n) => {
                let _ = write!(&mut self.buf, "{}", n);
            }
            Value::Sequence(items) => self.write_sequence(items),
            Value::Mapping(map) => self.write_mapping(map),
        }
    }

    fn write_sequence(&mut self, items: &[Slot]) {
        self.buf.push('[');
        self.depth += 1;

        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.buf.push(',');
            }
            self.newline();
            match item {
                Slot::Absent => self.buf.push_str("null"),
                Slot::Text(s) => self.write_string_value(s),
            }
        }

        self.depth -= 1;
        if !items.is_empty() {
            self.newline();
        }
        self.buf.push(']');
    }

    fn write_mapping(&mut self, map: &BTreeMap<String, String>) {
        self.buf.push('{');
        self.depth += 1;

        let mut first = true;
        for (key, value) in map {
            self.entry_sep(&mut first);
            self.write_key(key);
            self.write_string_value(value);
        }

        self.depth -= 1;
        if !map.is_empty() {
            self.newline();
        }
        self.buf.push('}');
    }

    fn entry_sep(&mut self, first: &mut bool) {
        if *first {
            *first = false;
        } else {
            self.buf.push(',');
        }
        self.newline();
    }

    fn write_key(&mut self, key: &str) {
        self.write_string_value(key);
        self.buf.push(':');
        self.space();
    }

    fn write_string_value(&mut self, s: &str) {
        self.buf.push('"');
        for ch in s.chars() {
            match ch {
                '"' => self.buf.push_str("\\\""),
                '\\' => self.buf.push_str("\\\\"),
                '\n' => self.buf.push_str("\\n"),
                '\r' => self.buf.push_str("\\r"),
                '\t' => self.buf.push_str("\\t"),
                '\u{0008}' => self.buf.push_str("\\b"),
                '\u{000C}' => self.buf.push_str("\\f"),
                c if c < '\u{0020}' || c == '\u{007F}' => {
                    let _ = write!(&mut self.buf, "\\u{:04x}", c as u32);
                }
                c => self.buf.push(c),
            }
        }
        self.buf.push('"');
    }
}

/// Serialize parsed variables to a compact JSON object.
pub fn to_json(vars: &Variables) -> String {
    let mut w = JsonWriter::new(JsonStyle::Compact);
    w.write_variables(vars);
    w.buf
}

/// Serialize parsed variables to a pretty-printed JSON object (2-space indent).
pub fn to_json_pretty(vars: &Variables) -> String {
    let mut w = JsonWriter::new(JsonStyle::Pretty);
    w.write_variables(vars);
    w.buf
}

/// Serialize a single value.
pub fn value_to_json(value: &Value) -> String {
    let mut w = JsonWriter::new(JsonStyle::Compact);
    w.write_value(value);
    w.buf
}

/// Serialize skipped-line diagnostics to a JSON array string.
pub fn skipped_to_json(skipped: &[Skipped]) -> String {
    let mut w = JsonWriter::new(JsonStyle::Compact);
    w.buf.push('[');
    for (i, entry) in skipped.iter().enumerate() {
        if i > 0 {
            w.buf.push(',');
        }
        w.buf.push('{');
        w.write_key("line");
        let _ = write!(&mut w.buf, "{}", entry.line);
        w.buf.push(',');
        w.write_key("code");
        w.write_string_value(entry.reason.code());
        w.buf.push(',');
        w.write_key("message");
        w.write_string_value(&entry.message);
        w.buf.push('}');
    }
    w.buf.push(']');
    w.buf
}
