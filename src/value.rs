use std::collections::BTreeMap;

/// Result of one parse: variable name to decoded value.
pub type Variables = BTreeMap<String, Value>;

/// One position of an indexed array.
///
/// `Absent` marks an index the shell never assigned; it is not the same
/// thing as an element holding the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Absent,
    Text(String),
}

/// A decoded shell variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    /// Only produced for `declare -i` variables whose value is a base-10 integer.
    Integer(i64),
    /// `declare -a`: dense from 0 to the highest assigned index.
    Sequence(Vec<Slot>),
    /// `declare -A`
    Mapping(BTreeMap<String, String>),
}

impl Value {
    /// Short lowercase name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Text(_) => "text",
            Value::Integer(_) => "integer",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Slot]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            Value::Mapping(map) => Some(map),
            _ => None,
        }
    }
}

impl Slot {
    pub fn text(s: impl Into<String>) -> Self {
        Slot::Text(s.into())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Slot::Absent)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Slot::Text(s) => Some(s),
            Slot::Absent => None,
        }
    }
}

/// Write `item` at `index`, padding any gap with `Slot::Absent`.
pub(crate) fn assign_slot(items: &mut Vec<Slot>, index: usize, item: String) {
    if index >= items.len() {
        items.resize(index + 1, Slot::Absent);
    }
    items[index] = Slot::Text(item);
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}
