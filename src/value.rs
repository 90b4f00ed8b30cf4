//! Values produced while evaluating a rule against a record.

/// A value that can be compared in rule expressions.
///
/// Strings borrow from either the rule or the record being evaluated, so
/// evaluating a rule does not allocate.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// A string value.
    Str(&'a str),
    /// A numeric value (integer or float).
    Number(f64),
    /// A boolean value.
    Bool(bool),
    /// Several values from one column (e.g. `ALT` = `G,T`).
    Array(Vec<Value<'a>>),
    /// The `.` marker, or an absent INFO key.
    Missing,
}

impl<'a> Value<'a> {
    /// Split a column value on `sep`, producing an array only when there is
    /// more than one element.
    pub fn split(raw: &'a str, sep: char) -> Self {
        let mut parts = raw.split(sep).map(Value::Str).collect::<Vec<_>>();
        if parts.len() == 1 {
            parts.remove(0)
        } else {
            Value::Array(parts)
        }
    }

    /// Returns true if this value is missing.
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Truthiness used by `&&`, `||` and `!`, and for the rule's final verdict.
    pub fn truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Missing => false,
            Value::Str(s) => !s.is_empty(),
            Value::Number(n) => *n != 0.0,
            Value::Array(arr) => !arr.is_empty(),
        }
    }

    /// Attempts to convert to a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Str(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Returns the type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
            Value::Array(_) => "array",
            Value::Missing => "missing",
        }
    }
}
