//! Emptiness predicate used when deciding whether a stored identity value
//! counts as present.

use serde_json::Value;

/// Decides whether a decoded value is "empty".
pub trait EmptyCheck: Send + Sync {
    fn is_empty(&self, value: &Value) -> bool;
}

/// Default predicate.
///
/// Empty: `null`, an empty or whitespace-only string, an empty array, an
/// empty object. Numbers and booleans are never empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct JudgeEmpty;

impl EmptyCheck for JudgeEmpty {
    fn is_empty(&self, value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            Value::Array(a) => a.is_empty(),
            Value::Object(o) => o.is_empty(),
            Value::Bool(_) | Value::Number(_) => false,
        }
    }
}

impl<F> EmptyCheck for F
where
    F: Fn(&Value) -> bool + Send + Sync,
{
    fn is_empty(&self, value: &Value) -> bool {
        self(value)
    }
}
