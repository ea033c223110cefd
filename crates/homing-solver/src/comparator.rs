//! Comparison operators used by threshold-style constraints.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use homing_core::value_as_f64;

/// `candidate_value <op> threshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparator {
    #[serde(alias = ">=")]
    Gte,
    #[serde(alias = "<=")]
    Lte,
    #[serde(alias = ">")]
    Gt,
    #[serde(alias = "<")]
    Lt,
    #[default]
    #[serde(alias = "=", alias = "==")]
    Eq,
}

impl Comparator {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "gte" | ">=" => Some(Self::Gte),
            "lte" | "<=" => Some(Self::Lte),
            "gt" | ">" => Some(Self::Gt),
            "lt" | "<" => Some(Self::Lt),
            "eq" | "=" | "==" => Some(Self::Eq),
            _ => None,
        }
    }

    /// Numeric comparison. NaN on either side never satisfies.
    pub fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::Gte => value >= threshold,
            Self::Lte => value <= threshold,
            Self::Gt => value > threshold,
            Self::Lt => value < threshold,
            Self::Eq => value == threshold,
        }
    }

    /// Compare two JSON values: numerically when both read as numbers,
    /// otherwise only `Eq` can hold, on the textual form.
    pub fn holds_value(self, value: &Value, threshold: &Value) -> bool {
        match (value_as_f64(value), value_as_f64(threshold)) {
            (Some(v), Some(t)) => self.holds(v, t),
            _ => self == Self::Eq && loose_text(value) == loose_text(threshold),
        }
    }
}

impl std::fmt::Display for Comparator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Gte => ">=",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Eq => "==",
        };
        write!(f, "{s}")
    }
}

/// Equality that treats `8`, `8.0` and `"8"` alike.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (value_as_f64(a), value_as_f64(b)) {
        (Some(x), Some(y)) => x == y,
        _ => loose_text(a) == loose_text(b),
    }
}

fn loose_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_symbols_and_names() {
        assert_eq!(Comparator::parse(">="), Some(Comparator::Gte));
        assert_eq!(Comparator::parse("LTE"), Some(Comparator::Lte));
        assert_eq!(Comparator::parse("=="), Some(Comparator::Eq));
        assert_eq!(Comparator::parse("approx"), None);
    }

    #[test]
    fn deserializes_aliases() {
        let c: Comparator = serde_json::from_value(json!("<")).unwrap();
        assert_eq!(c, Comparator::Lt);
        let c: Comparator = serde_json::from_value(json!("gte")).unwrap();
        assert_eq!(c, Comparator::Gte);
    }

    #[test]
    fn boundaries() {
        assert!(Comparator::Lte.holds(10.0, 10.0));
        assert!(!Comparator::Lt.holds(10.0, 10.0));
        assert!(Comparator::Gte.holds(10.0, 10.0));
        assert!(!Comparator::Gt.holds(10.0, 10.0));
        assert!(!Comparator::Eq.holds(f64::NAN, f64::NAN));
    }

    #[test]
    fn value_comparison() {
        assert!(Comparator::Gte.holds_value(&json!("16"), &json!(8)));
        assert!(Comparator::Eq.holds_value(&json!("x86_64"), &json!("x86_64")));
        assert!(!Comparator::Gt.holds_value(&json!("x86_64"), &json!("aarch64")));
        assert!(loose_eq(&json!(8), &json!("8.0")));
    }
}
