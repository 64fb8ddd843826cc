//! Canonical currency resolution.

use cfx_model::currency::normalize_currency_code;
use serde_json::Value;

/// Outcome of resolving a raw `currencies` value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrencyResolution {
    /// The canonical code, if any candidate was valid.
    pub code: Option<String>,
    /// Number of distinct valid candidates.
    pub candidates: usize,
    /// Candidates that were not three-letter codes.
    pub rejected: Vec<String>,
}

/// Resolve the canonical currency from a raw `currencies` value.
///
/// Accepted shapes:
/// - object: its keys are the codes (`{"EUR": {"name": "Euro"}}`)
/// - array: strings, or objects with a `code` field
/// - string: one or more codes separated by commas or whitespace
///
/// Candidates are trimmed and uppercased; anything that is not exactly three
/// ASCII letters is ignored. With several valid candidates the
/// lexicographically smallest is chosen, so the result never depends on the
/// order the source listed them in.
pub fn resolve_currency(raw: &Value) -> CurrencyResolution {
    let mut candidates: Vec<String> = Vec::new();
    let mut rejected = Vec::new();
    let mut consider = |text: &str| {
        if text.trim().is_empty() {
            return;
        }
        match normalize_currency_code(text) {
            Some(code) => candidates.push(code),
            None => rejected.push(text.trim().to_string()),
        }
    };

    match raw {
        Value::Object(map) => {
            for key in map.keys() {
                consider(key);
            }
        }
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::String(text) => consider(text),
                    Value::Object(entry) => {
                        if let Some(Value::String(code)) = entry.get("code") {
                            consider(code);
                        }
                    }
                    _ => {}
                }
            }
        }
        Value::String(text) => {
            for part in text.split(|c: char| c == ',' || c.is_whitespace()) {
                consider(part);
            }
        }
        _ => {}
    }

    candidates.sort();
    candidates.dedup();
    CurrencyResolution {
        code: candidates.first().cloned(),
        candidates: candidates.len(),
        rejected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_keys_are_candidates() {
        let resolution = resolve_currency(&json!({"USD": {}, "EUR": {"name": "Euro"}}));
        assert_eq!(resolution.code.as_deref(), Some("EUR"));
        assert_eq!(resolution.candidates, 2);
    }

    #[test]
    fn array_and_string_shapes() {
        assert_eq!(
            resolve_currency(&json!([{"code": "chf"}, "eur"])).code.as_deref(),
            Some("CHF")
        );
        assert_eq!(
            resolve_currency(&json!("usd, ecs")).code.as_deref(),
            Some("ECS")
        );
    }

    #[test]
    fn malformed_candidates_are_ignored() {
        let resolution = resolve_currency(&json!({"US$": {}, "EURO": {}, "brl": {}}));
        assert_eq!(resolution.code.as_deref(), Some("BRL"));
        assert_eq!(resolution.candidates, 1);
        let mut rejected = resolution.rejected;
        rejected.sort();
        assert_eq!(rejected, vec!["EURO", "US$"]);
    }

    #[test]
    fn empty_or_missing_is_none() {
        assert_eq!(resolve_currency(&json!({})).code, None);
        assert_eq!(resolve_currency(&Value::Null).code, None);
        assert_eq!(resolve_currency(&json!(42)).candidates, 0);
    }
}
