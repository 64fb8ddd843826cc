//! ISO 4217-style currency code handling.

/// The euro, used as the reference currency for derived metrics.
pub const EUR: &str = "EUR";

/// Returns true if `code` is exactly three uppercase ASCII letters.
pub fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase())
}

/// Trim and uppercase a candidate code, keeping it only when it has the
/// three-letter shape.
///
/// # Examples
///
/// ```
/// use cfx_model::currency::normalize_currency_code;
///
/// assert_eq!(normalize_currency_code(" brl "), Some("BRL".to_string()));
/// assert_eq!(normalize_currency_code("US$"), None);
/// assert_eq!(normalize_currency_code(""), None);
/// ```
pub fn normalize_currency_code(raw: &str) -> Option<String> {
    let candidate = raw.trim().to_ascii_uppercase();
    is_currency_code(&candidate).then_some(candidate)
}
