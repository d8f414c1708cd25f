//! Monetary value parsing and pt-BR currency formatting.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

/// Plain decimal, optionally with an exponent: `1234.56`, `-12`, `1e3`.
fn plain_number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^-?\d+(?:\.\d+)?(?:[eE][+-]?\d+)?$").expect("static regex is valid")
    })
}

/// pt-BR amount: dots group thousands, comma is the decimal separator.
fn pt_br_number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^-?(?:\d{1,3}(?:\.\d{3})+|\d+)(?:,\d+)?$").expect("static regex is valid")
    })
}

/// Parses a monetary value from a JSON field.
///
/// Accepts JSON numbers and strings. Strings may carry a currency symbol, spaces and
/// pt-BR separators (`"R$ 1.234,56"`) or a plain decimal (`"1234.56"`).
/// Anything unparseable, non-finite or negative contributes 0.
pub fn parse_valor(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => parse_valor_str(s),
        _ => 0.0,
    };
    sanitize(parsed)
}

/// Parses a textual monetary value. See [`parse_valor`].
///
/// The whole string must be one amount: text around or inside the digits
/// (`"12abc34"`, `"Lote 7"`) gives 0.
pub fn parse_valor_str(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let amount = trimmed
        .strip_prefix("R$")
        .map(str::trim_start)
        .unwrap_or(trimmed);

    let normalized = if plain_number_regex().is_match(amount) {
        amount.to_string()
    } else if pt_br_number_regex().is_match(amount) {
        amount.replace('.', "").replace(',', ".")
    } else {
        return 0.0;
    };

    sanitize(normalized.parse::<f64>().unwrap_or(0.0))
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Rounds to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Formats a value as Brazilian currency, e.g. `R$ 1.234,56`.
pub fn format_brl(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let cents = (value.abs() * 100.0).round() as u128;
    let integer = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}R$ {},{:02}", sign, grouped, fraction)
}
