//! Amount normalisation for K-1 values.
//!
//! Converts the many ways an amount shows up on a K-1 or in a hand-labelled
//! spreadsheet ("$1,234", "(300)", "737.00", "N/A", "\"42\"") into a single
//! signed integer.

use serde_json::Value;

/// Literal cell values that mean "no amount".
const EMPTY_MARKERS: &[&str] = &["", "N/A", "n/a", "-", "0"];

/// Normalise a JSON value into an integer amount.
///
/// Integers pass through unchanged and booleans count as 1/0. Null, empty
/// strings, empty arrays/objects and zero are 0. Everything else is rendered
/// to text and handed to [`normalize_str`].
pub fn normalize(raw: &Value) -> i64 {
    match raw {
        Value::Null => 0,
        Value::Bool(b) => i64::from(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i
            } else if let Some(u) = n.as_u64() {
                i64::try_from(u).unwrap_or(i64::MAX)
            } else {
                match n.as_f64() {
                    Some(f) if f != 0.0 => normalize_str(&n.to_string()),
                    _ => 0,
                }
            }
        }
        Value::String(s) => normalize_str(s),
        Value::Array(items) if items.is_empty() => 0,
        Value::Object(map) if map.is_empty() => 0,
        other => normalize_str(&other.to_string()),
    }
}

/// Normalise a textual amount into an integer.
///
/// # Algorithm
///
/// 1. Trim; empty markers (`""`, `N/A`, `n/a`, `-`, `0`) are 0
/// 2. Strip one layer of surrounding double quotes
/// 3. Drop thousands separators, `$` and spaces
/// 4. `(x)` marks negative; a leading `-` also marks negative. The mark is a
///    flag, so `(-100)` is still -100
/// 5. Parse as a number, rounding halves to even; apply the sign
/// 6. Otherwise take the first run of digits as a positive integer, else 0
pub fn normalize_str(raw: &str) -> i64 {
    let text = raw.trim();
    if EMPTY_MARKERS.contains(&text) {
        return 0;
    }

    let text = if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        &text[1..text.len() - 1]
    } else {
        text
    };

    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, ',' | '$' | ' '))
        .collect();

    let mut body = cleaned.as_str();
    let mut negative = false;
    if body.len() >= 2 && body.starts_with('(') && body.ends_with(')') {
        negative = true;
        body = &body[1..body.len() - 1];
    }
    if let Some(rest) = body.strip_prefix('-') {
        negative = true;
        body = rest;
    }

    if let Some(magnitude) = parse_amount(body) {
        let signed = if negative { -magnitude } else { magnitude };
        return signed.clamp(i64::MIN as i128, i64::MAX as i128) as i64;
    }

    first_digit_run(body)
}

/// Exact integer parse first (keeps full i64 precision), then decimal.
fn parse_amount(body: &str) -> Option<i128> {
    let body = without_digit_separators(body)?;
    let body = body.as_str();
    if let Ok(whole) = body.parse::<u64>() {
        return Some(i128::from(whole));
    }
    let value: f64 = body.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    Some(value.round_ties_even() as i128)
}

/// Drops `_` separators sitting between two digits ("1_000"). Any other
/// underscore makes the amount unparseable.
fn without_digit_separators(body: &str) -> Option<String> {
    let chars: Vec<char> = body.chars().collect();
    let mut out = String::with_capacity(body.len());
    for (i, &c) in chars.iter().enumerate() {
        if c != '_' {
            out.push(c);
            continue;
        }
        let before = i.checked_sub(1).and_then(|j| chars.get(j));
        let after = chars.get(i + 1);
        if !(before.is_some_and(char::is_ascii_digit) && after.is_some_and(char::is_ascii_digit)) {
            return None;
        }
    }
    Some(out)
}

fn first_digit_run(text: &str) -> i64 {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    if digits.is_empty() {
        return 0;
    }
    // Saturate on overflow.
    digits.parse().unwrap_or(i64::MAX)
}
