//! Casting model JSON onto the field whitelist.

use schedk1_core::{FieldKind, FieldMap, FieldValue, RecordKind, normalize_str};
use serde_json::{Map, Value};

use crate::error::ContentError;
use crate::response::json_type;

/// Cast one JSON value to a field kind. A missing value is the default.
pub fn coerce_value(
    name: &str,
    kind: FieldKind,
    value: Option<&Value>,
) -> Result<FieldValue, ContentError> {
    let Some(value) = value else {
        return Ok(FieldValue::default_for(kind));
    };
    match kind {
        FieldKind::Integer => coerce_integer(name, value).map(FieldValue::Integer),
        FieldKind::Text => Ok(FieldValue::Text(coerce_text(value))),
    }
}

fn coerce_integer(name: &str, value: &Value) -> Result<i64, ContentError> {
    match value {
        Value::Null => Ok(0),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else if let Some(u) = n.as_u64() {
                Ok(i64::try_from(u).unwrap_or(i64::MAX))
            } else {
                // Truncates toward zero and saturates.
                Ok(n.as_f64().map_or(0, |f| f as i64))
            }
        }
        Value::String(s) => Ok(normalize_str(s)),
        Value::Array(items) if items.is_empty() => Ok(0),
        Value::Object(map) if map.is_empty() => Ok(0),
        other => Err(ContentError::InvalidValue {
            field: name.to_string(),
            reason: format!("cannot read {} as an integer", json_type(other)),
        }),
    }
}

fn coerce_text(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::Bool(true) => "True".to_string(),
        Value::Number(n) if n.as_f64() == Some(0.0) => String::new(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) if items.is_empty() => String::new(),
        Value::Object(map) if map.is_empty() => String::new(),
        other => other.to_string(),
    }
}

/// Build the output mapping for one call.
///
/// The result holds exactly `requested`, each cast to its declared kind.
/// In complete mode with a `target`, every field of that record must be
/// present in `payload` and castable, or the whole payload is rejected.
pub fn coerce_fields<S: AsRef<str>>(
    payload: &Map<String, Value>,
    requested: &[S],
    target: Option<RecordKind>,
    partial: bool,
) -> Result<FieldMap, ContentError> {
    if let (false, Some(kind)) = (partial, target) {
        for spec in kind.fields() {
            let value = payload
                .get(spec.name)
                .ok_or_else(|| ContentError::MissingField(spec.name.to_string()))?;
            coerce_value(spec.name, spec.kind, Some(value))?;
        }
    }

    requested
        .iter()
        .map(|name| {
            let name = name.as_ref();
            let value = coerce_value(name, FieldKind::of(name), payload.get(name))?;
            Ok((name.to_string(), value))
        })
        .collect()
}
