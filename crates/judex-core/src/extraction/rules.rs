//! Deterministic clean-up applied to model replies.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{Map, Value};

use crate::error::ExtractionError;
use crate::models::{DocumentType, FIELD_SCHEMA, Field, FieldValues, MULTI_VALUE_DELIMITER, NOT_MENTIONED};

lazy_static! {
    // ```json ... ``` around the whole reply
    static ref CODE_FENCE: Regex = Regex::new(
        r"(?s)^```[A-Za-z]*\s*\n?(.*?)\n?\s*```$"
    ).unwrap();

    // 2023年5月6日 / 2023-5-6 / 2023/05/06 / 2023.5.6
    static ref LOOSE_DATE: Regex = Regex::new(
        r"^(\d{4})\s*[年/.\-]\s*(\d{1,2})\s*[月/.\-]\s*(\d{1,2})\s*日?$"
    ).unwrap();
}

/// Remove surrounding whitespace and a Markdown code fence.
pub fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    match CODE_FENCE.captures(trimmed).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => trimmed,
    }
}

/// Parse a reply into a JSON object.
pub fn parse_reply(reply: &str) -> Result<Map<String, Value>, ExtractionError> {
    let body = strip_code_fence(reply);
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ExtractionError::MalformedReply(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(ExtractionError::MalformedReply(e.to_string())),
    }
}

/// Project a parsed reply onto the schema.
///
/// Unknown keys are dropped; missing, null and blank values become
/// [`NOT_MENTIONED`].
pub fn complete_fields(reply: &Map<String, Value>) -> FieldValues {
    let values = std::array::from_fn(|i| {
        reply
            .get(FIELD_SCHEMA[i])
            .map(stringify)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| NOT_MENTIONED.to_string())
    });
    FieldValues::from_array(values)
}

/// Normalize the judgment date and the document type in place.
///
/// Fields holding [`NOT_MENTIONED`] are left untouched.
pub fn normalize(fields: &mut FieldValues) {
    if let Some(date) = normalize_date(fields.get(Field::JudgmentDate)) {
        fields.set(Field::JudgmentDate, date);
    }
    let doc_type = fields.get(Field::DocumentType);
    if doc_type != NOT_MENTIONED {
        let doc_type = DocumentType::classify(doc_type);
        fields.set(Field::DocumentType, doc_type.label());
    }
}

/// Rewrite a recognizable date as `YYYY-MM-DD`.
pub fn normalize_date(value: &str) -> Option<String> {
    let caps = LOOSE_DATE.captures(value.trim())?;
    let year: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    chrono::NaiveDate::from_ymd_opt(year as i32, month, day)?;
    Some(format!("{:04}-{:02}-{:02}", year, month, day))
}

fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(stringify)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(MULTI_VALUE_DELIMITER),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
