//! Answer payload typing and flat answer rows.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::schema::SchemaField;

pub const ANSWER_FIELDS: &[SchemaField] = &[
    SchemaField::string("form_id"),
    SchemaField::string("question_id"),
    SchemaField::string("response_id"),
    SchemaField::string("data_type"),
    SchemaField::string("answer"),
    SchemaField::date_time("submitted_at"),
    SchemaField::date_time("landed_at"),
    SchemaField::string("browser"),
    SchemaField::string("network_id"),
    SchemaField::string("referer"),
    SchemaField::string("user_agent"),
    SchemaField::string("token"),
    SchemaField::string("user_id"),
    SchemaField::string("nps_scores_id"),
];

/// An answer's value, keyed by its `type` tag.
///
/// Typeform stores the value under a key named after the type, e.g.
/// `{"type": "number", "number": 42}`.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerValue {
    Choice(Value),
    Choices(Value),
    Payment(Value),
    Number(Value),
    Boolean(Value),
    Text(Value),
    Email(Value),
    Url(Value),
    FileUrl(Value),
    Date(Value),
    PhoneNumber(Value),
    /// Any tag not listed above; passed through untouched.
    Other { data_type: String, value: Value },
    /// No `type` key at all; there is no value key to read either.
    Untyped,
}

impl AnswerValue {
    /// Pull the value for `data_type` out of the remaining answer keys.
    /// A missing key reads as null.
    pub fn from_payload(data_type: Option<&str>, payload: &mut Map<String, Value>) -> Self {
        let Some(data_type) = data_type else {
            return Self::Untyped;
        };
        let value = payload.remove(data_type).unwrap_or(Value::Null);

        match data_type {
            "choice" => Self::Choice(value),
            "choices" => Self::Choices(value),
            "payment" => Self::Payment(value),
            "number" => Self::Number(value),
            "boolean" => Self::Boolean(value),
            "text" => Self::Text(value),
            "email" => Self::Email(value),
            "url" => Self::Url(value),
            "file_url" => Self::FileUrl(value),
            "date" => Self::Date(value),
            "phone_number" => Self::PhoneNumber(value),
            other => Self::Other {
                data_type: other.to_string(),
                value,
            },
        }
    }

    pub fn data_type(&self) -> Option<&str> {
        let tag = match self {
            Self::Choice(_) => "choice",
            Self::Choices(_) => "choices",
            Self::Payment(_) => "payment",
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
            Self::Text(_) => "text",
            Self::Email(_) => "email",
            Self::Url(_) => "url",
            Self::FileUrl(_) => "file_url",
            Self::Date(_) => "date",
            Self::PhoneNumber(_) => "phone_number",
            Self::Other { data_type, .. } => data_type,
            Self::Untyped => return None,
        };
        Some(tag)
    }

    /// The `answer` column: structured kinds become JSON text, scalar kinds
    /// their string form, everything else the raw value.
    pub fn encode(self) -> Value {
        match self {
            Self::Choice(v) | Self::Choices(v) | Self::Payment(v) => Value::String(v.to_string()),
            Self::Number(v) | Self::Boolean(v) => scalar_string(v),
            Self::Text(v)
            | Self::Email(v)
            | Self::Url(v)
            | Self::FileUrl(v)
            | Self::Date(v)
            | Self::PhoneNumber(v)
            | Self::Other { value: v, .. } => v,
            Self::Untyped => Value::Null,
        }
    }
}

// Downstream tables hold `True`/`False` for booleans and `None` for a missing value.
fn scalar_string(value: Value) -> Value {
    let text = match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::String(s) => s,
        other => other.to_string(),
    };
    Value::String(text)
}

/// One emitted row per (submission, answer).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerRow {
    /// Filled from the parent context after parsing.
    pub form_id: String,
    pub question_id: String,
    pub response_id: String,
    pub data_type: Option<String>,
    pub answer: Value,
    pub submitted_at: DateTime<Utc>,
    pub landed_at: DateTime<Utc>,
    pub browser: Option<String>,
    pub network_id: Option<String>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub token: String,
    pub user_id: Option<String>,
    pub nps_scores_id: Option<String>,
}
