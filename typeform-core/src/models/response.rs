//! Response submissions from `GET /forms/{form_id}/responses`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::answer::{AnswerRow, AnswerValue};

#[derive(Debug, Deserialize)]
pub struct ResponsesPage {
    #[serde(default)]
    pub items: Option<Vec<Submission>>,
}

/// The submission envelope; never emitted itself, copied onto each answer row.
#[derive(Debug, Deserialize)]
pub struct Submission {
    pub response_id: String,
    pub submitted_at: DateTime<Utc>,
    pub landed_at: DateTime<Utc>,
    pub metadata: SubmissionMetadata,
    pub token: String,
    #[serde(default)]
    pub answers: Option<Vec<RawAnswer>>,
    #[serde(default)]
    pub hidden: Option<Map<String, Value>>,
}

/// Every key must be present; a null value is kept as `None`.
#[derive(Debug, Deserialize)]
pub struct SubmissionMetadata {
    #[serde(deserialize_with = "present")]
    pub browser: Option<String>,
    #[serde(deserialize_with = "present")]
    pub network_id: Option<String>,
    #[serde(deserialize_with = "present")]
    pub referer: Option<String>,
    #[serde(deserialize_with = "present")]
    pub user_agent: Option<String>,
}

// Without `default`, a `deserialize_with` field is required even when it is an Option.
fn present<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}

#[derive(Debug, Deserialize)]
pub struct RawAnswer {
    pub field: FieldRef,
    #[serde(rename = "type", default)]
    pub data_type: Option<String>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct FieldRef {
    pub id: String,
}

fn hidden_value(hidden: Option<&Map<String, Value>>, key: &str) -> Option<String> {
    match hidden?.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl Submission {
    /// Flatten into one row per answer. `form_id` is left empty for the
    /// caller to stamp from context.
    pub fn into_rows(self) -> Vec<AnswerRow> {
        let user_id = hidden_value(self.hidden.as_ref(), "user_id");
        let nps_scores_id = hidden_value(self.hidden.as_ref(), "nps_scores_id");

        self.answers
            .unwrap_or_default()
            .into_iter()
            .map(|mut answer| {
                let value =
                    AnswerValue::from_payload(answer.data_type.as_deref(), &mut answer.rest);
                AnswerRow {
                    form_id: String::new(),
                    question_id: answer.field.id,
                    response_id: self.response_id.clone(),
                    data_type: value.data_type().map(str::to_string),
                    answer: value.encode(),
                    submitted_at: self.submitted_at,
                    landed_at: self.landed_at,
                    browser: self.metadata.browser.clone(),
                    network_id: self.metadata.network_id.clone(),
                    referer: self.metadata.referer.clone(),
                    user_agent: self.metadata.user_agent.clone(),
                    token: self.token.clone(),
                    user_id: user_id.clone(),
                    nps_scores_id: nps_scores_id.clone(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn submission(answers: Value) -> Value {
        json!({
            "response_id": "R1",
            "submitted_at": "2023-01-01T00:00:00Z",
            "landed_at": "2022-12-31T23:58:00Z",
            "token": "tok1",
            "metadata": {
                "browser": "default",
                "network_id": "abc",
                "referer": "https://acme.typeform.com/to/F1",
                "user_agent": "Mozilla/5.0"
            },
            "answers": answers
        })
    }

    #[test]
    fn test_each_answer_becomes_a_row_with_submission_metadata() {
        let item: Submission = serde_json::from_value(submission(json!([
            {"type": "number", "number": 42, "field": {"id": "Q1", "type": "number"}},
            {"type": "text", "text": "hi", "field": {"id": "Q2", "type": "short_text"}}
        ])))
        .unwrap();

        let rows = item.into_rows();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].question_id, "Q1");
        assert_eq!(rows[0].answer, json!("42"));
        assert_eq!(rows[1].question_id, "Q2");
        assert_eq!(rows[1].answer, json!("hi"));

        for row in &rows {
            assert_eq!(row.response_id, "R1");
            assert_eq!(row.token, "tok1");
            assert_eq!(row.browser.as_deref(), Some("default"));
            assert_eq!(row.user_agent.as_deref(), Some("Mozilla/5.0"));
            assert_eq!(row.submitted_at.to_rfc3339(), "2023-01-01T00:00:00+00:00");
        }
    }

    #[test]
    fn test_hidden_fields_are_optional() {
        let item: Submission = serde_json::from_value(submission(json!([
            {"type": "boolean", "boolean": true, "field": {"id": "Q1"}}
        ])))
        .unwrap();

        let rows = item.into_rows();
        assert!(rows[0].user_id.is_none());
        assert!(rows[0].nps_scores_id.is_none());
    }

    #[test]
    fn test_hidden_fields_copied_when_present() {
        let mut raw = submission(json!([{"type": "text", "text": "x", "field": {"id": "Q1"}}]));
        raw["hidden"] = json!({"user_id": "u-7", "nps_scores_id": 31});

        let rows = serde_json::from_value::<Submission>(raw).unwrap().into_rows();
        assert_eq!(rows[0].user_id.as_deref(), Some("u-7"));
        assert_eq!(rows[0].nps_scores_id.as_deref(), Some("31"));
    }

    #[test]
    fn test_no_answers_gives_no_rows() {
        let mut raw = submission(json!([]));
        assert!(serde_json::from_value::<Submission>(raw.clone())
            .unwrap()
            .into_rows()
            .is_empty());

        raw.as_object_mut().unwrap().remove("answers");
        assert!(serde_json::from_value::<Submission>(raw)
            .unwrap()
            .into_rows()
            .is_empty());
    }

    #[test]
    fn test_missing_required_fields_fail() {
        for key in ["response_id", "submitted_at", "landed_at", "token", "metadata"] {
            let mut raw = submission(json!([]));
            raw.as_object_mut().unwrap().remove(key);
            assert!(
                serde_json::from_value::<Submission>(raw).is_err(),
                "missing {} should fail",
                key
            );
        }
    }

    #[test]
    fn test_missing_metadata_key_fails_but_null_is_kept() {
        let mut raw = submission(json!([]));
        raw["metadata"].as_object_mut().unwrap().remove("referer");
        assert!(serde_json::from_value::<Submission>(raw).is_err());

        let mut raw = submission(json!([{"type": "text", "text": "x", "field": {"id": "Q1"}}]));
        raw["metadata"]["referer"] = Value::Null;
        let rows = serde_json::from_value::<Submission>(raw).unwrap().into_rows();
        assert!(rows[0].referer.is_none());
    }

    #[test]
    fn test_answer_without_type_keeps_the_submission() {
        let item: Submission = serde_json::from_value(submission(json!([
            {"text": "orphan", "field": {"id": "Q1"}},
            {"type": "boolean", "boolean": false, "field": {"id": "Q2"}}
        ])))
        .unwrap();

        let rows = item.into_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].question_id, "Q1");
        assert!(rows[0].data_type.is_none());
        assert_eq!(rows[0].answer, Value::Null);
        assert_eq!(rows[1].data_type.as_deref(), Some("boolean"));
        assert_eq!(rows[1].answer, json!("False"));
    }
}
