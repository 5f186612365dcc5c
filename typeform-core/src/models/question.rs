use serde::{Deserialize, Serialize};

use crate::schema::SchemaField;

pub const QUESTION_FIELDS: &[SchemaField] = &[
    SchemaField::string("form_id"),
    SchemaField::string("id"),
    SchemaField::string("title"),
    SchemaField::string("type"),
];

/// Body of `GET /forms/{form_id}`.
#[derive(Debug, Deserialize)]
pub struct FormDefinition {
    pub id: String,
    #[serde(default)]
    pub fields: Option<Vec<FormField>>,
}

#[derive(Debug, Deserialize)]
pub struct FormField {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "type", default)]
    pub field_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionRecord {
    pub form_id: String,
    pub id: String,
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub question_type: Option<String>,
}

impl FormDefinition {
    /// One record per top-level field, tagged with this definition's own id.
    pub fn into_records(self) -> Vec<QuestionRecord> {
        let form_id = self.id;
        self.fields
            .unwrap_or_default()
            .into_iter()
            .map(|field| QuestionRecord {
                form_id: form_id.clone(),
                id: field.id,
                title: field.title,
                question_type: field.field_type,
            })
            .collect()
    }
}
