use futures::Stream;
use serde::Deserialize;
use serde_json::Value;
use typeform_core::models::question::QUESTION_FIELDS;
use typeform_core::models::{FormDefinition, QuestionRecord};
use typeform_core::{ApiSource, Context, TapError};

use super::{engine, Pagination, StreamDefinition};

pub static QUESTIONS: StreamDefinition = StreamDefinition {
    name: "questions",
    path: "/forms/{form_id}",
    schema: QUESTION_FIELDS,
    primary_keys: &["id"],
    replication_key: None,
    pagination: Pagination::Single,
};

pub fn parse_page(body: &Value) -> Result<Vec<QuestionRecord>, TapError> {
    let definition = FormDefinition::deserialize(body).map_err(|source| TapError::Malformed {
        stream: QUESTIONS.name,
        source,
    })?;
    Ok(definition.into_records())
}

pub fn records<'a>(
    source: &'a dyn ApiSource,
    context: &Context,
) -> Result<impl Stream<Item = Result<QuestionRecord, TapError>> + 'a, TapError> {
    let path = context.render(QUESTIONS.path)?;
    let pages = engine::pages(source, &QUESTIONS, path, Vec::new());
    Ok(engine::rows(pages, parse_page))
}
