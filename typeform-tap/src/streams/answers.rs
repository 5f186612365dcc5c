//! Answers: one row per answer in each response submission of a form.
//!
//! Incremental on `submitted_at`. Requests ask the API for ascending order and
//! a `since` lower bound so the bookmark can only move forward.

use chrono::{DateTime, SecondsFormat, Utc};
use futures::Stream;
use serde::Deserialize;
use serde_json::Value;
use typeform_core::models::answer::ANSWER_FIELDS;
use typeform_core::models::{AnswerRow, ResponsesPage, Submission};
use typeform_core::{ApiSource, Context, TapError};

use super::{engine, Pagination, StreamDefinition};

/// Typeform's maximum for the responses endpoint.
pub const PAGE_SIZE: u32 = 1000;

pub static ANSWERS: StreamDefinition = StreamDefinition {
    name: "answers",
    path: "/forms/{form_id}/responses",
    schema: ANSWER_FIELDS,
    primary_keys: &["form_id", "question_id", "response_id"],
    replication_key: Some("submitted_at"),
    pagination: Pagination::PageCount,
};

/// Query parameters shared by every page of one form's responses.
pub fn url_params(
    replication_key: Option<&str>,
    since: Option<DateTime<Utc>>,
) -> Vec<(String, String)> {
    let mut params = vec![("page_size".to_string(), PAGE_SIZE.to_string())];

    if let Some(key) = replication_key {
        params.push(("sort".to_string(), format!("{},asc", key)));
        if let Some(since) = since {
            params.push((
                "since".to_string(),
                since.to_rfc3339_opts(SecondsFormat::Secs, true),
            ));
        }
    }

    params
}

/// Rows on one responses page, before `form_id` is stamped.
pub fn parse_page(body: &Value) -> Result<Vec<AnswerRow>, TapError> {
    let page = ResponsesPage::deserialize(body).map_err(|source| TapError::Malformed {
        stream: ANSWERS.name,
        source,
    })?;

    Ok(page
        .items
        .unwrap_or_default()
        .into_iter()
        .flat_map(Submission::into_rows)
        .collect())
}

/// The payload never carries the form id at answer level; take it from context.
pub fn post_process(mut row: AnswerRow, context: &Context) -> Result<AnswerRow, TapError> {
    row.form_id = context.require("form_id")?.to_string();
    Ok(row)
}

/// Answer rows for the form in `context`, starting after `since` when given.
pub fn records<'a>(
    source: &'a dyn ApiSource,
    context: &'a Context,
    since: Option<DateTime<Utc>>,
) -> Result<impl Stream<Item = Result<AnswerRow, TapError>> + 'a, TapError> {
    let path = context.render(ANSWERS.path)?;
    let params = url_params(ANSWERS.replication_key, since);
    let pages = engine::pages(source, &ANSWERS, path, params);

    Ok(engine::rows(pages, move |body| {
        parse_page(body)?
            .into_iter()
            .map(|row| post_process(row, context))
            .collect()
    }))
}
