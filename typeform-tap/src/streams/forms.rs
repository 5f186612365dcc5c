use std::collections::BTreeSet;

use futures::Stream;
use serde::Deserialize;
use serde_json::Value;
use typeform_core::models::form::FORM_FIELDS;
use typeform_core::models::{FormRecord, FormsPage};
use typeform_core::{ApiSource, Context, TapError};

use super::{engine, Pagination, StreamDefinition};

pub static FORMS: StreamDefinition = StreamDefinition {
    name: "forms",
    path: "/forms",
    schema: FORM_FIELDS,
    primary_keys: &["id"],
    replication_key: None,
    pagination: Pagination::PageCount,
};

/// Records on one `/forms` page, keeping only ids in `filter` when one is set.
pub fn parse_page(
    body: &Value,
    filter: Option<&BTreeSet<String>>,
) -> Result<Vec<FormRecord>, TapError> {
    let page = FormsPage::deserialize(body).map_err(|source| TapError::Malformed {
        stream: FORMS.name,
        source,
    })?;

    Ok(page
        .items
        .unwrap_or_default()
        .into_iter()
        .filter(|form| filter.map_or(true, |ids| ids.contains(&form.id)))
        .map(FormRecord::from)
        .collect())
}

/// Context handed to the questions and answers streams.
pub fn child_context(record: &FormRecord) -> Context {
    Context::new().with("form_id", record.id.clone())
}

pub fn records<'a>(
    source: &'a dyn ApiSource,
    filter: Option<&'a BTreeSet<String>>,
) -> impl Stream<Item = Result<FormRecord, TapError>> + 'a {
    let pages = engine::pages(source, &FORMS, FORMS.path.to_string(), Vec::new());
    engine::rows(pages, move |body| parse_page(body, filter))
}
