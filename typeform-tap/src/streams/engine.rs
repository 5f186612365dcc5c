//! Generic paging engine.
//!
//! `INIT → (REQUEST → PARSE → EMIT)* → DONE`: a page is requested, parsed into
//! rows, and the rows are yielded before the next request is issued.

use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use serde_json::Value;
use typeform_core::{ApiSource, TapError};

use super::{Pagination, StreamDefinition};

/// Token for the page after `previous` (`None` = the first page).
///
/// Stops only once the reported `page_count` is below the token just used, so
/// a run costs `page_count + 1` requests; the trailing page is empty.
pub fn next_page_token(page_count: u64, previous: Option<u64>) -> Option<u64> {
    let previous = previous.unwrap_or(1);
    if page_count < previous {
        return None;
    }
    Some(previous + 1)
}

fn page_count(definition: &StreamDefinition, body: &Value) -> Result<u64, TapError> {
    body.get("page_count")
        .and_then(Value::as_u64)
        .ok_or(TapError::MissingField {
            stream: definition.name,
            field: "page_count",
        })
}

enum Cursor {
    Start,
    Page(u64),
    Done,
}

/// Lazily fetch every page of `path`. `params` go on every request; `page` is
/// added once a token exists.
pub fn pages<'a>(
    source: &'a dyn ApiSource,
    definition: &'a StreamDefinition,
    path: String,
    params: Vec<(String, String)>,
) -> impl Stream<Item = Result<Value, TapError>> + 'a {
    stream::try_unfold(Cursor::Start, move |cursor| {
        let path = path.clone();
        let mut query = params.clone();

        async move {
            let token = match cursor {
                Cursor::Done => return Ok::<_, TapError>(None),
                Cursor::Start => None,
                Cursor::Page(token) => Some(token),
            };

            if let Some(token) = token {
                query.push(("page".to_string(), token.to_string()));
            }

            tracing::debug!(stream = definition.name, path = %path, page = ?token, "Requesting page");
            let body = source.get_json(&path, &query).await?;

            let next = match definition.pagination {
                Pagination::Single => Cursor::Done,
                Pagination::PageCount => {
                    match next_page_token(page_count(definition, &body)?, token) {
                        Some(next) => Cursor::Page(next),
                        None => Cursor::Done,
                    }
                }
            };

            Ok::<_, TapError>(Some((body, next)))
        }
    })
}

/// Parse each page into rows and yield them one by one.
pub fn rows<'a, T, P, F>(pages: P, parse: F) -> impl Stream<Item = Result<T, TapError>> + 'a
where
    T: 'a,
    P: Stream<Item = Result<Value, TapError>> + 'a,
    F: Fn(&Value) -> Result<Vec<T>, TapError> + 'a,
{
    pages
        .map(move |page| page.and_then(|body| parse(&body)))
        .map_ok(|parsed| stream::iter(parsed.into_iter().map(Ok::<T, TapError>)))
        .try_flatten()
}
