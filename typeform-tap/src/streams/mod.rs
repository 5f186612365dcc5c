//! Stream definitions.
//!
//! Each stream is plain data handed to the shared paging [`engine`]; the
//! per-stream modules only add parsing and request parameters.

use typeform_core::SchemaField;

pub mod answers;
pub mod engine;
pub mod forms;
pub mod questions;

/// How a stream walks its endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pagination {
    /// Follow the payload's `page_count` with a 1-based `page` token.
    PageCount,
    /// One request per context.
    Single,
}

#[derive(Debug)]
pub struct StreamDefinition {
    pub name: &'static str,
    /// Request path; `{key}` placeholders are filled from the context.
    pub path: &'static str,
    pub schema: &'static [SchemaField],
    pub primary_keys: &'static [&'static str],
    pub replication_key: Option<&'static str>,
    pub pagination: Pagination,
}

/// Every stream, parents before children.
pub static ALL_STREAMS: [&StreamDefinition; 3] =
    [&forms::FORMS, &questions::QUESTIONS, &answers::ANSWERS];
