//! Parent → child stream context.
//!
//! A parent stream hands each child a plain key-value map. The child renders
//! its request path from it and tags its rows with it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::TapError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Context(BTreeMap<String, String>);

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Like `get`, but a missing key is an error.
    pub fn require(&self, key: &str) -> Result<&str, TapError> {
        self.get(key)
            .ok_or_else(|| TapError::MissingContext(key.to_string()))
    }

    /// Substitute every `{key}` placeholder in `template`.
    pub fn render(&self, template: &str) -> Result<String, TapError> {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            let close = rest[open..]
                .find('}')
                .map(|i| open + i)
                .ok_or_else(|| TapError::MissingContext(rest[open + 1..].to_string()))?;
            out.push_str(&rest[..open]);
            out.push_str(self.require(&rest[open + 1..close])?);
            rest = &rest[close + 1..];
        }
        out.push_str(rest);

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_placeholders() {
        let ctx = Context::new().with("form_id", "abc123");
        assert_eq!(
            ctx.render("/forms/{form_id}/responses").unwrap(),
            "/forms/abc123/responses"
        );
    }

    #[test]
    fn test_render_without_placeholders_is_identity() {
        assert_eq!(Context::new().render("/forms").unwrap(), "/forms");
    }

    #[test]
    fn test_render_missing_key_errors() {
        let err = Context::new().render("/forms/{form_id}").unwrap_err();
        match err {
            TapError::MissingContext(key) => assert_eq!(key, "form_id"),
            other => panic!("Expected MissingContext, got {:?}", other),
        }
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let ctx = Context::new().with("form_id", "F1");
        assert_eq!(
            serde_json::to_value(&ctx).unwrap(),
            serde_json::json!({"form_id": "F1"})
        );
    }
}
