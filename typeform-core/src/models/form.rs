use serde::{Deserialize, Serialize};

use crate::schema::SchemaField;

pub const FORM_FIELDS: &[SchemaField] = &[
    SchemaField::string("id"),
    SchemaField::string("title"),
    SchemaField::string("link"),
    SchemaField::string("last_updated_at"),
    SchemaField::string("created_at"),
];

/// One page of `GET /forms`.
#[derive(Debug, Deserialize)]
pub struct FormsPage {
    #[serde(default)]
    pub items: Option<Vec<FormItem>>,
}

#[derive(Debug, Deserialize)]
pub struct FormItem {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: Option<FormLinks>,
    #[serde(default)]
    pub last_updated_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FormLinks {
    #[serde(default)]
    pub display: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormRecord {
    pub id: String,
    pub title: Option<String>,
    pub link: Option<String>,
    pub last_updated_at: Option<String>,
    pub created_at: Option<String>,
}

impl From<FormItem> for FormRecord {
    fn from(item: FormItem) -> Self {
        Self {
            id: item.id,
            title: item.title,
            link: item.links.and_then(|l| l.display),
            last_updated_at: item.last_updated_at,
            created_at: item.created_at,
        }
    }
}
