pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod schema;
pub mod state;

pub use crate::client::{ApiSource, TypeformClient};
pub use crate::config::TapConfig;
pub use crate::context::Context;
pub use crate::error::TapError;
pub use crate::schema::{FieldKind, SchemaField};
pub use crate::state::State;
