//! Common types used across the API

use serde::{Deserialize, Serialize};

/// Request body that may hold a single object or an array of them
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn is_single(&self) -> bool {
        matches!(self, OneOrMany::One(_))
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(item) => vec![item],
            OneOrMany::Many(items) => items,
        }
    }
}

/// Result of writing one row keyed by (scheme, material code)
#[derive(Debug, Clone, Serialize)]
pub struct UpsertOutcome<T> {
    pub created: bool,
    pub record: T,
}

/// Plain message body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    pub message: String,
}

impl ApiMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
