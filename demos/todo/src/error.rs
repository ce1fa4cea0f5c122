//! Errors raised while decoding or applying todo actions.

use crate::types::TodoId;
use thiserror::Error;

/// Validation failures for todo actions and selectors
///
/// All of these are local validation errors: the state is never changed when
/// one is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TodoError {
    /// A recognised action is missing a required payload field
    #[error("Malformed {action} action: missing `{field}`")]
    MalformedAction {
        /// Action type as received
        action: String,
        /// Name of the missing field
        field: &'static str,
    },

    /// A visibility filter name is not one of the known filters
    #[error("Invalid visibility filter: {0}")]
    InvalidFilter(String),

    /// An added todo reuses an id already present in the list
    #[error("Todo with ID {0} already exists")]
    DuplicateTodoId(TodoId),

    /// The action is not valid JSON or has wrongly typed fields
    #[error("Invalid action JSON: {0}")]
    Json(String),
}

impl From<serde_json::Error> for TodoError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}
