//! Actions and action creators for the todo list.
//!
//! On the wire an action is a tagged record `{ "type": ..., ...payload }`.
//! Decoding goes through [`RawAction`] so that missing payload fields and
//! unknown filter names turn into [`TodoError`]s instead of half-built actions.

use serde::{Deserialize, Serialize};
use statestore_core::environment::IdGenerator;

use crate::error::TodoError;
use crate::types::{TodoId, VisibilityFilter};

/// Wire name of [`TodoAction::AddTodo`]
pub const ADD_TODO: &str = "ADD_TODO";
/// Wire name of [`TodoAction::ToggleTodo`]
pub const TOGGLE_TODO: &str = "TOGGLE_TODO";
/// Wire name of [`TodoAction::SetVisibilityFilter`]
pub const SET_VISIBILITY_FILTER: &str = "SET_VISIBILITY_FILTER";

/// Everything that can be dispatched to the todo store
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAction", into = "RawAction")]
pub enum TodoAction {
    /// Append a new, not yet completed todo
    AddTodo {
        /// Identifier of the new todo
        id: TodoId,
        /// Description of the todo
        text: String,
    },

    /// Flip the `completed` flag of one todo
    ToggleTodo {
        /// Todo to toggle
        id: TodoId,
    },

    /// Change which todos are shown
    SetVisibilityFilter {
        /// The new filter
        filter: VisibilityFilter,
    },

    /// Any action type this application does not handle; never changes state
    Unknown {
        /// The action type as received
        kind: String,
    },
}

impl TodoAction {
    /// Wire name of the action type
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::AddTodo { .. } => ADD_TODO,
            Self::ToggleTodo { .. } => TOGGLE_TODO,
            Self::SetVisibilityFilter { .. } => SET_VISIBILITY_FILTER,
            Self::Unknown { kind } => kind,
        }
    }

    /// Decode an action from JSON
    ///
    /// # Errors
    ///
    /// - [`TodoError::Json`] if the input is not a JSON object of the right shape
    /// - [`TodoError::MalformedAction`] if a required field is missing
    /// - [`TodoError::InvalidFilter`] for an unknown visibility filter
    pub fn from_json(json: &str) -> Result<Self, TodoError> {
        let raw: RawAction = serde_json::from_str(json)?;
        Self::try_from(raw)
    }
}

/// Untyped action record as it appears on the wire
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAction {
    /// Action type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Todo id (`ADD_TODO`, `TOGGLE_TODO`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Todo text (`ADD_TODO`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Filter name (`SET_VISIBILITY_FILTER`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

fn require<T>(value: Option<T>, action: &str, field: &'static str) -> Result<T, TodoError> {
    value.ok_or_else(|| TodoError::MalformedAction {
        action: action.to_string(),
        field,
    })
}

impl TryFrom<RawAction> for TodoAction {
    type Error = TodoError;

    fn try_from(raw: RawAction) -> Result<Self, Self::Error> {
        let kind = require(raw.kind, "untyped", "type")?;

        match kind.as_str() {
            ADD_TODO => Ok(Self::AddTodo {
                id: TodoId::new(require(raw.id, &kind, "id")?),
                text: require(raw.text, &kind, "text")?,
            }),
            TOGGLE_TODO => Ok(Self::ToggleTodo {
                id: TodoId::new(require(raw.id, &kind, "id")?),
            }),
            SET_VISIBILITY_FILTER => Ok(Self::SetVisibilityFilter {
                filter: require(raw.filter, &kind, "filter")?.parse()?,
            }),
            _ => Ok(Self::Unknown { kind }),
        }
    }
}

impl From<TodoAction> for RawAction {
    fn from(action: TodoAction) -> Self {
        match action {
            TodoAction::AddTodo { id, text } => Self {
                kind: Some(ADD_TODO.to_string()),
                id: Some(id.get()),
                text: Some(text),
                filter: None,
            },
            TodoAction::ToggleTodo { id } => Self {
                kind: Some(TOGGLE_TODO.to_string()),
                id: Some(id.get()),
                ..Self::default()
            },
            TodoAction::SetVisibilityFilter { filter } => Self {
                kind: Some(SET_VISIBILITY_FILTER.to_string()),
                filter: Some(filter.as_str().to_string()),
                ..Self::default()
            },
            TodoAction::Unknown { kind } => Self {
                kind: Some(kind),
                ..Self::default()
            },
        }
    }
}

// ========== Action creators ==========

/// Build an `ADD_TODO` action with the next id from `ids`
pub fn add_todo<G>(ids: &G, text: impl Into<String>) -> TodoAction
where
    G: IdGenerator + ?Sized,
{
    TodoAction::AddTodo {
        id: TodoId::new(ids.next_id()),
        text: text.into(),
    }
}

/// Build a `TOGGLE_TODO` action
#[must_use]
pub const fn toggle_todo(id: TodoId) -> TodoAction {
    TodoAction::ToggleTodo { id }
}

/// Build a `SET_VISIBILITY_FILTER` action
#[must_use]
pub const fn set_visibility_filter(filter: VisibilityFilter) -> TodoAction {
    TodoAction::SetVisibilityFilter { filter }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statestore_core::environment::SequentialIdGenerator;

    #[test]
    fn decodes_add_todo() {
        let action = TodoAction::from_json(r#"{"type":"ADD_TODO","id":0,"text":"Learn"}"#);
        assert_eq!(
            action,
            Ok(TodoAction::AddTodo {
                id: TodoId::new(0),
                text: "Learn".to_string(),
            })
        );
    }

    #[test]
    fn decodes_set_visibility_filter() {
        let action =
            TodoAction::from_json(r#"{"type":"SET_VISIBILITY_FILTER","filter":"SHOW_ACTIVE"}"#);
        assert_eq!(action, Ok(set_visibility_filter(VisibilityFilter::ShowActive)));
    }

    #[test]
    fn unknown_type_is_not_an_error() {
        let action = TodoAction::from_json(r#"{"type":"@@INIT","payload":42}"#).unwrap();
        assert_eq!(
            action,
            TodoAction::Unknown {
                kind: "@@INIT".to_string()
            }
        );
        assert_eq!(action.kind(), "@@INIT");
    }

    #[test]
    fn toggle_without_id_is_malformed() {
        assert_eq!(
            TodoAction::from_json(r#"{"type":"TOGGLE_TODO"}"#),
            Err(TodoError::MalformedAction {
                action: "TOGGLE_TODO".to_string(),
                field: "id",
            })
        );
    }

    #[test]
    fn add_without_text_is_malformed() {
        assert_eq!(
            TodoAction::from_json(r#"{"type":"ADD_TODO","id":3}"#),
            Err(TodoError::MalformedAction {
                action: "ADD_TODO".to_string(),
                field: "text",
            })
        );
    }

    #[test]
    fn missing_type_is_malformed() {
        assert!(matches!(
            TodoAction::from_json(r#"{"id":3}"#),
            Err(TodoError::MalformedAction { field: "type", .. })
        ));
    }

    #[test]
    fn unknown_filter_is_invalid() {
        assert_eq!(
            TodoAction::from_json(r#"{"type":"SET_VISIBILITY_FILTER","filter":"SHOW_DONE"}"#),
            Err(TodoError::InvalidFilter("SHOW_DONE".to_string()))
        );
    }

    #[test]
    fn wrongly_typed_id_is_a_json_error() {
        assert!(matches!(
            TodoAction::from_json(r#"{"type":"TOGGLE_TODO","id":"zero"}"#),
            Err(TodoError::Json(_))
        ));
        assert!(matches!(TodoAction::from_json("not json"), Err(TodoError::Json(_))));
    }

    #[test]
    fn serializes_as_tagged_record() {
        let json = serde_json::to_value(toggle_todo(TodoId::new(4))).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "TOGGLE_TODO", "id": 4 }));

        let json = serde_json::to_value(set_visibility_filter(VisibilityFilter::ShowCompleted)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "type": "SET_VISIBILITY_FILTER", "filter": "SHOW_COMPLETED" })
        );
    }

    #[test]
    fn add_todo_takes_ids_from_generator() {
        let ids = SequentialIdGenerator::new();
        let first = add_todo(&ids, "Learn");
        let second = add_todo(&ids, "Teach");

        assert_eq!(
            first,
            TodoAction::AddTodo {
                id: TodoId::new(0),
                text: "Learn".to_string()
            }
        );
        assert!(matches!(second, TodoAction::AddTodo { id, .. } if id == TodoId::new(1)));
    }
}
