//! Reducer logic for the todo list.
//!
//! The root reducer is composed from two independent sub-reducers, one per
//! slice of [`AppState`]:
//!
//! - [`TodosReducer`] owns `todos` and delegates per-item work to [`TodoReducer`]
//! - [`VisibilityFilterReducer`] owns `visibility_filter`
//!
//! Neither slice reducer knows about the other.

use std::sync::Arc;

use statestore_core::composition::{CombinedReducer, combine_reducers, scope_reducer};
use statestore_core::reducer::Reducer;
use statestore_runtime::{Store, StoreError, create_store};

use crate::actions::TodoAction;
use crate::error::TodoError;
use crate::types::{AppState, Todo, TodoId, TodoList, VisibilityFilter};

/// Reducer for a single todo
///
/// Its state is optional because `AddTodo` builds a todo from nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Builds the todo described by an `AddTodo` payload
    #[must_use]
    pub fn create(id: TodoId, text: &str) -> Arc<Todo> {
        Arc::new(Todo::new(id, text.to_string()))
    }

    /// Applies a non-creating action to an existing todo
    ///
    /// Returns the same `Arc` unless the action is a toggle of this todo.
    #[must_use]
    pub fn apply(todo: &Arc<Todo>, action: &TodoAction) -> Arc<Todo> {
        match action {
            TodoAction::ToggleTodo { id } if todo.id == *id => Arc::new(todo.toggled()),
            _ => Arc::clone(todo),
        }
    }
}

impl Reducer for TodoReducer {
    type State = Option<Arc<Todo>>;
    type Action = TodoAction;
    type Error = TodoError;

    fn reduce(&self, state: &Self::State, action: &Self::Action) -> Result<Self::State, Self::Error> {
        Ok(match action {
            TodoAction::AddTodo { id, text } => Some(Self::create(*id, text)),
            _ => state.as_ref().map(|todo| Self::apply(todo, action)),
        })
    }
}

/// Reducer for the todo list slice
#[derive(Clone, Copy, Debug, Default)]
pub struct TodosReducer;

impl TodosReducer {
    /// Creates a new `TodosReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for TodosReducer {
    type State = TodoList;
    type Action = TodoAction;
    type Error = TodoError;

    fn reduce(&self, state: &Self::State, action: &Self::Action) -> Result<Self::State, Self::Error> {
        match action {
            TodoAction::AddTodo { id, text } => {
                if state.iter().any(|todo| todo.id == *id) {
                    return Err(TodoError::DuplicateTodoId(*id));
                }

                let mut todos = Vec::with_capacity(state.len() + 1);
                todos.extend(state.iter().cloned());
                todos.push(TodoReducer::create(*id, text));
                Ok(Arc::new(todos))
            },
            TodoAction::ToggleTodo { .. } => Ok(Arc::new(
                state
                    .iter()
                    .map(|todo| TodoReducer::apply(todo, action))
                    .collect(),
            )),
            TodoAction::SetVisibilityFilter { .. } | TodoAction::Unknown { .. } => {
                Ok(Arc::clone(state))
            },
        }
    }
}

/// Reducer for the visibility filter slice
#[derive(Clone, Copy, Debug, Default)]
pub struct VisibilityFilterReducer;

impl VisibilityFilterReducer {
    /// Creates a new `VisibilityFilterReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for VisibilityFilterReducer {
    type State = VisibilityFilter;
    type Action = TodoAction;
    type Error = TodoError;

    fn reduce(&self, state: &Self::State, action: &Self::Action) -> Result<Self::State, Self::Error> {
        match action {
            TodoAction::SetVisibilityFilter { filter } => Ok(*filter),
            _ => Ok(*state),
        }
    }
}

/// The root reducer type of the todo application
pub type TodoAppReducer = CombinedReducer<AppState, TodoAction, TodoError>;

/// A store running the todo application
pub type TodoStore = Store<AppState, TodoAction, TodoAppReducer>;

/// Builds the root reducer by scoping each slice reducer to its field of
/// [`AppState`] and combining them.
#[must_use]
pub fn root_reducer() -> TodoAppReducer {
    combine_reducers(vec![
        Box::new(scope_reducer(
            TodosReducer::new(),
            |state: &AppState| &state.todos,
            |state: &AppState, todos| AppState {
                todos,
                visibility_filter: state.visibility_filter,
            },
        )),
        Box::new(scope_reducer(
            VisibilityFilterReducer::new(),
            |state: &AppState| &state.visibility_filter,
            |state: &AppState, visibility_filter| AppState {
                todos: Arc::clone(&state.todos),
                visibility_filter,
            },
        )),
    ])
}

/// Creates a todo store with the default (empty) state
#[must_use]
pub fn new_store() -> TodoStore {
    create_store(root_reducer(), None)
}

/// Decodes a JSON action and dispatches it
///
/// # Errors
///
/// Decoding failures are reported as [`StoreError::InvalidAction`] carrying
/// the [`TodoError`]; dispatch failures are passed through.
pub fn dispatch_json(store: &TodoStore, json: &str) -> Result<(), StoreError<TodoError>> {
    let action = TodoAction::from_json(json);
    if let Ok(action) = &action {
        tracing::debug!(action = action.kind(), "Decoded action");
    }
    store.try_dispatch(action)
}
