//! Read-only projections of the todo state.

use std::sync::Arc;

use crate::error::TodoError;
use crate::types::{AppState, Todo, VisibilityFilter};

/// Todos passing `filter`, in list order
#[must_use]
pub fn select_visible_todos(todos: &[Arc<Todo>], filter: VisibilityFilter) -> Vec<Arc<Todo>> {
    todos
        .iter()
        .filter(|todo| filter.matches(todo))
        .cloned()
        .collect()
}

/// Like [`select_visible_todos`], for a filter given by its wire name
///
/// # Errors
///
/// Returns [`TodoError::InvalidFilter`] if `filter` is not a known filter name.
pub fn select_visible_todos_named(
    todos: &[Arc<Todo>],
    filter: &str,
) -> Result<Vec<Arc<Todo>>, TodoError> {
    Ok(select_visible_todos(todos, filter.parse()?))
}

/// Todos visible under the state's current filter
#[must_use]
pub fn visible_todos(state: &AppState) -> Vec<Arc<Todo>> {
    select_visible_todos(&state.todos, state.visibility_filter)
}

/// Whether `filter` is the currently selected one
#[must_use]
pub fn is_filter_active(state: &AppState, filter: VisibilityFilter) -> bool {
    state.visibility_filter == filter
}

/// Todo totals
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TodoCounts {
    /// All todos
    pub total: usize,
    /// Todos not yet completed
    pub active: usize,
    /// Completed todos
    pub completed: usize,
}

/// Count todos by completion
#[must_use]
pub fn counts(state: &AppState) -> TodoCounts {
    let completed = state.todos.iter().filter(|todo| todo.completed).count();
    TodoCounts {
        total: state.todos.len(),
        active: state.todos.len() - completed,
        completed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TodoId;

    fn sample() -> AppState {
        AppState {
            todos: Arc::new(vec![
                Arc::new(Todo::new(TodoId::new(0), "Learn".to_string())),
                Arc::new(Todo::new(TodoId::new(1), "Teach".to_string()).toggled()),
                Arc::new(Todo::new(TodoId::new(2), "Rest".to_string())),
            ]),
            visibility_filter: VisibilityFilter::ShowActive,
        }
    }

    fn ids(todos: &[Arc<Todo>]) -> Vec<u64> {
        todos.iter().map(|todo| todo.id.get()).collect()
    }

    #[test]
    fn show_all_returns_everything() {
        let state = sample();
        assert_eq!(ids(&select_visible_todos(&state.todos, VisibilityFilter::ShowAll)), vec![0, 1, 2]);
    }

    #[test]
    fn show_active_and_completed_partition() {
        let state = sample();
        assert_eq!(ids(&select_visible_todos(&state.todos, VisibilityFilter::ShowActive)), vec![0, 2]);
        assert_eq!(ids(&select_visible_todos(&state.todos, VisibilityFilter::ShowCompleted)), vec![1]);
    }

    #[test]
    fn visible_todos_shares_items() {
        let state = sample();
        let visible = visible_todos(&state);
        assert!(Arc::ptr_eq(&visible[0], &state.todos[0]));
    }

    #[test]
    fn named_filter() {
        let state = sample();
        assert_eq!(
            select_visible_todos_named(&state.todos, "SHOW_COMPLETED").map(|t| ids(&t)),
            Ok(vec![1])
        );
        assert_eq!(
            select_visible_todos_named(&state.todos, "SHOW_NONE"),
            Err(TodoError::InvalidFilter("SHOW_NONE".to_string()))
        );
    }

    #[test]
    fn active_filter_flag() {
        let state = sample();
        assert!(is_filter_active(&state, VisibilityFilter::ShowActive));
        assert!(!is_filter_active(&state, VisibilityFilter::ShowAll));
    }

    #[test]
    fn counts_by_completion() {
        assert_eq!(
            counts(&sample()),
            TodoCounts {
                total: 3,
                active: 2,
                completed: 1
            }
        );
        assert_eq!(counts(&AppState::default()), TodoCounts::default());
    }
}
