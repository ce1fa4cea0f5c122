//! Todo list application state built on StateStore.
//!
//! A todo list (add item, toggle completion, filter by visibility) kept in a
//! single store. It demonstrates:
//!
//! - Immutable state replaced wholesale on every action
//! - Reducer composition: independent reducers for the `todos` and
//!   `visibility_filter` slices combined into one root reducer
//! - Caller-owned id generation instead of a global counter
//! - Listeners and connected projections on the store
//! - Testing with `ReducerTest`
//!
//! # Quick Start
//!
//! ```
//! use statestore_core::SequentialIdGenerator;
//! use todo::actions::{add_todo, set_visibility_filter, toggle_todo};
//! use todo::{TodoId, VisibilityFilter, new_store, selectors};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let ids = SequentialIdGenerator::new();
//! let store = new_store();
//!
//! store.dispatch(add_todo(&ids, "Learn"))?;
//! store.dispatch(toggle_todo(TodoId::new(0)))?;
//! store.dispatch(set_visibility_filter(VisibilityFilter::ShowActive))?;
//!
//! let state = store.get_state();
//! assert!(selectors::visible_todos(&state).is_empty());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod actions;
pub mod error;
pub mod reducer;
pub mod selectors;
pub mod types;

// Re-export commonly used types
pub use actions::TodoAction;
pub use error::TodoError;
pub use reducer::{
    TodoAppReducer, TodoReducer, TodoStore, TodosReducer, VisibilityFilterReducer, dispatch_json,
    new_store, root_reducer,
};
pub use types::{AppState, Todo, TodoId, TodoList, VisibilityFilter};
