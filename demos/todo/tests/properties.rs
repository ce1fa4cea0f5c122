//! Property tests for the todo reducers and store.

#![allow(clippy::unwrap_used)] // Tests can unwrap

use proptest::prelude::*;
use statestore_core::reducer::Reducer;
use statestore_testing::properties::action_sequence;
use statestore_testing::test_ids;
use std::sync::Arc;
use todo::actions::{add_todo, toggle_todo};
use todo::{Todo, TodoAction, TodoId, TodoReducer, VisibilityFilter, new_store, root_reducer};

fn any_filter() -> impl Strategy<Value = VisibilityFilter> {
    prop_oneof![
        Just(VisibilityFilter::ShowAll),
        Just(VisibilityFilter::ShowActive),
        Just(VisibilityFilter::ShowCompleted),
    ]
}

/// Actions that never add a todo, over ids 0..8
fn non_adding_action() -> impl Strategy<Value = TodoAction> {
    prop_oneof![
        (0u64..8).prop_map(|id| toggle_todo(TodoId::new(id))),
        any_filter().prop_map(|filter| TodoAction::SetVisibilityFilter { filter }),
        "[A-Z_]{1,12}".prop_map(|kind| TodoAction::Unknown {
            kind: format!("X_{kind}")
        }),
    ]
}

proptest! {
    #[test]
    fn added_todos_keep_dispatch_order(texts in proptest::collection::vec("[a-z ]{0,10}", 0..30)) {
        let store = new_store();
        let id_source = test_ids();

        for text in &texts {
            store.dispatch(add_todo(&id_source, text.as_str())).unwrap();
        }

        let state = store.get_state();
        prop_assert_eq!(state.todos.len(), texts.len());
        for (index, todo) in state.todos.iter().enumerate() {
            prop_assert_eq!(todo.id.get(), index as u64);
            prop_assert_eq!(&todo.text, &texts[index]);
            prop_assert!(!todo.completed);
        }
    }

    #[test]
    fn unknown_actions_never_change_state(
        todo_count in 0u64..6,
        kind in "[A-Z_]{1,16}",
        filter in any_filter(),
    ) {
        let store = new_store();
        let id_source = test_ids();
        for _ in 0..todo_count {
            store.dispatch(add_todo(&id_source, "item")).unwrap();
        }
        store.dispatch(TodoAction::SetVisibilityFilter { filter }).unwrap();

        let before = store.get_state();
        store.dispatch(TodoAction::Unknown { kind: format!("UNHANDLED_{kind}") }).unwrap();
        let after = store.get_state();

        prop_assert_eq!(&before, &after);
        prop_assert!(Arc::ptr_eq(&before.todos, &after.todos));
    }

    #[test]
    fn double_toggle_restores_completion(todo_count in 1u64..6, pick in 0u64..6, actions in action_sequence(non_adding_action(), 10)) {
        let store = new_store();
        let id_source = test_ids();
        for _ in 0..todo_count {
            store.dispatch(add_todo(&id_source, "item")).unwrap();
        }
        for action in actions {
            store.dispatch(action).unwrap();
        }

        let id = TodoId::new(pick % todo_count);
        let before = store.get_state();

        store.dispatch(toggle_todo(id)).unwrap();
        store.dispatch(toggle_todo(id)).unwrap();

        let after = store.get_state();
        prop_assert_eq!(&before.todos, &after.todos);
    }

    #[test]
    fn toggle_of_other_id_returns_same_todo(id in 0u64..100, other in 0u64..100, completed in any::<bool>()) {
        prop_assume!(id != other);

        let todo = Arc::new(Todo { id: TodoId::new(id), text: "t".to_string(), completed });
        let next = TodoReducer::new()
            .reduce(&Some(Arc::clone(&todo)), &toggle_todo(TodoId::new(other)))
            .unwrap();

        prop_assert!(Arc::ptr_eq(&todo, next.as_ref().unwrap()));
    }

    #[test]
    fn filter_slice_only_follows_filter_actions(actions in action_sequence(non_adding_action(), 20)) {
        let reducer = root_reducer();
        let mut state = todo::AppState::default();
        let mut expected = VisibilityFilter::ShowAll;

        for action in &actions {
            if let TodoAction::SetVisibilityFilter { filter } = action {
                expected = *filter;
            }
            state = reducer.reduce(&state, action).unwrap();
        }

        prop_assert_eq!(state.visibility_filter, expected);
        prop_assert!(state.todos.is_empty());
    }
}
