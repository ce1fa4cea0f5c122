//! Integration tests for the todo application with Store
//!
//! These tests run the full dispatch → reduce → notify flow.

#![allow(clippy::unwrap_used)] // Tests can unwrap

use statestore_runtime::StoreError;
use statestore_testing::{RecordingListener, StateHistory, test_ids};
use std::sync::{Arc, Mutex};
use todo::actions::{add_todo, set_visibility_filter, toggle_todo};
use todo::selectors::{self, TodoCounts};
use todo::{AppState, Todo, TodoAction, TodoError, TodoId, VisibilityFilter, dispatch_json, new_store};

fn ids(todos: &[Arc<Todo>]) -> Vec<u64> {
    todos.iter().map(|todo| todo.id.get()).collect()
}

#[test]
fn test_learn_toggle_filter_scenario() {
    let store = new_store();
    assert_eq!(*store.get_state(), AppState::default());

    dispatch_json(&store, r#"{"type":"ADD_TODO","id":0,"text":"Learn"}"#).unwrap();
    assert_eq!(
        store.get_state().todos.as_slice(),
        &[Arc::new(Todo::new(TodoId::new(0), "Learn".to_string()))]
    );

    dispatch_json(&store, r#"{"type":"TOGGLE_TODO","id":0}"#).unwrap();
    assert!(store.get_state().todos[0].completed);

    dispatch_json(&store, r#"{"type":"SET_VISIBILITY_FILTER","filter":"SHOW_ACTIVE"}"#).unwrap();
    let state = store.get_state();
    assert!(selectors::select_visible_todos(&state.todos, state.visibility_filter).is_empty());
}

#[test]
fn test_show_completed_after_toggle() {
    let store = new_store();
    let id_source = test_ids();

    store.dispatch(add_todo(&id_source, "First")).unwrap();
    store.dispatch(add_todo(&id_source, "Second")).unwrap();
    store.dispatch(toggle_todo(TodoId::new(1))).unwrap();
    store
        .dispatch(set_visibility_filter(VisibilityFilter::ShowCompleted))
        .unwrap();

    let visible = selectors::visible_todos(&store.get_state());
    assert_eq!(ids(&visible), vec![1]);
    assert_eq!(visible[0].text, "Second");
}

#[test]
fn test_unknown_action_keeps_snapshot_contents() {
    let store = new_store();
    store
        .dispatch(add_todo(&test_ids(), "Learn"))
        .unwrap();

    let before = store.get_state();
    dispatch_json(&store, r#"{"type":"SOMETHING_ELSE","id":0}"#).unwrap();
    let after = store.get_state();

    assert_eq!(before, after);
    assert!(Arc::ptr_eq(&before.todos, &after.todos));
}

#[test]
fn test_invalid_actions_leave_state_untouched() {
    let store = new_store();
    let recorder = RecordingListener::new();
    let _sub = store.subscribe(recorder.listener());

    store.dispatch(toggle_todo(TodoId::new(5))).unwrap();
    assert_eq!(recorder.calls(), 1);

    let before = store.get_state();

    assert!(matches!(
        dispatch_json(&store, r#"{"type":"TOGGLE_TODO"}"#),
        Err(StoreError::InvalidAction(TodoError::MalformedAction { .. }))
    ));
    assert_eq!(
        dispatch_json(&store, r#"{"type":"SET_VISIBILITY_FILTER","filter":"SHOW_NONE"}"#),
        Err(StoreError::InvalidAction(TodoError::InvalidFilter("SHOW_NONE".to_string())))
    );

    store
        .dispatch(TodoAction::AddTodo {
            id: TodoId::new(0),
            text: "Learn".to_string(),
        })
        .unwrap();
    let with_todo = store.get_state();
    assert_eq!(
        store.dispatch(TodoAction::AddTodo {
            id: TodoId::new(0),
            text: "Duplicate".to_string(),
        }),
        Err(StoreError::Reducer(TodoError::DuplicateTodoId(TodoId::new(0))))
    );

    assert_eq!(before.count(), 0);
    assert!(Arc::ptr_eq(&with_todo, &store.get_state()));
    // Only the two successful dispatches notified
    assert_eq!(recorder.calls(), 2);
}

#[test]
fn test_listener_reads_new_state() {
    let store = new_store();
    let (history, subscription) = StateHistory::attach(&store);

    let id_source = test_ids();
    store.dispatch(add_todo(&id_source, "Learn")).unwrap();
    store.dispatch(toggle_todo(TodoId::new(0))).unwrap();

    let snapshots = history.snapshots();
    assert_eq!(snapshots.len(), 2);
    assert!(!snapshots[0].todos[0].completed);
    assert!(snapshots[1].todos[0].completed);

    assert!(subscription.unsubscribe());
    store.dispatch(toggle_todo(TodoId::new(0))).unwrap();
    assert_eq!(history.len(), 2);
}

#[test]
fn test_connect_fires_only_on_projection_change() {
    let store = new_store();
    let seen: Arc<Mutex<Vec<TodoCounts>>> = Arc::default();

    let sink = Arc::clone(&seen);
    let _connection = store.connect(selectors::counts, move |counts| {
        sink.lock().unwrap().push(*counts);
    });

    let id_source = test_ids();
    store.dispatch(add_todo(&id_source, "Learn")).unwrap();
    // Changing the filter leaves the counts alone
    store
        .dispatch(set_visibility_filter(VisibilityFilter::ShowActive))
        .unwrap();
    store.dispatch(toggle_todo(TodoId::new(0))).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            TodoCounts::default(),
            TodoCounts {
                total: 1,
                active: 1,
                completed: 0
            },
            TodoCounts {
                total: 1,
                active: 0,
                completed: 1
            },
        ]
    );
}

#[test]
fn test_filter_link_active_flag_follows_store() {
    let store = new_store();
    let active: Arc<Mutex<Option<bool>>> = Arc::default();

    let sink = Arc::clone(&active);
    let _link = store.connect(
        |state: &AppState| selectors::is_filter_active(state, VisibilityFilter::ShowCompleted),
        move |is_active| {
            *sink.lock().unwrap() = Some(*is_active);
        },
    );
    assert_eq!(*active.lock().unwrap(), Some(false));

    store
        .dispatch(set_visibility_filter(VisibilityFilter::ShowCompleted))
        .unwrap();
    assert_eq!(*active.lock().unwrap(), Some(true));
}

#[test]
fn test_listener_dispatch_is_queued() {
    let store = new_store();
    let id_source = Arc::new(test_ids());

    // Auto-complete every new todo from inside a listener
    let inner = store.clone();
    let _sub = store.subscribe(move || {
        let state = inner.get_state();
        if let Some(last) = state.todos.last() {
            if !last.completed {
                inner.dispatch(toggle_todo(last.id)).unwrap();
                // Not applied yet: the outer notification round is still running
                assert!(!inner.get_state().todos.last().unwrap().completed);
            }
        }
    });

    store.dispatch(add_todo(&*id_source, "Learn")).unwrap();

    // The queued toggle was drained before the outer dispatch returned
    let state = store.get_state();
    assert_eq!(state.count(), 1);
    assert!(state.todos[0].completed);

    store.shutdown();
}
