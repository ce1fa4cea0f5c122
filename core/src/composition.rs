//! Reducer composition utilities
//!
//! Three ways to build bigger reducers out of smaller ones:
//! - **`scope_reducer`**: Focus a reducer on one slice of a larger state
//! - **`combine_reducers`**: Run several reducers over the same state/action
//! - **`reducer_fn`**: Use a plain function as a reducer
//!
//! A root reducer is usually built by scoping one sub-reducer per state slice
//! and combining the scoped reducers. Each sub-reducer only ever sees its own
//! slice, so none of them knows the others exist.
//!
//! # Examples
//!
//! ```
//! use statestore_core::composition::{combine_reducers, reducer_fn, scope_reducer};
//! use statestore_core::reducer::Reducer;
//! use std::convert::Infallible;
//!
//! #[derive(Clone, Debug, Default, PartialEq)]
//! struct AppState {
//!     count: i32,
//!     name: String,
//! }
//!
//! enum AppAction {
//!     Increment,
//!     SetName(String),
//! }
//!
//! let count = scope_reducer(
//!     reducer_fn(|count: &i32, action: &AppAction| -> Result<i32, Infallible> {
//!         Ok(match action {
//!             AppAction::Increment => count + 1,
//!             AppAction::SetName(_) => *count,
//!         })
//!     }),
//!     |s: &AppState| &s.count,
//!     |s: &AppState, count| AppState { count, ..s.clone() },
//! );
//!
//! let name = scope_reducer(
//!     reducer_fn(|name: &String, action: &AppAction| -> Result<String, Infallible> {
//!         Ok(match action {
//!             AppAction::SetName(n) => n.clone(),
//!             AppAction::Increment => name.clone(),
//!         })
//!     }),
//!     |s: &AppState| &s.name,
//!     |s: &AppState, name| AppState { name, ..s.clone() },
//! );
//!
//! let app = combine_reducers(vec![Box::new(count), Box::new(name)]);
//!
//! let state = app.reduce(&AppState::default(), &AppAction::Increment).unwrap_or_default();
//! let state = app.reduce(&state, &AppAction::SetName("Alice".into())).unwrap_or_default();
//! assert_eq!(state, AppState { count: 1, name: "Alice".into() });
//! ```

use crate::reducer::Reducer;
use std::marker::PhantomData;

/// A boxed reducer that can live inside a shared store.
pub type BoxedReducer<S, A, E> = Box<dyn Reducer<State = S, Action = A, Error = E> + Send + Sync>;

/// Combines multiple reducers that operate on the same state and action types.
///
/// Each reducer is run in sequence and receives the state produced by the
/// previous one. The first error short-circuits the chain; the caller keeps
/// the original state.
///
/// # Type Parameters
///
/// - `S`: The state type
/// - `A`: The action type
/// - `E`: The error type
#[must_use]
pub fn combine_reducers<S, A, E>(reducers: Vec<BoxedReducer<S, A, E>>) -> CombinedReducer<S, A, E>
where
    S: Clone,
{
    CombinedReducer { reducers }
}

/// A combined reducer that runs multiple reducers in sequence.
///
/// Created by [`combine_reducers`].
pub struct CombinedReducer<S, A, E> {
    reducers: Vec<BoxedReducer<S, A, E>>,
}

impl<S, A, E> CombinedReducer<S, A, E> {
    /// Number of reducers in the chain
    #[must_use]
    pub fn len(&self) -> usize {
        self.reducers.len()
    }

    /// Whether the chain has no reducers (and therefore never changes state)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reducers.is_empty()
    }
}

impl<S, A, E> std::fmt::Debug for CombinedReducer<S, A, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CombinedReducer")
            .field("reducers", &self.reducers.len())
            .finish()
    }
}

impl<S, A, E> Reducer for CombinedReducer<S, A, E>
where
    S: Clone,
{
    type State = S;
    type Action = A;
    type Error = E;

    fn reduce(&self, state: &Self::State, action: &Self::Action) -> Result<Self::State, Self::Error> {
        let mut next = state.clone();

        for reducer in &self.reducers {
            next = reducer.reduce(&next, action)?;
        }

        Ok(next)
    }
}

/// Scopes a reducer to operate on one slice of a larger state.
///
/// This allows you to reuse reducers designed for smaller state types
/// within a larger application state.
///
/// # Type Parameters
///
/// - `S`: The parent state type
/// - `SubS`: The child state type (a slice of `S`)
/// - `R`: The child reducer
///
/// # Arguments
///
/// - `get_state`: Borrows the slice out of the parent
/// - `set_state`: Builds a new parent with the slice replaced
#[must_use]
pub fn scope_reducer<S, SubS, R>(
    reducer: R,
    get_state: fn(&S) -> &SubS,
    set_state: fn(&S, SubS) -> S,
) -> ScopedReducer<S, SubS, R>
where
    R: Reducer<State = SubS>,
{
    ScopedReducer {
        reducer,
        get_state,
        set_state,
    }
}

/// A scoped reducer that operates on a slice of state.
///
/// Created by [`scope_reducer`].
pub struct ScopedReducer<S, SubS, R> {
    reducer: R,
    get_state: fn(&S) -> &SubS,
    set_state: fn(&S, SubS) -> S,
}

impl<S, SubS, R> Reducer for ScopedReducer<S, SubS, R>
where
    R: Reducer<State = SubS>,
{
    type State = S;
    type Action = R::Action;
    type Error = R::Error;

    fn reduce(&self, state: &Self::State, action: &Self::Action) -> Result<Self::State, Self::Error> {
        let slice = self.reducer.reduce((self.get_state)(state), action)?;
        Ok((self.set_state)(state, slice))
    }
}

/// Wraps a plain function `(&S, &A) -> Result<S, E>` as a [`Reducer`].
#[must_use]
pub fn reducer_fn<S, A, E, F>(f: F) -> FnReducer<S, A, E, F>
where
    F: Fn(&S, &A) -> Result<S, E>,
{
    FnReducer {
        f,
        _phantom: PhantomData,
    }
}

/// A function-backed reducer.
///
/// Created by [`reducer_fn`].
pub struct FnReducer<S, A, E, F> {
    f: F,
    _phantom: PhantomData<fn(&S, &A) -> Result<S, E>>,
}

impl<S, A, E, F> Reducer for FnReducer<S, A, E, F>
where
    F: Fn(&S, &A) -> Result<S, E>,
{
    type State = S;
    type Action = A;
    type Error = E;

    fn reduce(&self, state: &Self::State, action: &Self::Action) -> Result<Self::State, Self::Error> {
        (self.f)(state, action)
    }
}
