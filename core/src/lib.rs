//! # StateStore Core
//!
//! Core traits for the StateStore reducer architecture.
//!
//! A store holds one immutable state tree. Every dispatched action is run
//! through a pure reducer that returns the *next* state by value; the old
//! state is never mutated in place.
//!
//! ## Core Concepts
//!
//! - **State**: The application state tree (cheap to clone, usually `Arc`-backed)
//! - **Action**: A tagged description of an intended state transition
//! - **Reducer**: Pure function `(&State, &Action) → Result<State, Error>`
//! - **Composition**: A root reducer delegates disjoint slices of state to
//!   independent sub-reducers (see [`composition`])
//! - **Environment**: Caller-owned dependencies such as id generation
//!
//! ## Example
//!
//! ```
//! use statestore_core::reducer::Reducer;
//!
//! #[derive(Clone, Debug, Default, PartialEq)]
//! struct CounterState {
//!     count: i64,
//! }
//!
//! enum CounterAction {
//!     Increment,
//!     Decrement,
//! }
//!
//! struct CounterReducer;
//!
//! impl Reducer for CounterReducer {
//!     type State = CounterState;
//!     type Action = CounterAction;
//!     type Error = std::convert::Infallible;
//!
//!     fn reduce(
//!         &self,
//!         state: &CounterState,
//!         action: &CounterAction,
//!     ) -> Result<CounterState, Self::Error> {
//!         Ok(match action {
//!             CounterAction::Increment => CounterState { count: state.count + 1 },
//!             CounterAction::Decrement => CounterState { count: state.count - 1 },
//!         })
//!     }
//! }
//!
//! let next = CounterReducer.reduce(&CounterState::default(), &CounterAction::Increment);
//! assert_eq!(next, Ok(CounterState { count: 1 }));
//! ```

/// Reducer composition utilities
pub mod composition;

/// Reducer module - The core trait for state transitions
///
/// Reducers are pure functions: `(State, Action) → State`.
///
/// They hold all transition logic and are deterministic and testable
/// without a store.
pub mod reducer {
    /// The Reducer trait - core abstraction for state transitions
    ///
    /// # Type Parameters
    ///
    /// - `State`: The state (or state slice) this reducer operates on
    /// - `Action`: The action type this reducer processes
    /// - `Error`: Validation failure raised for actions that cannot be applied
    ///
    /// Actions a reducer does not recognise must return the input state
    /// unchanged rather than an error.
    pub trait Reducer {
        /// The state type this reducer operates on
        type State;

        /// The action type this reducer processes
        type Action;

        /// The error returned when an action fails validation
        type Error;

        /// Reduce an action into the next state
        ///
        /// # Arguments
        ///
        /// - `state`: The current state, which is left untouched
        /// - `action`: The action to process
        ///
        /// # Returns
        ///
        /// The next state. For unchanged state, return a clone of `state`
        /// (for `Arc`-backed state this preserves pointer identity).
        ///
        /// # Errors
        ///
        /// Returns `Self::Error` when the action is malformed or would break
        /// an invariant of the state. The caller must keep the old state.
        fn reduce(
            &self,
            state: &Self::State,
            action: &Self::Action,
        ) -> Result<Self::State, Self::Error>;
    }

    impl<R> Reducer for Box<R>
    where
        R: Reducer + ?Sized,
    {
        type State = R::State;
        type Action = R::Action;
        type Error = R::Error;

        fn reduce(
            &self,
            state: &Self::State,
            action: &Self::Action,
        ) -> Result<Self::State, Self::Error> {
            (**self).reduce(state, action)
        }
    }

    impl<R> Reducer for std::sync::Arc<R>
    where
        R: Reducer + ?Sized,
    {
        type State = R::State;
        type Action = R::Action;
        type Error = R::Error;

        fn reduce(
            &self,
            state: &Self::State,
            action: &Self::Action,
        ) -> Result<Self::State, Self::Error> {
            (**self).reduce(state, action)
        }
    }
}

/// Environment module - Dependency injection traits
///
/// Dependencies that would otherwise be module-level globals (such as the
/// next todo id) are abstracted behind traits and owned by the caller.
pub mod environment {
    use std::sync::atomic::{AtomicU64, Ordering};

    /// `IdGenerator` trait - hands out unique, monotonically increasing ids
    ///
    /// # Examples
    ///
    /// ```
    /// use statestore_core::environment::{IdGenerator, SequentialIdGenerator};
    ///
    /// let ids = SequentialIdGenerator::new();
    /// assert_eq!(ids.next_id(), 0);
    /// assert_eq!(ids.next_id(), 1);
    /// ```
    pub trait IdGenerator: Send + Sync {
        /// Return the next id
        fn next_id(&self) -> u64;
    }

    /// Atomic counter id generator
    #[derive(Debug, Default)]
    pub struct SequentialIdGenerator {
        next: AtomicU64,
    }

    impl SequentialIdGenerator {
        /// Create a generator starting at 0
        #[must_use]
        pub const fn new() -> Self {
            Self::starting_at(0)
        }

        /// Create a generator whose first id is `first`
        #[must_use]
        pub const fn starting_at(first: u64) -> Self {
            Self {
                next: AtomicU64::new(first),
            }
        }

        /// Peek at the id the next call will return
        #[must_use]
        pub fn peek(&self) -> u64 {
            self.next.load(Ordering::Acquire)
        }
    }

    impl IdGenerator for SequentialIdGenerator {
        fn next_id(&self) -> u64 {
            self.next.fetch_add(1, Ordering::AcqRel)
        }
    }

    impl<G> IdGenerator for std::sync::Arc<G>
    where
        G: IdGenerator + ?Sized,
    {
        fn next_id(&self) -> u64 {
            (**self).next_id()
        }
    }
}

// Re-export the types most callers need
pub use composition::{combine_reducers, reducer_fn, scope_reducer};
pub use environment::{IdGenerator, SequentialIdGenerator};
pub use reducer::Reducer;
