//! # StateStore Testing
//!
//! Testing utilities and helpers for the StateStore reducer architecture.
//!
//! This crate provides:
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - Listener mocks that record notifications and state snapshots
//! - Property-based testing helpers
//!
//! ## Example
//!
//! ```ignore
//! use statestore_testing::mocks::RecordingListener;
//!
//! let store = create_store(root_reducer(), None);
//! let recorder = RecordingListener::new();
//! let _sub = store.subscribe(recorder.listener());
//!
//! store.dispatch(TodoAction::ToggleTodo { id: TodoId::new(0) })?;
//! assert_eq!(recorder.calls(), 1);
//! ```

use statestore_core::environment::SequentialIdGenerator;


/// Mock implementations for testing.
pub mod mocks {
    use statestore_core::reducer::Reducer;
    use statestore_runtime::{Store, Unsubscribe};
    use std::fmt::Display;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex, PoisonError};

    /// Listener that counts how many times it was notified
    ///
    /// # Example
    ///
    /// ```
    /// use statestore_testing::mocks::RecordingListener;
    ///
    /// let recorder = RecordingListener::new();
    /// let listener = recorder.listener();
    /// listener();
    /// listener();
    /// assert_eq!(recorder.calls(), 2);
    /// ```
    #[derive(Debug, Clone, Default)]
    pub struct RecordingListener {
        calls: Arc<AtomicUsize>,
    }

    impl RecordingListener {
        /// Create a listener with a zero call count
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// A callback suitable for `Store::subscribe`
        #[must_use]
        pub fn listener(&self) -> impl Fn() + Send + Sync + 'static {
            let calls = Arc::clone(&self.calls);
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
            }
        }

        /// Number of notifications received
        #[must_use]
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    /// Records every state snapshot a store publishes to its listeners
    #[derive(Debug)]
    pub struct StateHistory<S> {
        snapshots: Arc<Mutex<Vec<Arc<S>>>>,
    }

    impl<S> StateHistory<S>
    where
        S: Send + Sync + 'static,
    {
        /// Subscribe to `store` and record the snapshot seen after every
        /// notification
        ///
        /// The recording listener holds its own handle to the store; call
        /// `unsubscribe` on the returned handle (or shut the store down) when
        /// done.
        pub fn attach<A, R>(store: &Store<S, A, R>) -> (Self, Unsubscribe)
        where
            A: Send + Sync + 'static,
            R: Reducer<State = S, Action = A> + Send + Sync + 'static,
            R::Error: Display,
        {
            let snapshots = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&snapshots);
            let reader = store.clone();

            let subscription = store.subscribe(move || {
                sink.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(reader.get_state());
            });

            (Self { snapshots }, subscription)
        }

        /// All recorded snapshots, oldest first
        #[must_use]
        pub fn snapshots(&self) -> Vec<Arc<S>> {
            self.snapshots
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Number of recorded snapshots
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .len()
        }

        /// Whether nothing was recorded yet
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }
}

/// Property-based testing utilities using proptest.
pub mod properties {
    use proptest::prelude::*;

    /// Strategy producing sequences of up to `max_len` actions drawn from
    /// `action`
    pub fn action_sequence<A>(
        action: impl Strategy<Value = A>,
        max_len: usize,
    ) -> impl Strategy<Value = Vec<A>>
    where
        A: std::fmt::Debug,
    {
        proptest::collection::vec(action, 0..=max_len)
    }
}

/// Tracing helpers for tests
pub mod tracing_support {
    /// Install a test-friendly `tracing` subscriber
    ///
    /// Output goes through the test harness capture and respects `RUST_LOG`.
    /// Safe to call from every test; only the first call installs.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    }
}

/// Id generator for tests, starting at 0
#[must_use]
pub const fn test_ids() -> SequentialIdGenerator {
    SequentialIdGenerator::new()
}

// Re-export commonly used items
pub use mocks::{RecordingListener, StateHistory};
pub use reducer_test::ReducerTest;
pub use tracing_support::init_test_tracing;
