//! # StateStore Runtime
//!
//! Runtime implementation for the StateStore reducer architecture.
//!
//! This crate provides the [`Store`](store::Store): the single object that
//! holds the current application state, is the dispatch entry point, and keeps
//! the listener registry.
//!
//! ## Core Components
//!
//! - **Store**: Applies the root reducer to each dispatched action and swaps in
//!   the resulting immutable state snapshot
//! - **Listeners**: Callbacks run synchronously after every state transition
//! - **Connect**: Listeners that only fire when a projection of state changes
//!
//! ## Example
//!
//! ```
//! use statestore_core::reducer_fn;
//! use statestore_runtime::create_store;
//! use std::convert::Infallible;
//!
//! let store = create_store(
//!     reducer_fn(|count: &i64, delta: &i64| -> Result<i64, Infallible> { Ok(count + delta) }),
//!     None,
//! );
//!
//! let _subscription = store.subscribe(|| println!("state changed"));
//!
//! store.dispatch(5).unwrap_or_default();
//! assert_eq!(*store.get_state(), 5);
//! ```

use statestore_core::reducer::Reducer;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use std::thread::{self, ThreadId};

/// Store metrics for observability
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    ///
    /// `E` is the error type of the store's root reducer.
    #[derive(Error, Debug, PartialEq, Eq)]
    pub enum StoreError<E> {
        /// The reducer rejected the action
        ///
        /// The state is unchanged and no listener was notified.
        #[error("Action rejected by reducer: {0}")]
        Reducer(E),

        /// The action could not be built (for example, from malformed input)
        /// and never reached the reducer
        ///
        /// Returned by [`Store::try_dispatch`](crate::store::Store::try_dispatch).
        #[error("Invalid action: {0}")]
        InvalidAction(E),

        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `dispatch()` is called after `shutdown()`.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// A listener dispatched while its own dispatch was still running
        ///
        /// Only returned when the store is configured with
        /// [`ReentrancyPolicy::Reject`](crate::config::ReentrancyPolicy::Reject).
        #[error("Dispatch issued while another dispatch is in progress")]
        ReentrantDispatch,

        /// The pending action queue is full
        #[error("Pending action queue is full ({0} actions)")]
        QueueOverflow(usize),
    }

    impl<E> StoreError<E> {
        /// The reducer error, if the reducer rejected the action
        #[must_use]
        pub const fn reducer_error(&self) -> Option<&E> {
            match self {
                Self::Reducer(error) => Some(error),
                _ => None,
            }
        }

        /// The domain error, whether the action was invalid or the reducer
        /// rejected it
        #[must_use]
        pub const fn action_error(&self) -> Option<&E> {
            match self {
                Self::Reducer(error) | Self::InvalidAction(error) => Some(error),
                _ => None,
            }
        }
    }
}

/// Store configuration
pub mod config {
    /// What to do with a dispatch issued from inside a listener, while the
    /// same thread's dispatch is still running.
    ///
    /// Dispatches from other threads never fall under this policy; they wait
    /// for the running dispatch to finish.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub enum ReentrancyPolicy {
        /// Queue the action and apply it once the current notification round
        /// completes. The nested `dispatch` returns `Ok(())` immediately.
        #[default]
        Queue,

        /// Fail the nested dispatch with
        /// [`StoreError::ReentrantDispatch`](crate::error::StoreError::ReentrantDispatch).
        Reject,
    }

    /// Configuration for Store instances
    ///
    /// # Example
    ///
    /// ```
    /// use statestore_runtime::config::{ReentrancyPolicy, StoreConfig};
    ///
    /// let config = StoreConfig::default()
    ///     .with_reentrancy(ReentrancyPolicy::Reject)
    ///     .with_max_pending_actions(16);
    ///
    /// assert_eq!(config.max_pending_actions, 16);
    /// ```
    #[derive(Debug, Clone)]
    pub struct StoreConfig {
        /// Handling of nested dispatches
        pub reentrancy: ReentrancyPolicy,
        /// Maximum number of queued nested dispatches
        pub max_pending_actions: usize,
    }

    impl StoreConfig {
        /// Create a new configuration with custom values
        #[must_use]
        pub const fn new(reentrancy: ReentrancyPolicy, max_pending_actions: usize) -> Self {
            Self {
                reentrancy,
                max_pending_actions,
            }
        }

        /// Set the reentrancy policy
        #[must_use]
        pub const fn with_reentrancy(mut self, reentrancy: ReentrancyPolicy) -> Self {
            self.reentrancy = reentrancy;
            self
        }

        /// Set the maximum number of queued nested dispatches
        #[must_use]
        pub const fn with_max_pending_actions(mut self, max_pending_actions: usize) -> Self {
            self.max_pending_actions = max_pending_actions;
            self
        }
    }

    impl Default for StoreConfig {
        fn default() -> Self {
            Self::new(ReentrancyPolicy::Queue, 1024)
        }
    }
}

pub use config::{ReentrancyPolicy, StoreConfig};
pub use error::StoreError;
pub use store::{Store, Unsubscribe, create_store};

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Registered listeners in subscription order.
#[derive(Default)]
struct ListenerRegistry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Dispatch bookkeeping, guarded by a single mutex so the owning thread
/// and the pending queue always change together.
///
/// `pending` only ever holds actions dispatched by `owner` from inside its
/// own listeners.
struct DispatchQueue<A> {
    owner: Option<ThreadId>,
    pending: VecDeque<A>,
}

impl<A> DispatchQueue<A> {
    /// Give up ownership and wake threads waiting to dispatch.
    fn release(&mut self, idle: &Condvar) {
        self.owner = None;
        idle.notify_all();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn read_snapshot<S>(cell: &Arc<RwLock<Arc<S>>>) -> Arc<S> {
    Arc::clone(&cell.read().unwrap_or_else(PoisonError::into_inner))
}

/// Releases dispatch ownership if a listener panics mid-dispatch, so the
/// store stays usable afterwards.
struct InProgressGuard<'a, A> {
    queue: &'a Mutex<DispatchQueue<A>>,
    idle: &'a Condvar,
    armed: bool,
}

impl<A> Drop for InProgressGuard<'_, A> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut queue = lock(self.queue);
        let dropped = queue.pending.len();
        queue.pending.clear();
        queue.release(self.idle);
        tracing::error!(dropped, "Dispatch unwound; pending actions discarded");
    }
}

/// Store module - The runtime for reducers
pub mod store {
    use super::{
        Arc, AtomicBool, Condvar, DispatchQueue, InProgressGuard, Listener, ListenerRegistry,
        Mutex, Ordering, PoisonError, ReentrancyPolicy, Reducer, RwLock, StoreConfig, StoreError,
        VecDeque, Weak, lock, read_snapshot, thread,
    };
    use crate::metrics::StoreMetrics;
    use std::fmt;
    use std::time::Instant;

    /// Create a store from a root reducer and an optional initial state.
    ///
    /// When `initial_state` is `None` the state type's `Default` is used.
    #[must_use]
    pub fn create_store<S, A, R>(reducer: R, initial_state: Option<S>) -> Store<S, A, R>
    where
        S: Default,
        R: Reducer<State = S, Action = A>,
        R::Error: fmt::Display,
    {
        Store::new(initial_state.unwrap_or_default(), reducer)
    }

    /// The Store - holds state, applies the reducer, notifies listeners
    ///
    /// Dispatch is synchronous: the reducer runs and every listener is called
    /// before `dispatch` returns. Dispatches from different threads are
    /// serialized. No lock is held while the reducer or the listeners run, so
    /// listeners may read state, subscribe, unsubscribe and dispatch again.
    ///
    /// Cloning a `Store` yields another handle to the same store.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `R`: Root reducer implementation
    pub struct Store<S, A, R>
    where
        R: Reducer<State = S, Action = A>,
    {
        inner: Arc<Inner<S, A, R>>,
    }

    struct Inner<S, A, R> {
        state: Arc<RwLock<Arc<S>>>,
        reducer: R,
        listeners: Arc<Mutex<ListenerRegistry>>,
        queue: Mutex<DispatchQueue<A>>,
        idle: Condvar,
        shutdown: AtomicBool,
        config: StoreConfig,
    }

    impl<S, A, R> Clone for Store<S, A, R>
    where
        R: Reducer<State = S, Action = A>,
    {
        fn clone(&self) -> Self {
            Self {
                inner: Arc::clone(&self.inner),
            }
        }
    }

    impl<S, A, R> fmt::Debug for Store<S, A, R>
    where
        R: Reducer<State = S, Action = A>,
        S: fmt::Debug,
    {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("Store")
                .field("state", &read_snapshot(&self.inner.state))
                .field("listeners", &lock(&self.inner.listeners).listeners.len())
                .field("shutdown", &self.inner.shutdown.load(Ordering::Acquire))
                .finish_non_exhaustive()
        }
    }

    impl<S, A, R> Store<S, A, R>
    where
        R: Reducer<State = S, Action = A>,
        R::Error: fmt::Display,
    {
        /// Create a new store with initial state and reducer
        ///
        /// Uses [`StoreConfig::default`]: nested dispatches are queued, up to
        /// 1024 at a time.
        #[must_use]
        pub fn new(initial_state: S, reducer: R) -> Self {
            Self::with_config(initial_state, reducer, StoreConfig::default())
        }

        /// Create a new store with custom configuration
        #[must_use]
        pub fn with_config(initial_state: S, reducer: R, config: StoreConfig) -> Self {
            Self {
                inner: Arc::new(Inner {
                    state: Arc::new(RwLock::new(Arc::new(initial_state))),
                    reducer,
                    listeners: Arc::new(Mutex::new(ListenerRegistry::default())),
                    queue: Mutex::new(DispatchQueue {
                        owner: None,
                        pending: VecDeque::new(),
                    }),
                    idle: Condvar::new(),
                    shutdown: AtomicBool::new(false),
                    config,
                }),
            }
        }

        /// The store configuration
        #[must_use]
        pub fn config(&self) -> &StoreConfig {
            &self.inner.config
        }

        /// Current immutable state snapshot
        ///
        /// The returned `Arc` stays valid after later dispatches replace the
        /// store's state; two snapshots are the same object exactly when no
        /// transition happened in between.
        #[must_use]
        pub fn get_state(&self) -> Arc<S> {
            read_snapshot(&self.inner.state)
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let todo_count = store.state(|s| s.todos.len());
        /// ```
        pub fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            f(&self.get_state())
        }

        /// Dispatch an action
        ///
        /// Applies the reducer to the current state, replaces the stored
        /// snapshot, then calls every listener subscribed at that moment, in
        /// subscription order.
        ///
        /// If another thread is dispatching, this call blocks until that
        /// dispatch (including its queued follow-ups) has finished, then runs.
        ///
        /// A dispatch issued by a listener, on the thread whose dispatch is
        /// running, is handled according to [`StoreConfig::reentrancy`]. Queued
        /// actions are applied in FIFO order once the running notification
        /// round finishes, each with its own notification round. Errors from
        /// queued actions are logged and otherwise dropped.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Reducer`]: the reducer rejected the action; state unchanged
        /// - [`StoreError::ShutdownInProgress`]: the store was shut down
        /// - [`StoreError::ReentrantDispatch`]: dispatch from a listener under [`ReentrancyPolicy::Reject`]
        /// - [`StoreError::QueueOverflow`]: too many nested dispatches queued
        #[tracing::instrument(skip(self, action), name = "store_dispatch")]
        pub fn dispatch(&self, action: A) -> Result<(), StoreError<R::Error>> {
            if self.is_shutdown() {
                tracing::warn!("Rejected action: store is shutting down");
                StoreMetrics::record_rejection();
                return Err(StoreError::ShutdownInProgress);
            }

            let me = thread::current().id();
            {
                let mut queue = lock(&self.inner.queue);
                loop {
                    let owner = queue.owner;
                    match owner {
                        Some(owner) if owner == me => return self.enqueue(&mut queue, action),
                        Some(_) => {
                            tracing::trace!("Waiting for another thread's dispatch");
                            queue = self
                                .inner
                                .idle
                                .wait(queue)
                                .unwrap_or_else(PoisonError::into_inner);
                        },
                        None => break,
                    }
                }
                if self.is_shutdown() {
                    tracing::warn!("Rejected action: store shut down while waiting");
                    StoreMetrics::record_rejection();
                    return Err(StoreError::ShutdownInProgress);
                }
                queue.owner = Some(me);
            }

            let mut guard = InProgressGuard {
                queue: &self.inner.queue,
                idle: &self.inner.idle,
                armed: true,
            };

            let result = self.apply(action);

            loop {
                let next = {
                    let mut queue = lock(&self.inner.queue);
                    let next = queue.pending.pop_front();
                    if next.is_none() {
                        queue.release(&self.inner.idle);
                    }
                    next
                };
                let Some(next) = next else { break };

                tracing::trace!("Applying queued action");
                if let Err(error) = self.apply(next) {
                    tracing::warn!(error = %error, "Queued action dropped");
                }
            }

            guard.armed = false;
            result
        }

        /// Dispatch an action that may have failed to build
        ///
        /// An `Err` is reported as [`StoreError::InvalidAction`] and counted
        /// as a rejected action; the store is not touched.
        ///
        /// # Errors
        ///
        /// [`StoreError::InvalidAction`] for an `Err` input, otherwise as
        /// [`dispatch`](Self::dispatch).
        pub fn try_dispatch(&self, action: Result<A, R::Error>) -> Result<(), StoreError<R::Error>> {
            match action {
                Ok(action) => self.dispatch(action),
                Err(error) => {
                    tracing::debug!(error = %error, "Invalid action");
                    StoreMetrics::record_rejection();
                    Err(StoreError::InvalidAction(error))
                },
            }
        }

        fn enqueue(
            &self,
            queue: &mut DispatchQueue<A>,
            action: A,
        ) -> Result<(), StoreError<R::Error>> {
            match self.config().reentrancy {
                ReentrancyPolicy::Reject => {
                    tracing::warn!("Rejected nested dispatch");
                    StoreMetrics::record_rejection();
                    Err(StoreError::ReentrantDispatch)
                },
                ReentrancyPolicy::Queue => {
                    let max = self.config().max_pending_actions;
                    if queue.pending.len() >= max {
                        tracing::warn!(max, "Pending action queue full");
                        StoreMetrics::record_rejection();
                        return Err(StoreError::QueueOverflow(max));
                    }
                    queue.pending.push_back(action);
                    StoreMetrics::record_queued();
                    tracing::debug!(
                        pending = queue.pending.len(),
                        "Queued action behind in-progress dispatch"
                    );
                    Ok(())
                },
            }
        }

        /// Reduce one action and notify listeners.
        fn apply(&self, action: A) -> Result<(), StoreError<R::Error>> {
            let current = self.get_state();

            let start = Instant::now();
            let next = match self.inner.reducer.reduce(&current, &action) {
                Ok(next) => next,
                Err(error) => {
                    tracing::debug!(error = %error, "Reducer rejected action");
                    StoreMetrics::record_rejection();
                    return Err(StoreError::Reducer(error));
                },
            };
            StoreMetrics::record_action(start.elapsed());

            *self
                .inner
                .state
                .write()
                .unwrap_or_else(PoisonError::into_inner) = Arc::new(next);
            tracing::debug!("Action applied");

            self.notify();
            Ok(())
        }

        fn notify(&self) {
            let snapshot: Vec<Listener> = lock(&self.inner.listeners)
                .listeners
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect();

            tracing::trace!(listeners = snapshot.len(), "Notifying listeners");
            for listener in &snapshot {
                listener();
            }
            StoreMetrics::record_notified(snapshot.len());
        }

        /// Register a listener called after every state transition
        ///
        /// Listeners take no arguments; they read the new state through
        /// [`get_state`](Self::get_state). A listener added during a
        /// notification round is first called in the next round.
        ///
        /// Dropping the returned handle does not unsubscribe.
        pub fn subscribe<F>(&self, listener: F) -> Unsubscribe
        where
            F: Fn() + Send + Sync + 'static,
        {
            let mut registry = lock(&self.inner.listeners);
            let id = registry.next_id;
            registry.next_id += 1;
            registry.listeners.push((id, Arc::new(listener)));
            tracing::trace!(listener_id = id, "Listener subscribed");

            Unsubscribe {
                registry: Arc::downgrade(&self.inner.listeners),
                id,
            }
        }

        /// Number of registered listeners
        #[must_use]
        pub fn listener_count(&self) -> usize {
            lock(&self.inner.listeners).listeners.len()
        }

        /// Connect a projection of state to a change callback
        ///
        /// `map_state` selects the data a consumer cares about. `on_change` is
        /// called once immediately with the initial projection, then after each
        /// transition whose projection differs from the previous one.
        pub fn connect<T, M, F>(&self, map_state: M, on_change: F) -> Unsubscribe
        where
            S: Send + Sync + 'static,
            T: PartialEq + Send + 'static,
            M: Fn(&S) -> T + Send + Sync + 'static,
            F: Fn(&T) + Send + Sync + 'static,
        {
            let initial = map_state(&self.get_state());
            on_change(&initial);

            let last = Mutex::new(initial);
            let state: Weak<RwLock<Arc<S>>> = Arc::downgrade(&self.inner.state);

            self.subscribe(move || {
                let Some(state) = state.upgrade() else {
                    return;
                };
                let projected = map_state(&read_snapshot(&state));

                let mut last = lock(&last);
                if *last != projected {
                    *last = projected;
                    on_change(&*last);
                }
            })
        }

        /// Whether [`shutdown`](Self::shutdown) has been called
        #[must_use]
        pub fn is_shutdown(&self) -> bool {
            self.inner.shutdown.load(Ordering::Acquire)
        }

        /// Dispose of the store
        ///
        /// Removes every listener and discards queued actions. Later
        /// dispatches fail with [`StoreError::ShutdownInProgress`]; the last
        /// state stays readable. Calling it again is a no-op.
        pub fn shutdown(&self) {
            if self.inner.shutdown.swap(true, Ordering::AcqRel) {
                return;
            }

            let removed = {
                let mut registry = lock(&self.inner.listeners);
                let removed = registry.listeners.len();
                registry.listeners.clear();
                removed
            };
            let dropped = {
                let mut queue = lock(&self.inner.queue);
                let dropped = queue.pending.len();
                queue.pending.clear();
                dropped
            };

            tracing::info!(listeners = removed, dropped_actions = dropped, "Store shut down");
        }
    }

    /// Handle returned by [`Store::subscribe`] and [`Store::connect`]
    #[must_use = "dropping the handle keeps the listener subscribed; call `unsubscribe` to remove it"]
    pub struct Unsubscribe {
        registry: Weak<Mutex<ListenerRegistry>>,
        id: u64,
    }

    impl Unsubscribe {
        /// Remove the listener
        ///
        /// Returns `false` if the listener was already gone (store shut down
        /// or dropped). A listener removed during a notification round still
        /// receives that round.
        #[allow(clippy::must_use_candidate)]
        pub fn unsubscribe(self) -> bool {
            let Some(registry) = self.registry.upgrade() else {
                return false;
            };
            let mut registry = lock(&registry);
            let before = registry.listeners.len();
            registry.listeners.retain(|(id, _)| *id != self.id);
            let removed = registry.listeners.len() != before;
            if removed {
                tracing::trace!(listener_id = self.id, "Listener unsubscribed");
            }
            removed
        }

        /// Identifier of the listener within its store
        #[must_use]
        pub const fn id(&self) -> u64 {
            self.id
        }
    }

    impl fmt::Debug for Unsubscribe {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("Unsubscribe").field("id", &self.id).finish()
        }
    }
}
