//! # Tablekeeper Runtime
//!
//! Runtime implementation for the Tablekeeper reducer architecture.
//!
//! This crate provides the Store runtime that coordinates reducer execution
//! and effect handling.
//!
//! ## Core Components
//!
//! - **Store**: The runtime that manages state and executes effects
//! - **Effect Executor**: Executes effect descriptions and feeds actions back to reducers
//! - **Timer Registry**: Owns the abort handles of cancellable effects
//!
//! ## Metrics
//!
//! The Store records through the `metrics` facade (see [`metrics`]). This crate
//! installs no recorder; recording is left to the host application, and with
//! no recorder installed every call is a no-op.
//!
//! ## Example
//!
//! ```ignore
//! use tablekeeper_runtime::Store;
//!
//! let store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething).await?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field).await;
//!
//! // Release timers and drain in-flight effects
//! store.shutdown(Duration::from_secs(1)).await?;
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tablekeeper_core::{
    effect::{Effect, EffectId},
    reducer::Reducer,
};
use tokio::sync::{RwLock, watch};
use tokio::task::AbortHandle;

/// Metric names recorded by the Store
pub mod metrics;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug)]
    pub enum StoreError {
        /// Store is shutting down and not accepting new actions
        ///
        /// This error is returned when `send()` is called after shutdown initiated.
        #[error("Store is shutting down")]
        ShutdownInProgress,

        /// Shutdown timed out waiting for effects to complete
        ///
        /// Some effects were still running when the timeout elapsed.
        #[error("Shutdown timed out with {0} effects still running")]
        ShutdownTimeout(usize),

        /// Timeout waiting for an action produced by an effect
        ///
        /// Returned by `send_and_wait_for` when the timeout expires before
        /// a matching action is received.
        #[error("Timeout waiting for action")]
        Timeout,

        /// Action broadcast channel closed
        #[error("Action broadcast channel closed")]
        ChannelClosed,
    }
}

pub use error::StoreError;

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use tablekeeper_runtime::StoreConfig;
///
/// let config = StoreConfig::default()
///     .with_broadcast_capacity(64)
///     .with_shutdown_timeout(Duration::from_secs(2));
/// assert_eq!(config.broadcast_capacity, 64);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Capacity of the channel that broadcasts effect-produced actions
    pub broadcast_capacity: usize,
    /// Default timeout for graceful shutdown
    pub default_shutdown_timeout: Duration,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(broadcast_capacity: usize, default_shutdown_timeout: Duration) -> Self {
        Self {
            broadcast_capacity,
            default_shutdown_timeout,
        }
    }

    /// Set the broadcast channel capacity
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Set the default shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.default_shutdown_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 16,
            default_shutdown_timeout: Duration::from_secs(5),
        }
    }
}

/// Handle for tracking effect completion
///
/// Returned by [`Store::send()`] to allow waiting for the effects started by
/// that action. Effects produced later by feedback actions are not included.
///
/// # Example
///
/// ```ignore
/// let mut handle = store.send(Action::Start).await?;
/// handle.wait_with_timeout(Duration::from_secs(5)).await?;
/// // All effects from Action::Start are now complete
/// ```
#[derive(Clone)]
pub struct EffectHandle {
    effects: Arc<AtomicUsize>,
    completion: watch::Receiver<()>,
}

impl EffectHandle {
    /// Create a new effect handle and its internal tracking context
    fn new() -> (Self, EffectTracking) {
        let counter = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = watch::channel(());

        let handle = Self {
            effects: Arc::clone(&counter),
            completion: rx,
        };

        let tracking = EffectTracking {
            counter,
            notifier: tx,
        };

        (handle, tracking)
    }

    /// Create a handle that's already complete
    #[must_use]
    pub fn completed() -> Self {
        let (tx, rx) = watch::channel(());
        let _ = tx.send(());

        Self {
            effects: Arc::new(AtomicUsize::new(0)),
            completion: rx,
        }
    }

    /// Number of effects still running
    #[must_use]
    pub fn pending(&self) -> usize {
        self.effects.load(Ordering::SeqCst)
    }

    /// Wait for all effects to complete
    ///
    /// Aborted effects count as complete.
    pub async fn wait(&mut self) {
        while self.effects.load(Ordering::SeqCst) > 0 {
            if self.completion.changed().await.is_err() {
                // Every tracker is gone, so nothing can still be running
                break;
            }
        }
    }

    /// Wait for all effects to complete with a timeout
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Timeout`] if the timeout expires before all
    /// effects complete.
    pub async fn wait_with_timeout(&mut self, timeout: Duration) -> Result<(), StoreError> {
        tokio::time::timeout(timeout, self.wait())
            .await
            .map_err(|_| StoreError::Timeout)
    }
}

impl std::fmt::Debug for EffectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectHandle")
            .field("pending_effects", &self.effects.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

/// Internal: Effect tracking context passed through effect execution
#[derive(Clone)]
struct EffectTracking {
    counter: Arc<AtomicUsize>,
    notifier: watch::Sender<()>,
}

impl EffectTracking {
    /// Increment the effect counter (effect started)
    fn increment(&self) {
        self.counter.fetch_add(1, Ordering::SeqCst);
    }

    /// Decrement the effect counter (effect completed)
    fn decrement(&self) {
        if self.counter.fetch_sub(1, Ordering::SeqCst) == 1 {
            let _ = self.notifier.send(());
        }
    }
}

/// Internal: RAII guard that decrements effect counter on drop
///
/// Runs on normal completion, on panic and when the task is aborted.
struct DecrementGuard(EffectTracking);

impl Drop for DecrementGuard {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Guard that decrements an atomic counter on drop (for shutdown tracking)
struct AtomicCounterGuard(Arc<AtomicUsize>);

impl Drop for AtomicCounterGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// A live registration of cancellable work
struct Registration {
    token: u64,
    abort: AbortHandle,
}

/// Abort handles of cancellable effects, keyed by [`EffectId`]
///
/// Each registration gets a fresh token so that a task finishing on its own
/// only removes its own entry, never a newer one registered under the same id.
#[derive(Default)]
struct TimerRegistry {
    next_token: AtomicU64,
    entries: Mutex<HashMap<EffectId, Registration>>,
}

impl TimerRegistry {
    fn entries(&self) -> MutexGuard<'_, HashMap<EffectId, Registration>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_token(&self) -> u64 {
        self.next_token.fetch_add(1, Ordering::Relaxed)
    }

    /// Remove the entry for `id` if it still belongs to `token`
    fn release(&self, id: EffectId, token: u64) {
        let mut entries = self.entries();
        if entries.get(&id).is_some_and(|r| r.token == token) {
            entries.remove(&id);
        }
    }

    /// Abort and remove the work registered under `id`
    fn cancel(&self, id: EffectId) -> bool {
        let removed = self.entries().remove(&id);
        removed.is_some_and(|registration| {
            registration.abort.abort();
            true
        })
    }

    /// Abort and remove every registration
    fn cancel_all(&self) -> usize {
        let drained: Vec<_> = self.entries().drain().collect();
        for (_, registration) in &drained {
            registration.abort.abort();
        }
        drained.len()
    }

    fn len(&self) -> usize {
        self.entries().len()
    }

    fn contains(&self, id: EffectId) -> bool {
        self.entries().contains_key(&id)
    }
}

/// Store module - The runtime for reducers
pub mod store {
    use super::{
        Arc, AtomicBool, AtomicCounterGuard, AtomicUsize, DecrementGuard, Duration, Effect,
        EffectHandle, EffectId, EffectTracking, Ordering, Reducer, Registration, RwLock,
        StoreConfig, StoreError, TimerRegistry,
    };
    use crate::metrics::{
        STORE_COMMANDS_TOTAL, STORE_EFFECTS_EXECUTED, STORE_REDUCER_DURATION,
        STORE_SHUTDOWN_COMPLETED, STORE_SHUTDOWN_INITIATED, STORE_SHUTDOWN_REJECTED,
        STORE_SHUTDOWN_TIMEOUT, STORE_TIMERS_CANCELLED,
    };
    use futures::future::{BoxFuture, join_all};
    use tokio::sync::broadcast;
    use tokio::task::JoinHandle;

    /// The Store - runtime coordinator for a reducer
    ///
    /// The Store manages:
    /// 1. State (behind `RwLock`, written only while the reducer runs)
    /// 2. Reducer (business logic)
    /// 3. Environment (injected dependencies)
    /// 4. Effect execution (with feedback loop)
    /// 5. Cancellable timers (aborted on replacement, `Effect::Cancel` or shutdown)
    ///
    /// Actions are reduced one at a time in the order `send` acquires the
    /// state lock, so each action applies atomically before the next.
    ///
    /// # Type Parameters
    ///
    /// - `S`: State type
    /// - `A`: Action type
    /// - `E`: Environment type
    /// - `R`: Reducer implementation
    pub struct Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E>,
    {
        state: Arc<RwLock<S>>,
        reducer: R,
        environment: E,
        config: StoreConfig,
        shutdown: Arc<AtomicBool>,
        pending_effects: Arc<AtomicUsize>,
        timers: Arc<TimerRegistry>,
        /// Actions produced by effects, broadcast to observers before they
        /// are fed back into the reducer.
        action_broadcast: broadcast::Sender<A>,
    }

    impl<S, A, E, R> Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone + Send + Sync + 'static,
        A: Clone + Send + Sync + 'static,
        S: Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
    {
        /// Create a new store with initial state, reducer, and environment
        #[must_use]
        pub fn new(initial_state: S, reducer: R, environment: E) -> Self {
            Self::with_config(initial_state, reducer, environment, StoreConfig::default())
        }

        /// Create a new Store with custom configuration
        #[must_use]
        pub fn with_config(initial_state: S, reducer: R, environment: E, config: StoreConfig) -> Self {
            let (action_broadcast, _) = broadcast::channel(config.broadcast_capacity.max(1));

            Self {
                state: Arc::new(RwLock::new(initial_state)),
                reducer,
                environment,
                config,
                shutdown: Arc::new(AtomicBool::new(false)),
                pending_effects: Arc::new(AtomicUsize::new(0)),
                timers: Arc::new(TimerRegistry::default()),
                action_broadcast,
            }
        }

        /// The configuration this store was built with
        #[must_use]
        pub const fn config(&self) -> &StoreConfig {
            &self.config
        }

        /// Number of cancellable effects currently registered
        #[must_use]
        pub fn active_timers(&self) -> usize {
            self.timers.len()
        }

        /// Whether work is currently registered under `id`
        #[must_use]
        pub fn has_timer(&self, id: EffectId) -> bool {
            self.timers.contains(id)
        }

        /// Whether `shutdown` has been called
        #[must_use]
        pub fn is_shutting_down(&self) -> bool {
            self.shutdown.load(Ordering::Acquire)
        }

        /// Gracefully shut down the store
        ///
        /// 1. Stops accepting new actions
        /// 2. Aborts every registered cancellable effect (timers never fire after this)
        /// 3. Waits for the remaining in-flight effects, up to `timeout`
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownTimeout`] if the timeout expires before all
        /// pending effects complete.
        pub async fn shutdown(&self, timeout: Duration) -> Result<(), StoreError> {
            tracing::info!("Initiating graceful shutdown");
            metrics::counter!(STORE_SHUTDOWN_INITIATED).increment(1);

            self.shutdown.store(true, Ordering::Release);

            let cancelled = self.timers.cancel_all();
            if cancelled > 0 {
                tracing::debug!(cancelled, "Released registered timers");
                metrics::counter!(STORE_TIMERS_CANCELLED)
                    .increment(u64::try_from(cancelled).unwrap_or(u64::MAX));
            }

            let start = std::time::Instant::now();
            let poll_interval = Duration::from_millis(10);

            loop {
                let pending = self.pending_effects.load(Ordering::Acquire);

                if pending == 0 {
                    tracing::info!("All effects completed, shutdown successful");
                    metrics::counter!(STORE_SHUTDOWN_COMPLETED).increment(1);
                    return Ok(());
                }

                if start.elapsed() >= timeout {
                    tracing::error!(
                        pending_effects = pending,
                        "Shutdown timeout: {} effects still running", pending
                    );
                    metrics::counter!(STORE_SHUTDOWN_TIMEOUT).increment(1);
                    return Err(StoreError::ShutdownTimeout(pending));
                }

                tracing::debug!(
                    pending_effects = pending,
                    elapsed_ms = start.elapsed().as_millis(),
                    "Waiting for effects to complete"
                );

                tokio::time::sleep(poll_interval).await;
            }
        }

        /// Send an action to the store
        ///
        /// 1. Acquires write lock on state
        /// 2. Calls reducer with (state, action, environment)
        /// 3. Releases the lock and starts the returned effects
        ///
        /// `Effect::Cancel` and the registration part of `Effect::Cancellable`
        /// take effect before `send` returns; everything else runs in spawned
        /// tasks and may still be running afterwards.
        ///
        /// # Errors
        ///
        /// Returns [`StoreError::ShutdownInProgress`] if the store is shutting down.
        #[tracing::instrument(skip(self, action), name = "store_send")]
        pub async fn send(&self, action: A) -> Result<EffectHandle, StoreError> {
            if self.shutdown.load(Ordering::Acquire) {
                tracing::warn!("Rejected action: store is shutting down");
                metrics::counter!(STORE_SHUTDOWN_REJECTED).increment(1);
                return Err(StoreError::ShutdownInProgress);
            }

            tracing::debug!("Processing action");
            metrics::counter!(STORE_COMMANDS_TOTAL).increment(1);

            let (handle, tracking) = EffectHandle::new();

            let effects = {
                let mut state = self.state.write().await;

                let span = tracing::debug_span!("reducer_execution");
                let _enter = span.enter();

                let start = std::time::Instant::now();
                let effects = self.reducer.reduce(&mut *state, action, &self.environment);
                metrics::histogram!(STORE_REDUCER_DURATION).record(start.elapsed().as_secs_f64());

                tracing::trace!("Reducer completed, returned {} effects", effects.len());
                effects
            };

            for effect in effects {
                self.execute_effect(effect, &tracking);
            }

            Ok(handle)
        }

        /// Send an action and wait for a matching action produced by an effect
        ///
        /// Subscribes before sending, so a fast effect cannot be missed.
        ///
        /// # Errors
        ///
        /// - [`StoreError::Timeout`]: Timeout expired before matching action received
        /// - [`StoreError::ChannelClosed`]: Action broadcast channel closed
        /// - [`StoreError::ShutdownInProgress`]: Store is shutting down
        pub async fn send_and_wait_for<F>(
            &self,
            action: A,
            predicate: F,
            timeout: Duration,
        ) -> Result<A, StoreError>
        where
            F: Fn(&A) -> bool,
        {
            let mut rx = self.action_broadcast.subscribe();

            self.send(action).await?;

            tokio::time::timeout(timeout, async {
                loop {
                    match rx.recv().await {
                        Ok(action) if predicate(&action) => return Ok(action),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "Action observer lagged, {} actions skipped", skipped);
                        },
                        Err(broadcast::error::RecvError::Closed) => {
                            return Err(StoreError::ChannelClosed);
                        },
                    }
                }
            })
            .await
            .map_err(|_| StoreError::Timeout)?
        }

        /// Subscribe to actions produced by effects
        ///
        /// Every action an effect feeds back (a timer firing, an async result)
        /// is cloned to subscribers before it is reduced.
        #[must_use]
        pub fn subscribe_actions(&self) -> broadcast::Receiver<A> {
            self.action_broadcast.subscribe()
        }

        /// Read current state via a closure
        ///
        /// ```ignore
        /// let seats = store.state(|s| s.book.seats_left).await;
        /// ```
        pub async fn state<F, T>(&self, f: F) -> T
        where
            F: FnOnce(&S) -> T,
        {
            let state = self.state.read().await;
            f(&*state)
        }

        /// Start one effect returned by the reducer
        #[tracing::instrument(skip(self, effect, tracking), name = "execute_effect")]
        fn execute_effect(&self, effect: Effect<A>, tracking: &EffectTracking) {
            match effect {
                Effect::None => {
                    tracing::trace!("Executing Effect::None (no-op)");
                    metrics::counter!(STORE_EFFECTS_EXECUTED, "type" => "none").increment(1);
                },
                Effect::Cancel(id) => {
                    self.cancel(id);
                },
                Effect::Cancellable { id, effect } => {
                    let _ = self.register(id, *effect, Some(tracking.clone()));
                },
                effect => {
                    let _ = self.spawn_tracked(self.drive(effect), Some(tracking.clone()));
                },
            }
        }

        /// Spawn `work`, counting it against `tracking` and the shutdown counter
        fn spawn_tracked(
            &self,
            work: BoxFuture<'static, ()>,
            tracking: Option<EffectTracking>,
        ) -> JoinHandle<()> {
            if let Some(tracking) = &tracking {
                tracking.increment();
            }
            self.pending_effects.fetch_add(1, Ordering::SeqCst);
            let pending_guard = AtomicCounterGuard(Arc::clone(&self.pending_effects));

            tokio::spawn(async move {
                let _guard = tracking.map(DecrementGuard);
                let _pending_guard = pending_guard;
                work.await;
            })
        }

        /// Register `effect` under `id`, aborting whatever held that id
        ///
        /// The registry lock is held while spawning, so the new task cannot
        /// release its entry before the entry exists.
        fn register(
            &self,
            id: EffectId,
            effect: Effect<A>,
            tracking: Option<EffectTracking>,
        ) -> JoinHandle<()> {
            metrics::counter!(STORE_EFFECTS_EXECUTED, "type" => "cancellable").increment(1);

            let timers = Arc::clone(&self.timers);
            let token = timers.next_token();
            let work = self.drive(effect);

            let mut entries = self.timers.entries();
            if let Some(previous) = entries.remove(&id) {
                tracing::trace!(%id, "Replacing registered effect");
                previous.abort.abort();
                metrics::counter!(STORE_TIMERS_CANCELLED).increment(1);
            }

            let join = self.spawn_tracked(
                Box::pin(async move {
                    work.await;
                    timers.release(id, token);
                }),
                tracking,
            );
            entries.insert(
                id,
                Registration {
                    token,
                    abort: join.abort_handle(),
                },
            );
            join
        }

        fn cancel(&self, id: EffectId) {
            if self.timers.cancel(id) {
                tracing::trace!(%id, "Cancelled registered effect");
                metrics::counter!(STORE_TIMERS_CANCELLED).increment(1);
            } else {
                tracing::trace!(%id, "Cancel requested for unregistered effect");
            }
        }

        /// Build the future that runs `effect` to completion
        ///
        /// Feedback actions are broadcast, then sent back through the store.
        fn drive(&self, effect: Effect<A>) -> BoxFuture<'static, ()> {
            let store = self.clone();
            Box::pin(async move {
                match effect {
                    Effect::None => {},
                    Effect::Future(fut) => {
                        tracing::trace!("Executing Effect::Future");
                        metrics::counter!(STORE_EFFECTS_EXECUTED, "type" => "future").increment(1);
                        if let Some(action) = fut.await {
                            store.feed_back(action).await;
                        }
                    },
                    Effect::Delay { duration, action } => {
                        tracing::trace!("Executing Effect::Delay (duration: {:?})", duration);
                        metrics::counter!(STORE_EFFECTS_EXECUTED, "type" => "delay").increment(1);
                        tokio::time::sleep(duration).await;
                        store.feed_back(*action).await;
                    },
                    Effect::Parallel(effects) => {
                        tracing::trace!("Executing Effect::Parallel with {} effects", effects.len());
                        metrics::counter!(STORE_EFFECTS_EXECUTED, "type" => "parallel").increment(1);
                        join_all(effects.into_iter().map(|effect| store.drive(effect))).await;
                    },
                    Effect::Sequential(effects) => {
                        tracing::trace!("Executing Effect::Sequential with {} effects", effects.len());
                        metrics::counter!(STORE_EFFECTS_EXECUTED, "type" => "sequential").increment(1);
                        for effect in effects {
                            store.drive(effect).await;
                        }
                    },
                    Effect::Cancellable { id, effect } => {
                        // Aborted work resolves as a cancelled JoinError, which is fine here
                        let _ = store.register(id, *effect, None).await;
                    },
                    Effect::Cancel(id) => store.cancel(id),
                }
            })
        }

        async fn feed_back(&self, action: A) {
            let _ = self.action_broadcast.send(action.clone());
            if let Err(error) = self.send(action).await {
                tracing::debug!(%error, "Dropped effect feedback");
            }
        }
    }

    impl<S, A, E, R> Clone for Store<S, A, E, R>
    where
        R: Reducer<State = S, Action = A, Environment = E> + Clone,
        E: Clone,
    {
        fn clone(&self) -> Self {
            Self {
                state: Arc::clone(&self.state),
                reducer: self.reducer.clone(),
                environment: self.environment.clone(),
                config: self.config.clone(),
                shutdown: Arc::clone(&self.shutdown),
                pending_effects: Arc::clone(&self.pending_effects),
                timers: Arc::clone(&self.timers),
                action_broadcast: self.action_broadcast.clone(),
            }
        }
    }
}

// Re-export for convenience
pub use store::Store;

#[cfg(test)]
mod tests {
    use super::*;
    use tablekeeper_core::{smallvec, SmallVec};

    #[derive(Debug, Clone)]
    struct TestState {
        value: i32,
    }

    #[derive(Debug, Clone, PartialEq)]
    enum TestAction {
        Increment,
        Decrement,
        NoOp,
        ProduceEffect,
        ProduceDelayedAction,
        ProduceParallelEffects,
        ProduceSequentialEffects,
        StartTimer,
        StopTimer,
    }

    const TIMER: EffectId = EffectId::new("timer");

    #[derive(Debug, Clone)]
    struct TestEnv;

    #[derive(Debug, Clone)]
    struct TestReducer;

    impl Reducer for TestReducer {
        type State = TestState;
        type Action = TestAction;
        type Environment = TestEnv;

        fn reduce(
            &self,
            state: &mut Self::State,
            action: Self::Action,
            _env: &Self::Environment,
        ) -> SmallVec<[Effect<Self::Action>; 4]> {
            match action {
                TestAction::Increment => {
                    state.value += 1;
                    smallvec![Effect::None]
                },
                TestAction::Decrement => {
                    state.value -= 1;
                    smallvec![Effect::None]
                },
                TestAction::NoOp => smallvec![Effect::None],
                TestAction::ProduceEffect => {
                    smallvec![Effect::Future(Box::pin(async { Some(TestAction::Increment) }))]
                },
                TestAction::ProduceDelayedAction => smallvec![Effect::Delay {
                    duration: Duration::from_millis(10),
                    action: Box::new(TestAction::Increment),
                }],
                TestAction::ProduceParallelEffects => smallvec![Effect::Parallel(vec![
                    Effect::Future(Box::pin(async { Some(TestAction::Increment) })),
                    Effect::Future(Box::pin(async { Some(TestAction::Increment) })),
                    Effect::Future(Box::pin(async { Some(TestAction::Increment) })),
                ])],
                TestAction::ProduceSequentialEffects => smallvec![Effect::Sequential(vec![
                    Effect::Future(Box::pin(async { Some(TestAction::Increment) })),
                    Effect::Future(Box::pin(async { Some(TestAction::Increment) })),
                    Effect::Future(Box::pin(async { Some(TestAction::Decrement) })),
                ])],
                TestAction::StartTimer => smallvec![Effect::Delay {
                    duration: Duration::from_millis(40),
                    action: Box::new(TestAction::Increment),
                }
                .cancellable(TIMER)],
                TestAction::StopTimer => smallvec![Effect::Cancel(TIMER)],
            }
        }
    }

    fn store() -> Store<TestState, TestAction, TestEnv, TestReducer> {
        Store::new(TestState { value: 0 }, TestReducer, TestEnv)
    }

    #[tokio::test]
    async fn test_send_action() {
        let store = store();

        let _ = store.send(TestAction::Increment).await;
        let _ = store.send(TestAction::Increment).await;
        let _ = store.send(TestAction::Decrement).await;
        let _ = store.send(TestAction::NoOp).await;

        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_effect_future() -> Result<(), StoreError> {
        let store = store();

        let mut handle = store.send(TestAction::ProduceEffect).await?;
        handle.wait_with_timeout(Duration::from_secs(1)).await?;

        assert_eq!(store.state(|s| s.value).await, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_effect_delay() {
        let store = store();

        let _ = store.send(TestAction::ProduceDelayedAction).await;
        assert_eq!(store.state(|s| s.value).await, 0);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(store.state(|s| s.value).await, 1);
    }

    #[tokio::test]
    async fn test_effect_parallel_and_sequential() -> Result<(), StoreError> {
        let store = store();

        let mut handle = store.send(TestAction::ProduceParallelEffects).await?;
        handle.wait_with_timeout(Duration::from_secs(1)).await?;
        assert_eq!(store.state(|s| s.value).await, 3);

        let mut handle = store.send(TestAction::ProduceSequentialEffects).await?;
        handle.wait_with_timeout(Duration::from_secs(1)).await?;
        // +1 +1 -1
        assert_eq!(store.state(|s| s.value).await, 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_cancellable_restarts_on_reregister() {
        let store = store();

        let _ = store.send(TestAction::StartTimer).await;
        tokio::time::sleep(Duration::from_millis(25)).await;
        let _ = store.send(TestAction::StartTimer).await;
        assert_eq!(store.active_timers(), 1);

        // First timer would have fired by now
        tokio::time::sleep(Duration::from_millis(25)).await;
        assert_eq!(store.state(|s| s.value).await, 0);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(store.state(|s| s.value).await, 1);
        assert_eq!(store.active_timers(), 0);
    }

    #[tokio::test]
    async fn test_cancel_stops_timer() {
        let store = store();

        let _ = store.send(TestAction::StartTimer).await;
        assert!(store.has_timer(TIMER));
        let _ = store.send(TestAction::StopTimer).await;
        assert!(!store.has_timer(TIMER));

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(store.state(|s| s.value).await, 0);
    }

    #[tokio::test]
    async fn test_cancel_unknown_id_is_noop() -> Result<(), StoreError> {
        let store = store();

        store.send(TestAction::StopTimer).await?;
        assert_eq!(store.active_timers(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_handle_completes_when_timer_cancelled() -> Result<(), StoreError> {
        let store = store();

        let mut handle = store.send(TestAction::StartTimer).await?;
        assert_eq!(handle.pending(), 1);
        store.send(TestAction::StopTimer).await?;

        handle.wait_with_timeout(Duration::from_millis(500)).await?;
        assert_eq!(store.state(|s| s.value).await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_shutdown_releases_timers_and_rejects_actions() -> Result<(), StoreError> {
        let store = store();

        store.send(TestAction::StartTimer).await?;
        store.shutdown(Duration::from_secs(1)).await?;

        assert_eq!(store.active_timers(), 0);
        assert!(store.is_shutting_down());
        assert!(matches!(
            store.send(TestAction::Increment).await,
            Err(StoreError::ShutdownInProgress)
        ));

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(store.state(|s| s.value).await, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_send_and_wait_for_feedback() -> Result<(), StoreError> {
        let store = store();

        let action = store
            .send_and_wait_for(
                TestAction::ProduceDelayedAction,
                |a| matches!(a, TestAction::Increment),
                Duration::from_secs(1),
            )
            .await?;

        assert_eq!(action, TestAction::Increment);
        Ok(())
    }

    #[tokio::test]
    async fn test_send_and_wait_for_times_out() {
        let store = store();

        let result = store
            .send_and_wait_for(TestAction::NoOp, |_| true, Duration::from_millis(20))
            .await;

        assert!(matches!(result, Err(StoreError::Timeout)));
    }

    #[tokio::test]
    async fn test_store_clone_shares_state() {
        let store1 = store();
        let store2 = store1.clone();

        let _ = store1.send(TestAction::Increment).await;
        assert_eq!(store2.state(|s| s.value).await, 1);
    }

    #[test]
    fn test_completed_handle_has_nothing_pending() {
        assert_eq!(EffectHandle::completed().pending(), 0);
    }
}
