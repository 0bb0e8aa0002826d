//! Integration tests for action broadcasting and registered timers
//!
//! Observers see every action an effect feeds back. These tests use that to
//! watch timers fire, restart and disappear.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use std::time::Duration;
use tablekeeper_core::{effect::Effect, effect::EffectId, reducer::Reducer, smallvec, SmallVec};
use tablekeeper_runtime::{Store, StoreConfig, StoreError};

// ============================================================================
// Test Fixtures
// ============================================================================

const PING: EffectId = EffectId::new("test.ping");
const PONG: EffectId = EffectId::new("test.pong");

#[derive(Debug, Clone, PartialEq)]
enum TestAction {
    /// Arm the ping timer with a tag
    ArmPing { tag: u32, after_ms: u64 },
    /// Arm both timers at once
    ArmBoth,
    /// Cancel the ping timer
    Disarm,
    /// Three delays in a row
    Countdown,
    /// Work that outlives any reasonable shutdown timeout
    Stall,
    /// Timer output
    Fired { tag: u32 },
    /// Plain command
    Increment,
}

#[derive(Debug, Clone, Default)]
struct TestState {
    counter: u32,
    fired: Vec<u32>,
}

#[derive(Clone)]
struct TestEnvironment;

#[derive(Clone)]
struct TestReducer;

fn ping(tag: u32, after_ms: u64) -> Effect<TestAction> {
    Effect::Delay {
        duration: Duration::from_millis(after_ms),
        action: Box::new(TestAction::Fired { tag }),
    }
    .cancellable(PING)
}

impl Reducer for TestReducer {
    type State = TestState;
    type Action = TestAction;
    type Environment = TestEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            TestAction::ArmPing { tag, after_ms } => smallvec![ping(tag, after_ms)],
            TestAction::ArmBoth => smallvec![Effect::merge(vec![
                ping(1, 20),
                Effect::Delay {
                    duration: Duration::from_millis(20),
                    action: Box::new(TestAction::Fired { tag: 2 }),
                }
                .cancellable(PONG),
            ])],
            TestAction::Disarm => smallvec![Effect::Cancel(PING)],
            TestAction::Countdown => smallvec![Effect::chain(
                (1..=3)
                    .map(|tag| Effect::Delay {
                        duration: Duration::from_millis(5),
                        action: Box::new(TestAction::Fired { tag }),
                    })
                    .collect()
            )],
            TestAction::Stall => smallvec![Effect::Future(Box::pin(async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                None
            }))],
            TestAction::Fired { tag } => {
                state.fired.push(tag);
                SmallVec::new()
            }
            TestAction::Increment => {
                state.counter += 1;
                SmallVec::new()
            }
        }
    }
}

fn create_store() -> Store<TestState, TestAction, TestEnvironment, TestReducer> {
    Store::new(TestState::default(), TestReducer, TestEnvironment)
}

// ============================================================================
// Tests
// ============================================================================

/// Observers receive the action a timer feeds back
#[tokio::test]
async fn test_send_and_wait_for_timer() {
    let store = create_store();

    let result = store
        .send_and_wait_for(
            TestAction::ArmPing { tag: 7, after_ms: 10 },
            |action| matches!(action, TestAction::Fired { .. }),
            Duration::from_secs(1),
        )
        .await;

    assert_eq!(result.unwrap(), TestAction::Fired { tag: 7 });
}

/// Re-arming replaces the pending timer, so only the last tag fires
#[tokio::test]
async fn test_rearm_fires_once() {
    let store = create_store();
    let mut actions = store.subscribe_actions();

    for tag in 1..=5 {
        store
            .send(TestAction::ArmPing { tag, after_ms: 30 })
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let fired = tokio::time::timeout(Duration::from_secs(1), actions.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fired, TestAction::Fired { tag: 5 });

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(store.state(|s| s.fired.clone()).await, vec![5]);
    assert_eq!(store.active_timers(), 0);
}

/// A cancelled timer never reaches observers
#[tokio::test]
async fn test_disarm_before_fire() {
    let store = create_store();
    let mut actions = store.subscribe_actions();

    store
        .send(TestAction::ArmPing { tag: 1, after_ms: 20 })
        .await
        .unwrap();
    store.send(TestAction::Disarm).await.unwrap();

    let result = tokio::time::timeout(Duration::from_millis(80), actions.recv()).await;
    assert!(result.is_err(), "cancelled timer should not fire");
    assert!(store.state(|s| s.fired.is_empty()).await);
}

/// Timers registered inside `Parallel` are tracked by id
#[tokio::test]
async fn test_parallel_registration() {
    let store = create_store();
    let mut actions = store.subscribe_actions();

    store.send(TestAction::ArmBoth).await.unwrap();
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert!(store.has_timer(PING));
    assert!(store.has_timer(PONG));

    // Cancelling one leaves the other running
    store.send(TestAction::Disarm).await.unwrap();

    let fired = tokio::time::timeout(Duration::from_secs(1), actions.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fired, TestAction::Fired { tag: 2 });
}

/// Sequential delays are broadcast in order
#[tokio::test]
async fn test_sequential_broadcast_order() {
    let store = create_store();
    let mut actions = store.subscribe_actions();

    store.send(TestAction::Countdown).await.unwrap();

    let mut seen = Vec::new();
    for _ in 0..3 {
        let action = tokio::time::timeout(Duration::from_secs(1), actions.recv())
            .await
            .unwrap()
            .unwrap();
        seen.push(action);
    }

    assert_eq!(
        seen,
        vec![
            TestAction::Fired { tag: 1 },
            TestAction::Fired { tag: 2 },
            TestAction::Fired { tag: 3 },
        ]
    );
}

/// Every subscriber gets its own copy
#[tokio::test]
async fn test_multiple_subscribers() {
    let store = create_store();
    let mut first = store.subscribe_actions();
    let mut second = store.subscribe_actions();

    store
        .send(TestAction::ArmPing { tag: 3, after_ms: 5 })
        .await
        .unwrap();

    for rx in [&mut first, &mut second] {
        let action = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(action, TestAction::Fired { tag: 3 });
    }
}

/// Actions sent directly are reduced but not broadcast
#[tokio::test]
async fn test_sent_actions_not_broadcast() {
    let store = create_store();
    let mut actions = store.subscribe_actions();

    store.send(TestAction::Increment).await.unwrap();

    let result = tokio::time::timeout(Duration::from_millis(50), actions.recv()).await;
    assert!(result.is_err());
    assert_eq!(store.state(|s| s.counter).await, 1);
}

/// A small buffer makes slow observers lag instead of blocking the store
#[tokio::test]
async fn test_lagging_subscriber() {
    let store = Store::with_config(
        TestState::default(),
        TestReducer,
        TestEnvironment,
        StoreConfig::default().with_broadcast_capacity(1),
    );
    let mut actions = store.subscribe_actions();

    store.send(TestAction::Countdown).await.unwrap();
    tokio::time::sleep(Duration::from_millis(80)).await;

    assert_eq!(store.state(|s| s.fired.len()).await, 3);
    assert!(matches!(
        actions.recv().await,
        Err(tokio::sync::broadcast::error::RecvError::Lagged(_))
    ));
}

/// Shutdown reports effects that outlive the timeout
#[tokio::test]
async fn test_shutdown_timeout_with_running_effect() {
    let store = create_store();
    store.send(TestAction::Stall).await.unwrap();
    store
        .send(TestAction::ArmPing { tag: 1, after_ms: 10_000 })
        .await
        .unwrap();

    let result = store.shutdown(Duration::from_millis(50)).await;

    assert!(matches!(result, Err(StoreError::ShutdownTimeout(1))));
    assert_eq!(store.active_timers(), 0);
}
