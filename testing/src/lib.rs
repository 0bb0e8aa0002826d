//! # Tablekeeper Testing
//!
//! Testing utilities and helpers for the Tablekeeper reducer architecture.
//!
//! This crate provides:
//! - Deterministic [`Clock`] implementations
//! - [`ReducerTest`], a Given-When-Then builder for reducers
//! - Assertion helpers for returned effects
//!
//! ## Example
//!
//! ```ignore
//! use tablekeeper_testing::{test_clock, ReducerTest};
//!
//! ReducerTest::new(BannerReducer)
//!     .with_env(BannerEnvironment::new(Arc::new(test_clock())))
//!     .given_state(BannerState::default())
//!     .when_action(BannerAction::Show("Saved".into()))
//!     .then_state(|state| assert_eq!(state.message.as_deref(), Some("Saved")))
//!     .then_effects(|effects| assertions::assert_has_cancellable_effect(effects, BANNER))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use tablekeeper_core::environment::Clock;


/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};
    use std::sync::atomic::{AtomicI32, Ordering};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use tablekeeper_testing::mocks::FixedClock;
    /// use tablekeeper_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Clock that moves forward by a fixed step on every read
    ///
    /// The first call returns `start`, the next `start + step`, and so on.
    /// Useful when a test needs two timestamps to differ.
    ///
    /// ```
    /// use chrono::Duration;
    /// use tablekeeper_core::environment::Clock;
    /// use tablekeeper_testing::mocks::{test_clock, SteppingClock};
    ///
    /// let clock = SteppingClock::new(test_clock().now(), Duration::minutes(5));
    /// let first = clock.now();
    /// assert_eq!(clock.now() - first, Duration::minutes(5));
    /// ```
    #[derive(Debug)]
    pub struct SteppingClock {
        start: DateTime<Utc>,
        step: chrono::Duration,
        reads: AtomicI32,
    }

    impl SteppingClock {
        /// Create a clock starting at `start` that advances `step` per read
        #[must_use]
        pub const fn new(start: DateTime<Utc>, step: chrono::Duration) -> Self {
            Self {
                start,
                step,
                reads: AtomicI32::new(0),
            }
        }
    }

    impl Clock for SteppingClock {
        fn now(&self) -> DateTime<Utc> {
            let n = self.reads.fetch_add(1, Ordering::SeqCst);
            self.start + self.step * n
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::seconds(1_735_689_600))
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, SteppingClock, test_clock};
pub use reducer_test::{ReducerTest, assertions};
