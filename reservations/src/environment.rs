//! Injected dependencies of the reservation reducer.

use crate::types::{CLOCK_TICK, NOTIFICATION_TTL, ReservationId};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tablekeeper_core::environment::{Clock, SystemClock};
use uuid::Uuid;

/// Source of fresh reservation ids
pub trait IdGenerator: Send + Sync {
    /// Returns an id never handed out before
    fn next_id(&self) -> ReservationId;
}

/// Random v4 UUIDs
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> ReservationId {
        ReservationId::new()
    }
}

/// Predictable ids `…0001`, `…0002`, … for tests and demos
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    /// Starts counting at 1
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> ReservationId {
        let n = self.next.fetch_add(1, Ordering::SeqCst);
        ReservationId::from_uuid(Uuid::from_u128(u128::from(n)))
    }
}

/// Environment dependencies for the reservation reducer
#[derive(Clone)]
pub struct ReservationEnvironment {
    /// Clock for check-in, check-out and the clock display
    pub clock: Arc<dyn Clock>,
    /// Id source for new reservations
    pub ids: Arc<dyn IdGenerator>,
    /// Display time of a notification
    pub notification_ttl: Duration,
    /// Clock display refresh period
    pub clock_tick: Duration,
}

impl ReservationEnvironment {
    /// Creates an environment with the standard timings
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            clock,
            ids,
            notification_ttl: NOTIFICATION_TTL,
            clock_tick: CLOCK_TICK,
        }
    }

    /// Wall clock and random ids
    #[must_use]
    pub fn production() -> Self {
        Self::new(Arc::new(SystemClock), Arc::new(RandomIds))
    }

    /// Overrides the notification lifetime and clock period
    #[must_use]
    pub const fn with_timings(mut self, notification_ttl: Duration, clock_tick: Duration) -> Self {
        self.notification_ttl = notification_ttl;
        self.clock_tick = clock_tick;
        self
    }
}

impl std::fmt::Debug for ReservationEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReservationEnvironment")
            .field("notification_ttl", &self.notification_ttl)
            .field("clock_tick", &self.clock_tick)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_count_up() {
        let ids = SequentialIds::new();
        let first = ids.next_id();
        let second = ids.next_id();

        assert_eq!(first.as_uuid().as_u128(), 1);
        assert_eq!(second.as_uuid().as_u128(), 2);
    }

    #[test]
    fn random_ids_differ() {
        assert_ne!(RandomIds.next_id(), RandomIds.next_id());
    }

    #[test]
    fn production_uses_standard_timings() {
        let env = ReservationEnvironment::production();
        assert_eq!(env.notification_ttl, Duration::from_secs(3));
        assert_eq!(env.clock_tick, Duration::from_secs(1));
    }
}
