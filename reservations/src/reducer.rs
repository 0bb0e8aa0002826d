//! Reducer logic for the reservation manager.
//!
//! Bookings go through the validator first; check-out and delete act on the
//! book directly. Every outcome the guest should see becomes a notification,
//! and every notification (re)starts its expiry timer.

use crate::environment::ReservationEnvironment;
use crate::types::{
    Notification, NotificationKind, Reservation, ReservationAction, ReservationId, ReservationState,
};
use crate::validation::validate;
use tablekeeper_core::{
    SmallVec, cancellable, delay,
    effect::{Effect, EffectId},
    reducer::Reducer,
    smallvec,
};

/// Registration id of the clock display timer
pub const CLOCK_TIMER: EffectId = EffectId::new("reservations.clock");

/// Registration id of the notification expiry timer
pub const NOTIFICATION_TIMER: EffectId = EffectId::new("reservations.notification");

const BOOKED: &str = "Table booked successfully!";
const CHECKED_OUT: &str = "Customer checked out!";
const DELETED: &str = "Reservation deleted.";

/// Reducer for the reservation manager
#[derive(Clone, Debug)]
pub struct ReservationReducer;

impl ReservationReducer {
    /// Creates a new `ReservationReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Replaces the visible notification and restarts its expiry timer
    fn notify(
        state: &mut ReservationState,
        env: &ReservationEnvironment,
        kind: NotificationKind,
        message: impl Into<String>,
    ) -> Effect<ReservationAction> {
        state.last_generation = state.last_generation.wrapping_add(1);
        let generation = state.last_generation;
        state.notification = Some(Notification {
            kind,
            message: message.into(),
            generation,
        });

        cancellable! {
            id: NOTIFICATION_TIMER,
            effect: delay! {
                duration: env.notification_ttl,
                action: ReservationAction::NotificationExpired { generation }
            }
        }
    }

    fn schedule_tick(env: &ReservationEnvironment) -> Effect<ReservationAction> {
        cancellable! {
            id: CLOCK_TIMER,
            effect: delay! {
                duration: env.clock_tick,
                action: ReservationAction::ClockTicked
            }
        }
    }

    fn submit_booking(
        state: &mut ReservationState,
        env: &ReservationEnvironment,
    ) -> Effect<ReservationAction> {
        let guests = match validate(&state.form, &state.book) {
            Ok(guests) => guests,
            Err(rejection) => {
                tracing::debug!(%rejection, "Booking rejected");
                return Self::notify(state, env, rejection.kind(), rejection.to_string());
            }
        };

        let reservation = Reservation::new(
            env.ids.next_id(),
            state.form.name.clone(),
            state.form.phone.clone(),
            guests,
            env.clock.now(),
        );
        tracing::info!(id = %reservation.id, guests, "Table booked");

        state.book.admit(reservation);
        state.form.clear();
        Self::notify(state, env, NotificationKind::Success, BOOKED)
    }

    fn check_out(
        state: &mut ReservationState,
        env: &ReservationEnvironment,
        id: ReservationId,
    ) -> Effect<ReservationAction> {
        if state.book.check_out(id, env.clock.now()) {
            tracing::info!(%id, "Customer checked out");
        } else {
            tracing::debug!(%id, "Check-out for unknown reservation");
        }
        Self::notify(state, env, NotificationKind::Success, CHECKED_OUT)
    }

    fn delete(
        state: &mut ReservationState,
        env: &ReservationEnvironment,
        id: ReservationId,
    ) -> Option<Effect<ReservationAction>> {
        let Some(removal) = state.book.remove(id) else {
            tracing::debug!(%id, "Delete for unknown reservation");
            return None;
        };
        tracing::info!(
            %id,
            restored_seats = removal.restored_seats,
            seats_left = state.book.seats_left,
            "Reservation deleted"
        );
        Some(Self::notify(state, env, NotificationKind::Error, DELETED))
    }
}

impl Default for ReservationReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl Reducer for ReservationReducer {
    type State = ReservationState;
    type Action = ReservationAction;
    type Environment = ReservationEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Lifecycle ==========
            ReservationAction::Mount => {
                state.mounted = true;
                state.clock = Some(env.clock.now());
                smallvec![Self::schedule_tick(env)]
            }

            ReservationAction::Unmount => {
                state.mounted = false;
                state.notification = None;
                smallvec![
                    Effect::Cancel(CLOCK_TIMER),
                    Effect::Cancel(NOTIFICATION_TIMER)
                ]
            }

            // ========== User input ==========
            ReservationAction::FormChanged { field, value } => {
                state.form.set(field, value);
                SmallVec::new()
            }

            ReservationAction::SubmitBooking => smallvec![Self::submit_booking(state, env)],

            ReservationAction::CheckOut { id } => smallvec![Self::check_out(state, env, id)],

            ReservationAction::Delete { id } => Self::delete(state, env, id).into_iter().collect(),

            // ========== Timers ==========
            ReservationAction::ClockTicked => {
                if !state.mounted {
                    return SmallVec::new();
                }
                state.clock = Some(env.clock.now());
                smallvec![Self::schedule_tick(env)]
            }

            ReservationAction::NotificationExpired { generation } => {
                if state
                    .notification
                    .as_ref()
                    .is_some_and(|n| n.generation == generation)
                {
                    state.notification = None;
                }
                SmallVec::new()
            }
        }
    }
}
