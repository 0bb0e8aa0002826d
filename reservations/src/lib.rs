//! Restaurant table reservations built on the Tablekeeper reducer architecture.
//!
//! The manager keeps a fixed number of seats, a list of reservations and a
//! booking form. It demonstrates:
//!
//! - Validating input before it touches state
//! - A seat counter that only the book itself updates
//! - Restartable timers (`Effect::Cancellable`) for notification expiry
//! - Releasing every timer on teardown
//!
//! # Quick Start
//!
//! ```no_run
//! use reservation_manager::{
//!     FormField, ReservationAction, ReservationEnvironment, ReservationReducer, ReservationState,
//! };
//! use tablekeeper_runtime::Store;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Store::new(
//!     ReservationState::default(),
//!     ReservationReducer::new(),
//!     ReservationEnvironment::production(),
//! );
//! store.send(ReservationAction::Mount).await?;
//!
//! for (field, value) in [(FormField::Name, "Ann"), (FormField::Phone, "111"), (FormField::Guests, "4")] {
//!     store.send(ReservationAction::FormChanged { field, value: value.into() }).await?;
//! }
//! store.send(ReservationAction::SubmitBooking).await?;
//!
//! let seats_left = store.state(|s| s.book.seats_left).await;
//! println!("Seats left: {seats_left}");
//!
//! store.send(ReservationAction::Unmount).await?;
//! store.shutdown(std::time::Duration::from_secs(1)).await?;
//! # Ok(())
//! # }
//! ```

pub mod console;
pub mod environment;
pub mod menu;
pub mod reducer;
pub mod types;
pub mod validation;
pub mod view;

// Re-export commonly used types
pub use environment::{IdGenerator, RandomIds, ReservationEnvironment, SequentialIds};
pub use reducer::{CLOCK_TIMER, NOTIFICATION_TIMER, ReservationReducer};
pub use types::{
    FormField, Notification, NotificationKind, PendingForm, Reservation, ReservationAction,
    ReservationBook, ReservationId, ReservationState, TOTAL_SEATS,
};
pub use validation::{Rejection, validate};
pub use view::ReservationView;
