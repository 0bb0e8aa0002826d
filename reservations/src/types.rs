//! Domain types for the reservation manager.
//!
//! A [`ReservationBook`] holds the seat capacity, the seats still free and the
//! reservations in booking order. The book owns the seat arithmetic so the
//! counter can never leave `0..=total_seats`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Seats the restaurant can allocate across all reservations
pub const TOTAL_SEATS: u32 = 20;

/// How long a notification stays visible after it was last set
pub const NOTIFICATION_TTL: Duration = Duration::from_secs(3);

/// Refresh period of the clock display
pub const CLOCK_TICK: Duration = Duration::from_secs(1);

/// Unique identifier for a reservation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReservationId(Uuid);

impl ReservationId {
    /// Creates a new random `ReservationId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `ReservationId` from a UUID
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ReservationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ReservationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A booked table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    /// Unique identifier
    pub id: ReservationId,
    /// Guest name, unique among reservations (ignoring case)
    pub name: String,
    /// Contact phone, free-form
    pub phone: String,
    /// Party size
    pub guests: u32,
    /// When the reservation was recorded
    pub check_in: DateTime<Utc>,
    /// When the party was last checked out
    pub check_out: Option<DateTime<Utc>>,
}

impl Reservation {
    /// Creates a reservation that has not checked out yet
    #[must_use]
    pub const fn new(
        id: ReservationId,
        name: String,
        phone: String,
        guests: u32,
        check_in: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            phone,
            guests,
            check_in,
            check_out: None,
        }
    }

    /// Whether the party has been checked out
    #[must_use]
    pub const fn is_checked_out(&self) -> bool {
        self.check_out.is_some()
    }

    /// Records a check-out, replacing any earlier one
    pub fn check_out(&mut self, at: DateTime<Utc>) {
        self.check_out = Some(at);
    }
}

/// A reservation removed from the book
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Removal {
    /// The removed reservation
    pub reservation: Reservation,
    /// Seats given back to the counter
    pub restored_seats: u32,
}

/// Seat counter plus the ordered list of reservations
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationBook {
    /// Fixed capacity
    pub total_seats: u32,
    /// Seats still free, always within `0..=total_seats`
    pub seats_left: u32,
    /// Reservations in booking order
    pub reservations: Vec<Reservation>,
}

impl ReservationBook {
    /// Creates an empty book with every seat free
    #[must_use]
    pub const fn new(total_seats: u32) -> Self {
        Self {
            total_seats,
            seats_left: total_seats,
            reservations: Vec::new(),
        }
    }

    /// Number of reservations
    #[must_use]
    pub fn len(&self) -> usize {
        self.reservations.len()
    }

    /// Whether there are no reservations
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }

    /// Seats currently held
    ///
    /// Zero for a book whose counter exceeds its capacity.
    #[must_use]
    pub const fn held_seats(&self) -> u32 {
        self.total_seats.saturating_sub(self.seats_left)
    }

    /// Returns a reservation by ID
    #[must_use]
    pub fn find(&self, id: ReservationId) -> Option<&Reservation> {
        self.reservations.iter().find(|r| r.id == id)
    }

    /// Index of a reservation in booking order
    #[must_use]
    pub fn position(&self, id: ReservationId) -> Option<usize> {
        self.reservations.iter().position(|r| r.id == id)
    }

    /// Whether any reservation carries `name`, ignoring case
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        let wanted = name.to_lowercase();
        self.reservations
            .iter()
            .any(|r| r.name.to_lowercase() == wanted)
    }

    /// Appends a reservation and takes its seats
    pub fn admit(&mut self, reservation: Reservation) {
        self.seats_left = self.seats_left.saturating_sub(reservation.guests);
        self.reservations.push(reservation);
    }

    /// Stamps `at` as the check-out time of `id`
    ///
    /// Returns false when no reservation matches. Seats are not released.
    pub fn check_out(&mut self, id: ReservationId, at: DateTime<Utc>) -> bool {
        match self.reservations.iter_mut().find(|r| r.id == id) {
            Some(reservation) => {
                reservation.check_out(at);
                true
            }
            None => false,
        }
    }

    /// Removes `id` from the book
    ///
    /// Seats come back only if the party had checked out; a reservation
    /// deleted before check-out keeps its seats held.
    pub fn remove(&mut self, id: ReservationId) -> Option<Removal> {
        let index = self.position(id)?;
        let reservation = self.reservations.remove(index);

        let restored_seats = if reservation.is_checked_out() {
            let before = self.seats_left;
            self.seats_left = before
                .saturating_add(reservation.guests)
                .min(self.total_seats);
            self.seats_left - before
        } else {
            0
        };

        Some(Removal {
            reservation,
            restored_seats,
        })
    }
}

impl Default for ReservationBook {
    fn default() -> Self {
        Self::new(TOTAL_SEATS)
    }
}

/// A field of the booking form
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormField {
    /// Guest name
    Name,
    /// Contact phone
    Phone,
    /// Party size, as typed
    Guests,
}

/// Raw, unvalidated booking form input
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingForm {
    /// Guest name
    pub name: String,
    /// Contact phone
    pub phone: String,
    /// Party size, as typed
    pub guests: String,
}

impl PendingForm {
    /// Creates a filled-in form
    #[must_use]
    pub fn new(name: impl Into<String>, phone: impl Into<String>, guests: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: phone.into(),
            guests: guests.into(),
        }
    }

    /// Replaces the value of one field
    pub fn set(&mut self, field: FormField, value: String) {
        match field {
            FormField::Name => self.name = value,
            FormField::Phone => self.phone = value,
            FormField::Guests => self.guests = value,
        }
    }

    /// Empties every field
    pub fn clear(&mut self) {
        self.name.clear();
        self.phone.clear();
        self.guests.clear();
    }
}

/// Tone of a notification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationKind {
    /// Something worked
    Success,
    /// Input needs fixing
    Warning,
    /// Refused or destructive outcome
    Error,
}

impl NotificationKind {
    /// Glyph shown in front of the message
    #[must_use]
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Success => "✅",
            Self::Warning => "⚠️",
            Self::Error => "❌",
        }
    }
}

/// The single visible status message
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Tone
    pub kind: NotificationKind,
    /// Human-readable text
    pub message: String,
    /// Distinguishes this message from earlier ones for expiry
    pub generation: u64,
}

/// Complete state of the reservation manager
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationState {
    /// Seats and reservations
    pub book: ReservationBook,
    /// Booking form contents
    pub form: PendingForm,
    /// Visible notification, if any
    pub notification: Option<Notification>,
    /// Generation handed to the most recent notification
    pub last_generation: u64,
    /// Time shown by the clock display
    pub clock: Option<DateTime<Utc>>,
    /// Whether the manager is mounted and its clock running
    pub mounted: bool,
}

impl ReservationState {
    /// Creates an unmounted manager with an empty book
    #[must_use]
    pub fn new(total_seats: u32) -> Self {
        Self {
            book: ReservationBook::new(total_seats),
            form: PendingForm::default(),
            notification: None,
            last_generation: 0,
            clock: None,
            mounted: false,
        }
    }
}

impl Default for ReservationState {
    fn default() -> Self {
        Self::new(TOTAL_SEATS)
    }
}

/// Everything the reservation manager reacts to
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationAction {
    // ========== Lifecycle ==========
    /// The manager became visible: start the clock
    Mount,
    /// The manager is being torn down: release both timers
    Unmount,

    // ========== User input ==========
    /// A form field was edited
    FormChanged {
        /// Field edited
        field: FormField,
        /// New contents
        value: String,
    },
    /// The booking form was submitted
    SubmitBooking,
    /// The checkout control of a row was pressed
    CheckOut {
        /// Reservation to check out
        id: ReservationId,
    },
    /// The delete control of a row was pressed
    Delete {
        /// Reservation to delete
        id: ReservationId,
    },

    // ========== Timers ==========
    /// The clock display period elapsed
    ClockTicked,
    /// A notification reached the end of its display time
    NotificationExpired {
        /// Generation of the notification that expired
        generation: u64,
    },
}
