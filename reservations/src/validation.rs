//! Booking form validation.
//!
//! Rules run in order and the first failure wins:
//!
//! 1. name, phone and guests are non-empty and guests is a positive integer
//! 2. the party fits in the seats left
//! 3. no reservation already uses the name (ignoring case)

use crate::types::{NotificationKind, PendingForm, ReservationBook};
use thiserror::Error;

/// Why a booking was refused
///
/// The `Display` text is what the guest sees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// A field is empty or the party size is not a positive integer
    #[error("Please enter valid details.")]
    InvalidDetails,

    /// The party is larger than the seats left
    #[error("Not enough seats available!")]
    NotEnoughSeats {
        /// Party size asked for
        requested: u64,
        /// Seats that were free
        available: u32,
    },

    /// The name is already on the list
    #[error("Duplicate name found! Use a different name.")]
    DuplicateName(String),
}

impl Rejection {
    /// Tone of the notification shown for this rejection
    #[must_use]
    pub const fn kind(&self) -> NotificationKind {
        match self {
            Self::InvalidDetails | Self::DuplicateName(_) => NotificationKind::Warning,
            Self::NotEnoughSeats { .. } => NotificationKind::Error,
        }
    }
}

/// Checks a submitted form against the book
///
/// Returns the party size on success. Has no side effects.
///
/// # Errors
///
/// Returns the first [`Rejection`] whose rule fails.
pub fn validate(form: &PendingForm, book: &ReservationBook) -> Result<u32, Rejection> {
    if form.name.is_empty() || form.phone.is_empty() || form.guests.is_empty() {
        return Err(Rejection::InvalidDetails);
    }
    let requested = parse_guest_count(&form.guests).ok_or(Rejection::InvalidDetails)?;

    let guests = u32::try_from(requested)
        .ok()
        .filter(|guests| *guests <= book.seats_left)
        .ok_or(Rejection::NotEnoughSeats {
            requested,
            available: book.seats_left,
        })?;

    if book.has_name(&form.name) {
        return Err(Rejection::DuplicateName(form.name.clone()));
    }

    Ok(guests)
}

/// Reads the positive integer at the start of `input`
///
/// Leading whitespace and a `+` sign are accepted and anything after the
/// digits is ignored, so `" 4"`, `"4.5"` and `"4 people"` all read as 4.
/// Zero, negative numbers and input without leading digits yield `None`.
/// Values too large for `u64` saturate.
#[must_use]
pub fn parse_guest_count(input: &str) -> Option<u64> {
    let trimmed = input.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut seen_digit = false;
    let mut value: u64 = 0;
    for digit in digits.bytes().map_while(|b| char::from(b).to_digit(10)) {
        seen_digit = true;
        value = value.saturating_mul(10).saturating_add(u64::from(digit));
    }

    (seen_digit && !negative && value > 0).then_some(value)
}
