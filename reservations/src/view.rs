//! Read-only projection of the state for display.
//!
//! The view carries exactly what a screen shows: clock, seat counter, menu,
//! one row per reservation and the notification banner. It is `Serialize`
//! for front ends that render elsewhere, and `Display` renders it as text.

use crate::menu::MENU;
use crate::types::{NotificationKind, Reservation, ReservationId, ReservationState};
use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;
use std::fmt;

/// Heading of the screen
pub const TITLE: &str = "🍽️ Restaurant Reservation System";

/// Shown in the check-out column until the party leaves
pub const NOT_CHECKED_OUT: &str = "⌛ Not Checked Out";

const CLOCK_FORMAT: &str = "%H:%M:%S";
const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One row of the reservation table
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RowView {
    /// Reservation the row controls act on
    pub id: ReservationId,
    /// Guest name
    pub name: String,
    /// Contact phone
    pub phone: String,
    /// Party size
    pub guests: u32,
    /// Formatted check-in time
    pub check_in: String,
    /// Formatted check-out time or [`NOT_CHECKED_OUT`]
    pub check_out: String,
    /// Whether the row is shown as checked out
    pub checked_out: bool,
    /// Whether the checkout control is offered
    pub can_check_out: bool,
}

/// The notification banner
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BannerView {
    /// Tone
    pub kind: NotificationKind,
    /// Glyph and message
    pub text: String,
}

/// Everything the screen shows
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReservationView {
    /// Heading
    pub title: &'static str,
    /// Formatted clock, once mounted
    pub clock: Option<String>,
    /// Free seats
    pub seats_left: u32,
    /// Capacity
    pub total_seats: u32,
    /// Menu lines
    pub menu: Vec<String>,
    /// Reservation table, in booking order
    pub rows: Vec<RowView>,
    /// Visible notification
    pub banner: Option<BannerView>,
}

impl ReservationView {
    /// Builds the view with times in the local time zone
    #[must_use]
    pub fn from_state(state: &ReservationState) -> Self {
        Self::from_state_in(state, &Local)
    }

    /// Builds the view with times shown in `tz`
    #[must_use]
    pub fn from_state_in<Tz>(state: &ReservationState, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let stamp = |at: DateTime<Utc>| at.with_timezone(tz).format(STAMP_FORMAT).to_string();

        let row = |reservation: &Reservation| RowView {
            id: reservation.id,
            name: reservation.name.clone(),
            phone: reservation.phone.clone(),
            guests: reservation.guests,
            check_in: stamp(reservation.check_in),
            check_out: reservation
                .check_out
                .map_or_else(|| NOT_CHECKED_OUT.to_string(), stamp),
            checked_out: reservation.is_checked_out(),
            can_check_out: !reservation.is_checked_out(),
        };

        Self {
            title: TITLE,
            clock: state
                .clock
                .map(|now| now.with_timezone(tz).format(CLOCK_FORMAT).to_string()),
            seats_left: state.book.seats_left,
            total_seats: state.book.total_seats,
            menu: MENU.iter().map(ToString::to_string).collect(),
            rows: state.book.reservations.iter().map(row).collect(),
            banner: state.notification.as_ref().map(|n| BannerView {
                kind: n.kind,
                text: format!("{} {}", n.kind.glyph(), n.message),
            }),
        }
    }
}

impl fmt::Display for ReservationView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(banner) = &self.banner {
            writeln!(f, "[ {} ]", banner.text)?;
        }
        writeln!(f, "{}", self.title)?;
        if let Some(clock) = &self.clock {
            writeln!(f, "⏰ {clock}")?;
        }
        writeln!(f, "💺 Seats Left: {} / {}", self.seats_left, self.total_seats)?;

        writeln!(f)?;
        writeln!(f, "📜 Menu")?;
        for line in &self.menu {
            writeln!(f, "  {line}")?;
        }

        writeln!(f)?;
        if self.rows.is_empty() {
            return writeln!(f, "No reservations yet.");
        }
        writeln!(
            f,
            "{:>3}  {:<16} {:<14} {:>6}  {:<19}  {:<19}  Actions",
            "#", "Name", "Phone", "Guests", "Check-In Time", "Check-Out Time"
        )?;
        for (index, row) in self.rows.iter().enumerate() {
            let actions = if row.can_check_out {
                "checkout, delete"
            } else {
                "delete"
            };
            writeln!(
                f,
                "{:>3}  {:<16} {:<14} {:>6}  {:<19}  {:<19}  {}",
                index + 1,
                row.name,
                row.phone,
                row.guests,
                row.check_in,
                row.check_out,
                actions
            )?;
        }
        Ok(())
    }
}
