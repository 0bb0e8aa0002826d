//! Line commands understood by the `reservation-manager` binary.

use crate::types::{FormField, ReservationId, ReservationState};
use thiserror::Error;

/// Help text printed on start and for `help`
pub const HELP: &str = "\
Commands:
  name <text>                     set the name field
  phone <text>                    set the phone field
  guests <text>                   set the guest count field
  book                            submit the form
  book <name> <phone> <guests>    fill the form and submit
  checkout <row>                  check out the reservation in row <row>
  delete <row>                    delete the reservation in row <row>
  show                            print the screen
  menu                            print the menu
  help                            print this help
  quit                            leave";

/// A parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Edit one form field
    Set(FormField, String),
    /// Submit the form as it is
    Submit,
    /// Fill all fields, then submit
    Book {
        /// Guest name
        name: String,
        /// Contact phone
        phone: String,
        /// Party size, as typed
        guests: String,
    },
    /// Check out the reservation in a 1-based table row
    CheckOut(usize),
    /// Delete the reservation in a 1-based table row
    Delete(usize),
    /// Print the screen
    Show,
    /// Print the menu
    Menu,
    /// Print the help text
    Help,
    /// Leave
    Quit,
}

/// Why a console line was not understood
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown first word
    #[error("unknown command `{0}` (try `help`)")]
    Unknown(String),
    /// Wrong arguments for a known command
    #[error("usage: {0}")]
    Usage(&'static str),
}

impl Command {
    /// Parses one input line; blank lines yield `None`
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] for unknown commands or bad arguments.
    pub fn parse(line: &str) -> Result<Option<Self>, CommandError> {
        let line = line.trim();
        let Some((word, rest)) = line
            .split_once(char::is_whitespace)
            .map(|(w, r)| (w, r.trim()))
            .or_else(|| (!line.is_empty()).then_some((line, "")))
        else {
            return Ok(None);
        };

        let command = match word.to_ascii_lowercase().as_str() {
            "name" => Self::Set(FormField::Name, rest.to_string()),
            "phone" => Self::Set(FormField::Phone, rest.to_string()),
            "guests" => Self::Set(FormField::Guests, rest.to_string()),
            "book" if rest.is_empty() => Self::Submit,
            "book" => {
                let mut parts = rest.split_whitespace();
                match (parts.next(), parts.next(), parts.next(), parts.next()) {
                    (Some(name), Some(phone), Some(guests), None) => Self::Book {
                        name: name.to_string(),
                        phone: phone.to_string(),
                        guests: guests.to_string(),
                    },
                    _ => return Err(CommandError::Usage("book <name> <phone> <guests>")),
                }
            }
            "checkout" => Self::CheckOut(row(rest, "checkout <row>")?),
            "delete" => Self::Delete(row(rest, "delete <row>")?),
            "show" => Self::Show,
            "menu" => Self::Menu,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(Some(command))
    }
}

/// Why a table row cannot be acted on
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowError {
    /// Row number past the end of the table
    #[error("No reservation in row {0}.")]
    Missing(usize),
    /// The row no longer offers a checkout control
    #[error("Row {0} is already checked out.")]
    AlreadyCheckedOut(usize),
}

/// Resolves a 1-based row for `delete`
///
/// # Errors
///
/// Returns [`RowError::Missing`] when the table has no such row.
pub fn delete_target(state: &ReservationState, row: usize) -> Result<ReservationId, RowError> {
    row.checked_sub(1)
        .and_then(|index| state.book.reservations.get(index))
        .map(|r| r.id)
        .ok_or(RowError::Missing(row))
}

/// Resolves a 1-based row for `checkout`
///
/// Only rows still waiting for check-out are offered, as on screen.
///
/// # Errors
///
/// Returns [`RowError::Missing`] when the table has no such row and
/// [`RowError::AlreadyCheckedOut`] when the party already left.
pub fn checkout_target(state: &ReservationState, row: usize) -> Result<ReservationId, RowError> {
    let reservation = row
        .checked_sub(1)
        .and_then(|index| state.book.reservations.get(index))
        .ok_or(RowError::Missing(row))?;
    if reservation.is_checked_out() {
        return Err(RowError::AlreadyCheckedOut(row));
    }
    Ok(reservation.id)
}

fn row(arg: &str, usage: &'static str) -> Result<usize, CommandError> {
    arg.parse::<usize>()
        .ok()
        .filter(|row| *row > 0)
        .ok_or(CommandError::Usage(usage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Reservation;
    use chrono::Utc;

    fn table() -> (ReservationState, ReservationId, ReservationId) {
        let mut state = ReservationState::default();
        let mut left = Reservation::new(ReservationId::new(), "Ann".into(), "111".into(), 4, Utc::now());
        left.check_out(Utc::now());
        let seated = Reservation::new(ReservationId::new(), "Bob".into(), "222".into(), 2, Utc::now());
        let ids = (left.id, seated.id);
        state.book.admit(left);
        state.book.admit(seated);
        (state, ids.0, ids.1)
    }

    #[test]
    fn checkout_refuses_checked_out_row() {
        let (state, _, seated) = table();

        assert_eq!(checkout_target(&state, 1), Err(RowError::AlreadyCheckedOut(1)));
        assert_eq!(checkout_target(&state, 2), Ok(seated));
        assert_eq!(
            RowError::AlreadyCheckedOut(1).to_string(),
            "Row 1 is already checked out."
        );
    }

    #[test]
    fn delete_accepts_any_listed_row() {
        let (state, left, seated) = table();

        assert_eq!(delete_target(&state, 1), Ok(left));
        assert_eq!(delete_target(&state, 2), Ok(seated));
    }

    #[test]
    fn rows_past_the_table_are_missing() {
        let (state, _, _) = table();

        assert_eq!(delete_target(&state, 3), Err(RowError::Missing(3)));
        assert_eq!(checkout_target(&state, 3), Err(RowError::Missing(3)));
        assert_eq!(checkout_target(&state, 0), Err(RowError::Missing(0)));
    }

    #[test]
    fn parses_field_edits_keeping_spaces() {
        assert_eq!(
            Command::parse("name  Ann Lee "),
            Ok(Some(Command::Set(FormField::Name, "Ann Lee".into())))
        );
        assert_eq!(
            Command::parse("guests 4"),
            Ok(Some(Command::Set(FormField::Guests, "4".into())))
        );
    }

    #[test]
    fn parses_book_forms() {
        assert_eq!(Command::parse("book"), Ok(Some(Command::Submit)));
        assert_eq!(
            Command::parse("BOOK Ann 111 4"),
            Ok(Some(Command::Book {
                name: "Ann".into(),
                phone: "111".into(),
                guests: "4".into()
            }))
        );
        assert!(matches!(Command::parse("book Ann 111"), Err(CommandError::Usage(_))));
    }

    #[test]
    fn parses_row_commands() {
        assert_eq!(Command::parse("checkout 2"), Ok(Some(Command::CheckOut(2))));
        assert_eq!(Command::parse("delete 1"), Ok(Some(Command::Delete(1))));
        assert!(Command::parse("delete 0").is_err());
        assert!(Command::parse("checkout x").is_err());
    }

    #[test]
    fn blank_and_unknown_lines() {
        assert_eq!(Command::parse("   "), Ok(None));
        assert_eq!(Command::parse("quit"), Ok(Some(Command::Quit)));
        assert_eq!(Command::parse("Menu"), Ok(Some(Command::Menu)));
        assert_eq!(
            Command::parse("dance"),
            Err(CommandError::Unknown("dance".into()))
        );
    }
}
