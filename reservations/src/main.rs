//! Reservation manager binary
//!
//! A line-oriented console over the reservation store. Type `help` for the
//! command list.

use anyhow::{Context, Result};
use reservation_manager::console::{self, Command, HELP};
use reservation_manager::menu::MENU;
use reservation_manager::{
    FormField, ReservationAction, ReservationEnvironment, ReservationReducer, ReservationState,
    ReservationView,
};
use tablekeeper_runtime::{Store, metrics::register_metrics};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type ReservationStore =
    Store<ReservationState, ReservationAction, ReservationEnvironment, ReservationReducer>;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never interleave with the screen
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reservation_manager=info,tablekeeper_runtime=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Descriptions only; collecting them needs a recorder from the host
    register_metrics();

    let store = Store::new(
        ReservationState::default(),
        ReservationReducer::new(),
        ReservationEnvironment::production(),
    );
    store
        .send(ReservationAction::Mount)
        .await
        .context("failed to mount reservation manager")?;

    println!("{HELP}\n");
    render(&store).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(error) => {
                println!("{error}");
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => println!("{HELP}"),
            Command::Show => render(&store).await,
            Command::Menu => {
                for item in &MENU {
                    println!("{item}");
                }
            }
            Command::Set(field, value) => {
                store
                    .send(ReservationAction::FormChanged { field, value })
                    .await?;
            }
            Command::Submit => {
                store.send(ReservationAction::SubmitBooking).await?;
                render(&store).await;
            }
            Command::Book { name, phone, guests } => {
                for (field, value) in [
                    (FormField::Name, name),
                    (FormField::Phone, phone),
                    (FormField::Guests, guests),
                ] {
                    store
                        .send(ReservationAction::FormChanged { field, value })
                        .await?;
                }
                store.send(ReservationAction::SubmitBooking).await?;
                render(&store).await;
            }
            // Checked-out rows offer no checkout control
            Command::CheckOut(row) => match store.state(|s| console::checkout_target(s, row)).await {
                Ok(id) => {
                    store.send(ReservationAction::CheckOut { id }).await?;
                    render(&store).await;
                }
                Err(error) => println!("{error}"),
            },
            Command::Delete(row) => match store.state(|s| console::delete_target(s, row)).await {
                Ok(id) => {
                    store.send(ReservationAction::Delete { id }).await?;
                    render(&store).await;
                }
                Err(error) => println!("{error}"),
            },
        }
    }

    store.send(ReservationAction::Unmount).await?;
    store
        .shutdown(store.config().default_shutdown_timeout)
        .await
        .context("store did not shut down cleanly")?;
    tracing::info!("Reservation manager stopped");
    Ok(())
}

async fn render(store: &ReservationStore) {
    let view = store.state(ReservationView::from_state).await;
    println!("{view}");
}
