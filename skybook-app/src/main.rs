use anyhow::Context;
use chrono::Utc;
use futures_util::StreamExt;
use skybook::{notice_stream, AppState};
use skybook_booking::{Gender, PassengerForm, PassengerId};
use skybook_catalog::pricing::format_cents;
use skybook_core::{FareClass, FlightResult, PaymentDetails, PaymentMethod, Session};
use skybook_live::{board_rows, BoardDirection};
use skybook_shared::{FlightStatus, FlightUpdateEvent};
use skybook_store::Config;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

const TOAST_WAIT: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("Failed to load config")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log.filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let today = Utc::now().date_naive();
    info!("Starting SkyBook for {} with fixtures from {}", today, config.fixtures.flights_path);

    let state = AppState::from_config(&config, today)?;
    let worker = state.spawn_availability_worker();

    let board = state.open_status_board(Session::anonymous(), today);
    let snapshot = board
        .wait_for(|s| !s.loading && s.last_updated.is_some())
        .await?;
    if let Some(e) = &snapshot.load_error {
        warn!("Status board failed to load: {}", e);
    }
    log_board(&snapshot.flights);

    let toasts = notice_stream(board.subscribe_notices(), None);
    tokio::pin!(toasts);

    let Some(flight) = snapshot
        .flights
        .iter()
        .find(|f| f.live.status == FlightStatus::Scheduled)
        .cloned()
    else {
        warn!("No scheduled flights to book today");
        board.teardown().await;
        return Ok(());
    };

    let session = Session::authenticated(Uuid::new_v4(), "traveller@skybook.test", "demo-access-token");
    book_two_passengers(&state, session, &flight).await?;

    // availability worker pushes the new seat counts through the feed
    if let Ok(Some(notice)) = tokio::time::timeout(TOAST_WAIT, toasts.next()).await {
        info!("{}: {}", notice.title, notice.description);
    }

    state
        .flights
        .update(FlightUpdateEvent::new(flight.id).with_status(FlightStatus::Boarding).with_gate("B12"))
        .await?;
    if let Ok(Some(notice)) = tokio::time::timeout(TOAST_WAIT, toasts.next()).await {
        info!("{}: {}", notice.title, notice.description);
    }

    let last = board.teardown().await;
    log_board(&last.flights);
    worker.abort();
    Ok(())
}

fn log_board(flights: &[FlightResult]) {
    for row in board_rows(flights, "", BoardDirection::Departures) {
        info!(
            "{:<8} {:<14} to {:<16} {:>5}  gate {:<4} {}",
            row.flight_number, row.airline, row.counterpart_city, row.scheduled_time, row.gate, row.status_label
        );
    }
}

async fn book_two_passengers(state: &AppState, session: Session, flight: &FlightResult) -> anyhow::Result<()> {
    let mut wizard = state.start_booking(session, flight, FareClass::Economy).await?;

    wizard.submit_passengers(vec![
        PassengerForm::new("Ana Lima", 34, Gender::Female, "P1234567"),
        PassengerForm::new("Rui Lima", 36, Gender::Male, "P7654321"),
    ])?;

    let ids: Vec<PassengerId> = wizard.draft().passengers().iter().map(|p| p.id).collect();
    let seats: BTreeMap<PassengerId, String> = ids
        .into_iter()
        .zip(["12C", "12D"])
        .map(|(id, seat)| (id, seat.to_string()))
        .collect();
    wizard.submit_seats(seats)?;

    let addons = state.addons.select("extra_baggage", 2).into_iter().collect();
    wizard.update_addons(addons)?;
    wizard.continue_to_payment()?;

    let quote = wizard.price_summary();
    info!(
        "Quote for {}: base {} + taxes {} + add-ons {} = {} {}",
        flight.schedule.flight_number,
        format_cents(quote.total_base_fare),
        format_cents(quote.taxes),
        format_cents(quote.addons_cost),
        format_cents(quote.total_amount),
        state.pricing.currency()
    );

    let confirmation = wizard
        .submit_payment(
            PaymentMethod::Card,
            PaymentDetails::card("4242424242424242", "Ana Lima", "12/28", "123"),
        )
        .await?;
    info!(
        "Booked {} (PNR {}), charged {} under {}",
        confirmation.booking_id,
        confirmation.pnr,
        format_cents(confirmation.total_cents),
        confirmation.transaction_id
    );
    debug!("Confirmation payload: {}", serde_json::to_string(&confirmation)?);
    Ok(())
}
