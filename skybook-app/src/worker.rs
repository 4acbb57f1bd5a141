use skybook_core::FareClass;
use skybook_shared::{BookingConfirmedEvent, FlightUpdateEvent};
use skybook_store::{InMemoryFlightRepository, StaticSeatMap, StoreError};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{error, info, warn};

/// Keeps seat maps and seat counts in step with confirmed bookings. Count
/// changes go out on the flight feed like any other row update.
pub async fn start_availability_worker(
    mut confirmations: broadcast::Receiver<BookingConfirmedEvent>,
    flights: Arc<InMemoryFlightRepository>,
    seat_maps: Arc<StaticSeatMap>,
) {
    info!("Availability worker started, listening to bookings...");

    loop {
        match confirmations.recv().await {
            Ok(event) => {
                info!("Processing booking confirmation: {}", event.booking_id);
                if let Err(e) = update_availability(&flights, &seat_maps, &event).await {
                    error!("Failed to update availability: {}", e);
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!("Availability worker lagged, {} confirmations skipped", skipped);
            }
            Err(RecvError::Closed) => {
                info!("Booking confirmations closed, availability worker stopping");
                break;
            }
        }
    }
}

async fn update_availability(
    flights: &InMemoryFlightRepository,
    seat_maps: &StaticSeatMap,
    event: &BookingConfirmedEvent,
) -> Result<(), StoreError> {
    seat_maps.mark_booked(event.flight_id, &event.seats).await;

    let flight = flights
        .get(event.flight_id)
        .await
        .ok_or(StoreError::UnknownFlight(event.flight_id))?;
    let taken = u32::try_from(event.passenger_count).unwrap_or(u32::MAX);
    let seats = flight.live.seats;

    let mut update = FlightUpdateEvent::new(event.flight_id);
    match FareClass::parse(&event.cabin) {
        Some(FareClass::Economy) => update.available_economy_seats = Some(seats.economy.saturating_sub(taken)),
        Some(FareClass::Business) => update.available_business_seats = Some(seats.business.saturating_sub(taken)),
        Some(FareClass::First) => {
            update.available_first_class_seats = Some(seats.first_class.saturating_sub(taken))
        }
        None => {
            warn!("Unknown cabin '{}' on booking {}, seat counts unchanged", event.cabin, event.booking_id);
            return Ok(());
        }
    }

    let updated = flights.update(update).await?;
    info!(
        "Decremented availability for flight {}: {} seats left",
        updated.schedule.flight_number, updated.live.total_available_seats
    );
    Ok(())
}
