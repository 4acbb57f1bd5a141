use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use serde::Deserialize;
use skybook_core::repository::FlightRepository;
use skybook_core::search::{
    normalize_time, Airport, Fares, FlightQuery, FlightResult, FlightSchedule, LiveFlightState, SeatCounts,
};
use skybook_core::{CollaboratorError, Session};
use skybook_shared::{FlightStatus, FlightUpdateEvent};
use std::path::Path;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreError;
use crate::events::EventBus;

/// One row of `fixtures/flights.json`. Dates are relative to the day the
/// fixtures are loaded so the status board always has something to show.
#[derive(Debug, Deserialize)]
struct FlightFixture {
    #[serde(default = "Uuid::new_v4")]
    id: Uuid,
    flight_number: String,
    airline: String,
    source: Airport,
    destination: Airport,
    day_offset: i64,
    departure_time: String,
    arrival_time: String,
    duration_minutes: u32,
    distance_km: u32,
    aircraft_model: Option<String>,
    #[serde(default)]
    status: FlightStatus,
    gate: Option<String>,
    economy_price_cents: i64,
    business_price_cents: i64,
    first_class_price_cents: Option<i64>,
    available_economy_seats: u32,
    available_business_seats: u32,
    #[serde(default)]
    available_first_class_seats: u32,
}

impl FlightFixture {
    fn into_result(self, base_date: NaiveDate) -> Result<FlightResult, StoreError> {
        let invalid = |reason: String| StoreError::InvalidFixture {
            flight_number: self.flight_number.clone(),
            reason,
        };
        let departure_time = normalize_time(&self.departure_time).map_err(|e| invalid(e.to_string()))?;
        let arrival_time = normalize_time(&self.arrival_time).map_err(|e| invalid(e.to_string()))?;
        let flight_date = base_date
            .checked_add_signed(Duration::days(self.day_offset))
            .ok_or_else(|| invalid(format!("day offset {} out of range", self.day_offset)))?;

        Ok(FlightResult {
            id: self.id,
            schedule: FlightSchedule {
                flight_number: self.flight_number,
                airline: self.airline,
                source: self.source,
                destination: self.destination,
                flight_date,
                departure_time,
                arrival_time,
                duration_minutes: self.duration_minutes,
                distance_km: self.distance_km,
                aircraft_model: self.aircraft_model,
            },
            live: LiveFlightState::new(
                self.status,
                self.gate.filter(|g| !g.trim().is_empty()),
                Fares {
                    economy_cents: self.economy_price_cents,
                    business_cents: self.business_price_cents,
                    first_class_cents: self.first_class_price_cents,
                },
                SeatCounts {
                    economy: self.available_economy_seats,
                    business: self.available_business_seats,
                    first_class: self.available_first_class_seats,
                },
            ),
        })
    }
}

/// Flight instances held in memory, standing in for the hosted table.
/// Writes go through `update`, which publishes the change on the feed.
pub struct InMemoryFlightRepository {
    flights: RwLock<Vec<FlightResult>>,
    feed: EventBus<FlightUpdateEvent>,
}

impl InMemoryFlightRepository {
    pub fn new(flights: Vec<FlightResult>, feed: EventBus<FlightUpdateEvent>) -> Self {
        Self {
            flights: RwLock::new(flights),
            feed,
        }
    }

    pub fn from_json(json: &str, base_date: NaiveDate, feed: EventBus<FlightUpdateEvent>) -> Result<Self, StoreError> {
        let rows: Vec<FlightFixture> = serde_json::from_str(json)?;
        let flights = rows
            .into_iter()
            .map(|row| row.into_result(base_date))
            .collect::<Result<Vec<_>, _>>()?;
        info!("Loaded {} flight fixtures", flights.len());
        Ok(Self::new(flights, feed))
    }

    pub fn from_path(
        path: impl AsRef<Path>,
        base_date: NaiveDate,
        feed: EventBus<FlightUpdateEvent>,
    ) -> Result<Self, StoreError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json, base_date, feed)
    }

    pub fn feed(&self) -> &EventBus<FlightUpdateEvent> {
        &self.feed
    }

    pub async fn all(&self) -> Vec<FlightResult> {
        self.flights.read().await.clone()
    }

    pub async fn get(&self, id: Uuid) -> Option<FlightResult> {
        self.flights.read().await.iter().find(|f| f.id == id).cloned()
    }

    /// Apply a partial change to the stored row and push it to subscribers.
    pub async fn update(&self, event: FlightUpdateEvent) -> Result<FlightResult, StoreError> {
        let updated = {
            let mut flights = self.flights.write().await;
            let flight = flights
                .iter_mut()
                .find(|f| f.id == event.flight_id)
                .ok_or(StoreError::UnknownFlight(event.flight_id))?;
            flight.live.apply(&event);
            flight.clone()
        };

        self.feed.publish(&updated.schedule.flight_number, event);
        Ok(updated)
    }
}

#[async_trait]
impl FlightRepository for InMemoryFlightRepository {
    async fn find_flights(
        &self,
        session: &Session,
        query: &FlightQuery,
    ) -> Result<Vec<FlightResult>, CollaboratorError> {
        let mut matches: Vec<FlightResult> = self
            .flights
            .read()
            .await
            .iter()
            .filter(|f| query.matches(f))
            .cloned()
            .collect();
        matches.sort_by(|a, b| {
            (a.schedule.flight_date, &a.schedule.departure_time).cmp(&(b.schedule.flight_date, &b.schedule.departure_time))
        });

        debug!(
            "Flight query {:?} returned {} rows (authenticated: {})",
            query,
            matches.len(),
            session.is_authenticated()
        );
        Ok(matches)
    }
}
