use async_trait::async_trait;
use chrono::NaiveDate;
use skybook_core::search::{Airport, Fares, FlightQuery, FlightResult, FlightSchedule, LiveFlightState, SeatCounts};
use skybook_core::{CollaboratorError, FlightRepository, Session};
use skybook_shared::FlightStatus;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;
use uuid::Uuid;

pub fn airport(code: &str, city: &str) -> Airport {
    Airport {
        code: code.to_string(),
        city: city.to_string(),
        name: format!("{} Airport", city),
        country: "USA".to_string(),
        terminal_info: None,
    }
}

pub fn flight(number: &str, airline: &str, economy_cents: i64, departure: &str, duration: u32) -> FlightResult {
    FlightResult {
        id: Uuid::new_v4(),
        schedule: FlightSchedule {
            flight_number: number.to_string(),
            airline: airline.to_string(),
            source: airport("JFK", "New York"),
            destination: airport("LAX", "Los Angeles"),
            flight_date: NaiveDate::from_ymd_opt(2025, 12, 10).unwrap(),
            departure_time: departure.to_string(),
            arrival_time: "23:30".to_string(),
            duration_minutes: duration,
            distance_km: 3983,
            aircraft_model: Some("A320".to_string()),
        },
        live: LiveFlightState::new(
            FlightStatus::Scheduled,
            None,
            Fares {
                economy_cents,
                business_cents: economy_cents * 2,
                first_class_cents: None,
            },
            SeatCounts { economy: 100, business: 12, first_class: 0 },
        ),
    }
}

/// Repository double. A gated stub holds every response until the gate
/// is notified.
pub struct StubRepository {
    flights: Vec<FlightResult>,
    fail: bool,
    gate: Option<Arc<Notify>>,
    calls: AtomicUsize,
}

impl StubRepository {
    pub fn serving(flights: Vec<FlightResult>) -> Self {
        Self { flights, fail: false, gate: None, calls: AtomicUsize::new(0) }
    }

    pub fn failing() -> Self {
        Self { flights: Vec::new(), fail: true, gate: None, calls: AtomicUsize::new(0) }
    }

    pub fn gated(flights: Vec<FlightResult>, gate: Arc<Notify>) -> Self {
        Self { flights, fail: false, gate: Some(gate), calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FlightRepository for StubRepository {
    async fn find_flights(&self, _session: &Session, _query: &FlightQuery) -> Result<Vec<FlightResult>, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if self.fail {
            return Err("connection reset by peer".into());
        }
        Ok(self.flights.clone())
    }
}
