use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use skybook_shared::{FlightStatus, FlightUpdateEvent};
use uuid::Uuid;

use crate::{CoreError, CoreResult};

/// Pricing and service tier chosen for a booking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum FareClass {
    #[default]
    Economy,
    Business,
    First,
}

impl FareClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            FareClass::Economy => "economy",
            FareClass::Business => "business",
            FareClass::First => "first",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "economy" => Some(FareClass::Economy),
            "business" => Some(FareClass::Business),
            "first" | "first_class" => Some(FareClass::First),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Airport {
    pub code: String,
    pub city: String,
    pub name: String,
    pub country: String,
    pub terminal_info: Option<String>,
}

impl Airport {
    /// Case-insensitive substring match against city or IATA code.
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.city.to_lowercase().contains(&needle) || self.code.to_lowercase().contains(&needle)
    }
}

/// Static part of a flight instance. Never changes once loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlightSchedule {
    pub flight_number: String,
    pub airline: String,
    pub source: Airport,
    pub destination: Airport,
    pub flight_date: NaiveDate,
    /// "HH:MM"
    pub departure_time: String,
    /// "HH:MM"
    pub arrival_time: String,
    pub duration_minutes: u32,
    pub distance_km: u32,
    pub aircraft_model: Option<String>,
}

/// Fares in cents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Fares {
    pub economy_cents: i64,
    pub business_cents: i64,
    pub first_class_cents: Option<i64>,
}

impl Fares {
    /// Per-passenger base fare for the booked class. First class falls back
    /// to business when the instance has no first cabin.
    pub fn base_fare(&self, fare_class: FareClass) -> i64 {
        match fare_class {
            FareClass::Economy => self.economy_cents,
            FareClass::Business => self.business_cents,
            FareClass::First => self.first_class_cents.unwrap_or(self.business_cents),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SeatCounts {
    pub economy: u32,
    pub business: u32,
    pub first_class: u32,
}

impl SeatCounts {
    pub fn total(&self) -> u32 {
        self.economy
            .saturating_add(self.business)
            .saturating_add(self.first_class)
    }
}

/// Mutable part of a flight instance, subject to live updates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LiveFlightState {
    pub status: FlightStatus,
    pub gate: Option<String>,
    pub fares: Fares,
    pub seats: SeatCounts,
    pub total_available_seats: u32,
}

impl LiveFlightState {
    pub fn new(status: FlightStatus, gate: Option<String>, fares: Fares, seats: SeatCounts) -> Self {
        Self {
            status,
            gate,
            fares,
            seats,
            total_available_seats: seats.total(),
        }
    }

    pub fn recompute_totals(&mut self) {
        self.total_available_seats = self.seats.total();
    }

    /// Overwrite the fields present in `event`, leaving the rest alone.
    /// A blank gate clears the assignment.
    pub fn apply(&mut self, event: &FlightUpdateEvent) {
        if let Some(status) = event.status {
            self.status = status;
        }
        if let Some(gate) = &event.gate {
            let gate = gate.trim();
            self.gate = (!gate.is_empty()).then(|| gate.to_string());
        }
        if let Some(cents) = event.economy_price_cents {
            self.fares.economy_cents = cents;
        }
        if let Some(cents) = event.business_price_cents {
            self.fares.business_cents = cents;
        }
        if let Some(cents) = event.first_class_price_cents {
            self.fares.first_class_cents = Some(cents);
        }
        if let Some(seats) = event.available_economy_seats {
            self.seats.economy = seats;
        }
        if let Some(seats) = event.available_business_seats {
            self.seats.business = seats;
        }
        if let Some(seats) = event.available_first_class_seats {
            self.seats.first_class = seats;
        }
        self.recompute_totals();
    }

    pub fn gate_display(&self) -> &str {
        self.gate.as_deref().unwrap_or("TBA")
    }
}

/// One concrete dated occurrence of a route.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlightResult {
    pub id: Uuid,
    pub schedule: FlightSchedule,
    pub live: LiveFlightState,
}

impl FlightResult {
    pub fn departure_hour(&self) -> CoreResult<u32> {
        hour_of(&self.schedule.departure_time)
    }

    pub fn arrival_hour(&self) -> CoreResult<u32> {
        hour_of(&self.schedule.arrival_time)
    }
}

/// Truncate "HH:MM[:SS]" to "HH:MM", rejecting anything else.
pub fn normalize_time(raw: &str) -> CoreResult<String> {
    let hhmm = raw.get(..5).ok_or_else(|| CoreError::InvalidTime(raw.to_string()))?;
    let (h, m) = hhmm
        .split_once(':')
        .ok_or_else(|| CoreError::InvalidTime(raw.to_string()))?;
    let valid = h.len() == 2
        && m.len() == 2
        && h.parse::<u32>().map(|h| h < 24).unwrap_or(false)
        && m.parse::<u32>().map(|m| m < 60).unwrap_or(false);
    if !valid {
        return Err(CoreError::InvalidTime(raw.to_string()));
    }
    Ok(hhmm.to_string())
}

fn hour_of(hhmm: &str) -> CoreResult<u32> {
    hhmm.get(..2)
        .and_then(|h| h.parse::<u32>().ok())
        .filter(|h| *h < 24)
        .ok_or_else(|| CoreError::InvalidTime(hhmm.to_string()))
}

/// Structured filter handed to the data query collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlightQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub date: Option<NaiveDate>,
    pub on_or_after: Option<NaiveDate>,
    pub status: Option<FlightStatus>,
}

impl FlightQuery {
    /// Search page query: scheduled flights on a date between two places.
    pub fn search(from: impl Into<String>, to: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            from: Some(from.into()).filter(|s: &String| !s.is_empty()),
            to: Some(to.into()).filter(|s: &String| !s.is_empty()),
            date: Some(date),
            on_or_after: None,
            status: Some(FlightStatus::Scheduled),
        }
    }

    /// Status board query: every flight from `today` onward.
    pub fn status_board(today: NaiveDate) -> Self {
        Self {
            on_or_after: Some(today),
            ..Default::default()
        }
    }

    pub fn matches(&self, flight: &FlightResult) -> bool {
        if let Some(status) = self.status {
            if flight.live.status != status {
                return false;
            }
        }
        if let Some(date) = self.date {
            if flight.schedule.flight_date != date {
                return false;
            }
        }
        if let Some(start) = self.on_or_after {
            if flight.schedule.flight_date < start {
                return false;
            }
        }
        if let Some(from) = &self.from {
            if !flight.schedule.source.matches(from) {
                return false;
            }
        }
        if let Some(to) = &self.to {
            if !flight.schedule.destination.matches(to) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn airport(code: &str, city: &str) -> Airport {
        Airport {
            code: code.to_string(),
            city: city.to_string(),
            name: format!("{} International", city),
            country: "USA".to_string(),
            terminal_info: None,
        }
    }

    pub fn flight(number: &str, date: NaiveDate, departure: &str) -> FlightResult {
        FlightResult {
            id: Uuid::new_v4(),
            schedule: FlightSchedule {
                flight_number: number.to_string(),
                airline: "SkyBook Air".to_string(),
                source: airport("JFK", "New York"),
                destination: airport("LAX", "Los Angeles"),
                flight_date: date,
                departure_time: departure.to_string(),
                arrival_time: "10:30".to_string(),
                duration_minutes: 330,
                distance_km: 3983,
                aircraft_model: None,
            },
            live: LiveFlightState::new(
                FlightStatus::Scheduled,
                None,
                Fares { economy_cents: 19900, business_cents: 49900, first_class_cents: None },
                SeatCounts { economy: 120, business: 16, first_class: 0 },
            ),
        }
    }
}
