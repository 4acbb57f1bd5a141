use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Operational status of a flight instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum FlightStatus {
    #[default]
    Scheduled,
    Boarding,
    Departed,
    Arrived,
    Delayed,
    Cancelled,
}

impl FlightStatus {
    pub fn label(&self) -> &'static str {
        match self {
            FlightStatus::Scheduled => "Scheduled",
            FlightStatus::Boarding => "Boarding",
            FlightStatus::Departed => "Departed",
            FlightStatus::Arrived => "Arrived",
            FlightStatus::Delayed => "Delayed",
            FlightStatus::Cancelled => "Cancelled",
        }
    }
}

/// Partial row change pushed by the realtime feed for `flight_instances`.
///
/// Only fields that are `Some` are applied; everything else keeps its
/// prior value on the receiving side.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlightUpdateEvent {
    pub flight_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<FlightStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub economy_price_cents: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_price_cents: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_class_price_cents: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_economy_seats: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_business_seats: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_first_class_seats: Option<u32>,
}

impl FlightUpdateEvent {
    pub fn new(flight_id: Uuid) -> Self {
        Self {
            flight_id,
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: FlightStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_gate(mut self, gate: impl Into<String>) -> Self {
        self.gate = Some(gate.into());
        self
    }
}

/// Informational toast raised when a tracked flight changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlightChangeNotice {
    pub flight_id: Uuid,
    pub flight_number: String,
    pub title: String,
    pub description: String,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookingConfirmedEvent {
    pub booking_id: String,
    pub pnr: String,
    pub flight_id: Uuid,
    pub customer_id: Option<Uuid>,
    pub passenger_count: usize,
    /// Cabin the seats were taken in ("economy", "business", "first").
    pub cabin: String,
    pub seats: Vec<String>,
    pub total_cents: i64,
    pub currency: String,
    pub timestamp: i64,
}
