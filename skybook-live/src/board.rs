use serde::Serialize;
use skybook_core::search::FlightResult;
use skybook_shared::FlightStatus;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BoardDirection {
    #[default]
    Departures,
    Arrivals,
}

/// One line of the airport status board.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BoardRow {
    pub flight_id: Uuid,
    pub flight_number: String,
    pub airline: String,
    /// Destination on the departures board, origin on the arrivals board.
    pub counterpart_city: String,
    pub counterpart_code: String,
    pub scheduled_time: String,
    pub gate: String,
    pub status: FlightStatus,
    pub status_label: &'static str,
}

/// Free-text match on flight number, or on source/destination city or code.
pub fn matches_query(flight: &FlightResult, query: &str) -> bool {
    let needle = query.trim();
    if needle.is_empty() {
        return true;
    }
    flight
        .schedule
        .flight_number
        .to_lowercase()
        .contains(&needle.to_lowercase())
        || flight.schedule.source.matches(needle)
        || flight.schedule.destination.matches(needle)
}

pub fn board_rows(flights: &[FlightResult], query: &str, direction: BoardDirection) -> Vec<BoardRow> {
    flights
        .iter()
        .filter(|f| matches_query(f, query))
        .map(|f| {
            let (airport, time) = match direction {
                BoardDirection::Departures => (&f.schedule.destination, &f.schedule.departure_time),
                BoardDirection::Arrivals => (&f.schedule.source, &f.schedule.arrival_time),
            };
            BoardRow {
                flight_id: f.id,
                flight_number: f.schedule.flight_number.clone(),
                airline: f.schedule.airline.clone(),
                counterpart_city: airport.city.clone(),
                counterpart_code: airport.code.clone(),
                scheduled_time: time.clone(),
                gate: f.live.gate_display().to_string(),
                status: f.live.status,
                status_label: f.live.status.label(),
            }
        })
        .collect()
}
