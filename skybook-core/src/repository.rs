use async_trait::async_trait;
use std::collections::HashSet;
use uuid::Uuid;

use crate::search::{FareClass, FlightQuery, FlightResult};
use crate::session::Session;
use crate::CollaboratorError;

/// Data query collaborator for flight instances.
#[async_trait]
pub trait FlightRepository: Send + Sync {
    /// Returns matching flight instances ordered by departure time.
    async fn find_flights(
        &self,
        session: &Session,
        query: &FlightQuery,
    ) -> Result<Vec<FlightResult>, CollaboratorError>;
}

/// Seat-map collaborator. The wizard treats the answer as a point-in-time snapshot.
#[async_trait]
pub trait SeatMapProvider: Send + Sync {
    async fn booked_seats(
        &self,
        flight_id: Uuid,
        fare_class: FareClass,
    ) -> Result<HashSet<String>, CollaboratorError>;
}
