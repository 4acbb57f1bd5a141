use async_trait::async_trait;
use skybook_core::repository::SeatMapProvider;
use skybook_core::search::FareClass;
use skybook_core::CollaboratorError;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

/// Seat occupancy per flight. Every flight starts from the same baseline
/// of taken seats; confirmed bookings add to it.
pub struct StaticSeatMap {
    baseline: HashSet<String>,
    booked: RwLock<HashMap<Uuid, HashSet<String>>>,
}

impl StaticSeatMap {
    pub fn new<I, S>(baseline: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            baseline: baseline.into_iter().map(|s| s.as_ref().trim().to_uppercase()).collect(),
            booked: RwLock::new(HashMap::new()),
        }
    }

    pub async fn mark_booked<I, S>(&self, flight_id: Uuid, seats: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut booked = self.booked.write().await;
        let entry = booked.entry(flight_id).or_default();
        let before = entry.len();
        entry.extend(seats.into_iter().map(|s| s.as_ref().trim().to_uppercase()));
        info!("Marked {} seats booked on flight {}", entry.len() - before, flight_id);
    }
}

#[async_trait]
impl SeatMapProvider for StaticSeatMap {
    async fn booked_seats(
        &self,
        flight_id: Uuid,
        _fare_class: FareClass,
    ) -> Result<HashSet<String>, CollaboratorError> {
        let mut seats = self.baseline.clone();
        if let Some(extra) = self.booked.read().await.get(&flight_id) {
            seats.extend(extra.iter().cloned());
        }
        Ok(seats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_baseline_plus_confirmed_bookings() {
        let map = StaticSeatMap::new(["2a", "3C"]);
        let flight = Uuid::new_v4();
        let other = Uuid::new_v4();

        map.mark_booked(flight, ["12C", "12D"]).await;

        let seats = map.booked_seats(flight, FareClass::Economy).await.unwrap();
        assert_eq!(seats.len(), 4);
        assert!(seats.contains("2A"));
        assert!(seats.contains("12D"));

        let untouched = map.booked_seats(other, FareClass::Economy).await.unwrap();
        assert_eq!(untouched.len(), 2);
    }
}
