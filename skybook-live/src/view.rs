use serde::{Deserialize, Serialize};
use skybook_core::search::FlightResult;
use std::collections::BTreeSet;

const DEFAULT_PRICE_CEILING_CENTS: i64 = 5_000_000;
const PRICE_CEILING_STEP_CENTS: i64 = 10_000;

/// Departure/arrival window, by hour of day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TimeSlot {
    Early,
    Morning,
    Afternoon,
    Evening,
}

impl TimeSlot {
    pub fn from_hour(hour: u32) -> Option<Self> {
        match hour {
            0..=5 => Some(TimeSlot::Early),
            6..=11 => Some(TimeSlot::Morning),
            12..=17 => Some(TimeSlot::Afternoon),
            18..=23 => Some(TimeSlot::Evening),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeSlot::Early => "Before 6 AM",
            TimeSlot::Morning => "6 AM - 12 PM",
            TimeSlot::Afternoon => "12 PM - 6 PM",
            TimeSlot::Evening => "After 6 PM",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    PriceAsc,
    PriceDesc,
    DepartureAsc,
    DepartureDesc,
    DurationAsc,
    DurationDesc,
}

/// Inclusive economy fare bounds, in cents.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceRange {
    pub min_cents: i64,
    pub max_cents: i64,
}

impl PriceRange {
    pub fn new(min_cents: i64, max_cents: i64) -> Self {
        Self { min_cents, max_cents }
    }

    pub fn contains(&self, cents: i64) -> bool {
        self.min_cents <= cents && cents <= self.max_cents
    }
}

/// Search page filter state. Every criterion is AND-ed; an empty set or an
/// absent range means "no restriction".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FlightFilters {
    pub airlines: BTreeSet<String>,
    pub price_range: Option<PriceRange>,
    pub stops: BTreeSet<u8>,
    pub departure_slots: BTreeSet<TimeSlot>,
    pub arrival_slots: BTreeSet<TimeSlot>,
}

impl FlightFilters {
    /// Number of criteria that actually narrow the list. A price range
    /// spanning `[0, ceiling]` does not count.
    pub fn active_count(&self, ceiling_cents: i64) -> usize {
        let price_active = self
            .price_range
            .map(|r| r != PriceRange::new(0, ceiling_cents))
            .unwrap_or(false);

        [
            !self.airlines.is_empty(),
            price_active,
            !self.stops.is_empty(),
            !self.departure_slots.is_empty(),
            !self.arrival_slots.is_empty(),
        ]
        .iter()
        .filter(|active| **active)
        .count()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn admits(&self, flight: &FlightResult) -> bool {
        if !self.airlines.is_empty() && !self.airlines.contains(&flight.schedule.airline) {
            return false;
        }
        if let Some(range) = self.price_range {
            if !range.contains(flight.live.fares.economy_cents) {
                return false;
            }
        }
        // every flight in the catalog is non-stop
        if !self.stops.is_empty() && !self.stops.contains(&0) {
            return false;
        }
        if !slot_admits(&self.departure_slots, flight.departure_hour().ok()) {
            return false;
        }
        slot_admits(&self.arrival_slots, flight.arrival_hour().ok())
    }
}

fn slot_admits(slots: &BTreeSet<TimeSlot>, hour: Option<u32>) -> bool {
    if slots.is_empty() {
        return true;
    }
    hour.and_then(TimeSlot::from_hour)
        .map(|slot| slots.contains(&slot))
        .unwrap_or(false)
}

/// Filtered, sorted projection of the canonical list. Pure: the same
/// inputs always give the same membership and order.
pub fn derive_view<'a>(flights: &'a [FlightResult], filters: &FlightFilters, sort: SortKey) -> Vec<&'a FlightResult> {
    let mut view: Vec<&FlightResult> = flights.iter().filter(|f| filters.admits(f)).collect();

    match sort {
        SortKey::PriceAsc => view.sort_by_key(|f| f.live.fares.economy_cents),
        SortKey::PriceDesc => view.sort_by(|a, b| b.live.fares.economy_cents.cmp(&a.live.fares.economy_cents)),
        SortKey::DepartureAsc => view.sort_by(|a, b| a.schedule.departure_time.cmp(&b.schedule.departure_time)),
        SortKey::DepartureDesc => view.sort_by(|a, b| b.schedule.departure_time.cmp(&a.schedule.departure_time)),
        SortKey::DurationAsc => view.sort_by_key(|f| f.schedule.duration_minutes),
        SortKey::DurationDesc => view.sort_by(|a, b| b.schedule.duration_minutes.cmp(&a.schedule.duration_minutes)),
    }
    view
}

/// Distinct airline names, sorted.
pub fn available_airlines(flights: &[FlightResult]) -> Vec<String> {
    flights
        .iter()
        .map(|f| f.schedule.airline.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Upper bound for the price slider: the highest economy fare rounded up
/// to the next 100.00.
pub fn price_ceiling(flights: &[FlightResult]) -> i64 {
    match flights.iter().map(|f| f.live.fares.economy_cents).max() {
        Some(max) if max > 0 => (max + PRICE_CEILING_STEP_CENTS - 1) / PRICE_CEILING_STEP_CENTS * PRICE_CEILING_STEP_CENTS,
        Some(_) => PRICE_CEILING_STEP_CENTS,
        None => DEFAULT_PRICE_CEILING_CENTS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::flight;
    use proptest::prelude::*;

    fn prices(view: &[&FlightResult]) -> Vec<i64> {
        view.iter().map(|f| f.live.fares.economy_cents).collect()
    }

    #[test]
    fn test_price_range_keeps_cheaper_flights_sorted() {
        let flights = vec![
            flight("SB300", "SkyBook Air", 30000, "10:00", 300),
            flight("SB150", "SkyBook Air", 15000, "08:00", 300),
            flight("SB200", "Coastal", 20000, "14:00", 300),
        ];
        let filters = FlightFilters {
            price_range: Some(PriceRange::new(0, 25000)),
            ..Default::default()
        };

        let view = derive_view(&flights, &filters, SortKey::PriceAsc);
        assert_eq!(prices(&view), vec![15000, 20000]);
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let flights = vec![flight("SB1", "A", 25000, "10:00", 60)];
        let filters = FlightFilters {
            price_range: Some(PriceRange::new(25000, 25000)),
            ..Default::default()
        };
        assert_eq!(derive_view(&flights, &filters, SortKey::PriceAsc).len(), 1);
    }

    #[test]
    fn test_airline_and_slot_filters_combine() {
        let flights = vec![
            flight("SB1", "SkyBook Air", 100, "05:30", 60),
            flight("SB2", "SkyBook Air", 100, "07:00", 60),
            flight("CO1", "Coastal", 100, "07:15", 60),
            flight("SB3", "SkyBook Air", 100, "19:45", 60),
        ];
        let filters = FlightFilters {
            airlines: BTreeSet::from(["SkyBook Air".to_string()]),
            departure_slots: BTreeSet::from([TimeSlot::Morning, TimeSlot::Evening]),
            ..Default::default()
        };

        let numbers: Vec<&str> = derive_view(&flights, &filters, SortKey::DepartureAsc)
            .iter()
            .map(|f| f.schedule.flight_number.as_str())
            .collect();
        assert_eq!(numbers, vec!["SB2", "SB3"]);
    }

    #[test]
    fn test_stops_filter_requires_non_stop() {
        let flights = vec![flight("SB1", "A", 100, "10:00", 60)];
        let mut filters = FlightFilters {
            stops: BTreeSet::from([1, 2]),
            ..Default::default()
        };
        assert!(derive_view(&flights, &filters, SortKey::PriceAsc).is_empty());

        filters.stops.insert(0);
        assert_eq!(derive_view(&flights, &filters, SortKey::PriceAsc).len(), 1);
    }

    #[test]
    fn test_sorts_are_stable() {
        let flights = vec![
            flight("SB1", "A", 100, "10:00", 90),
            flight("SB2", "A", 100, "08:00", 60),
            flight("SB3", "A", 50, "12:00", 90),
        ];
        let ids = |view: Vec<&FlightResult>| -> Vec<String> {
            view.iter().map(|f| f.schedule.flight_number.clone()).collect()
        };

        let none = FlightFilters::default();
        assert_eq!(ids(derive_view(&flights, &none, SortKey::PriceAsc)), vec!["SB3", "SB1", "SB2"]);
        assert_eq!(ids(derive_view(&flights, &none, SortKey::PriceDesc)), vec!["SB1", "SB2", "SB3"]);
        assert_eq!(ids(derive_view(&flights, &none, SortKey::DepartureDesc)), vec!["SB3", "SB1", "SB2"]);
        assert_eq!(ids(derive_view(&flights, &none, SortKey::DurationAsc)), vec!["SB2", "SB1", "SB3"]);
        assert_eq!(ids(derive_view(&flights, &none, SortKey::DurationDesc)), vec!["SB1", "SB3", "SB2"]);
    }

    #[test]
    fn test_airlines_and_ceiling() {
        let flights = vec![
            flight("SB1", "SkyBook Air", 19900, "10:00", 60),
            flight("CO1", "Coastal", 45050, "10:00", 60),
            flight("SB2", "SkyBook Air", 15000, "10:00", 60),
        ];
        assert_eq!(available_airlines(&flights), vec!["Coastal", "SkyBook Air"]);
        assert_eq!(price_ceiling(&flights), 50000);
        assert_eq!(price_ceiling(&[]), DEFAULT_PRICE_CEILING_CENTS);
    }

    #[test]
    fn test_active_count_and_reset() {
        let mut filters = FlightFilters::default();
        assert_eq!(filters.active_count(50000), 0);

        filters.price_range = Some(PriceRange::new(0, 50000));
        assert_eq!(filters.active_count(50000), 0);

        filters.price_range = Some(PriceRange::new(0, 30000));
        filters.airlines.insert("Coastal".to_string());
        filters.arrival_slots.insert(TimeSlot::Evening);
        assert_eq!(filters.active_count(50000), 3);

        filters.reset();
        assert_eq!(filters, FlightFilters::default());
    }

    fn slot() -> impl Strategy<Value = TimeSlot> {
        prop_oneof![
            Just(TimeSlot::Early),
            Just(TimeSlot::Morning),
            Just(TimeSlot::Afternoon),
            Just(TimeSlot::Evening),
        ]
    }

    fn sort_key() -> impl Strategy<Value = SortKey> {
        prop_oneof![
            Just(SortKey::PriceAsc),
            Just(SortKey::PriceDesc),
            Just(SortKey::DepartureAsc),
            Just(SortKey::DepartureDesc),
            Just(SortKey::DurationAsc),
            Just(SortKey::DurationDesc),
        ]
    }

    proptest! {
        #[test]
        fn prop_view_is_pure(
            rows in prop::collection::vec((0i64..100_000, 0u32..24, 30u32..900, 0usize..3), 0..20),
            min in 0i64..50_000,
            span in 0i64..60_000,
            slots in prop::collection::btree_set(slot(), 0..3),
            sort in sort_key(),
        ) {
            let airlines = ["SkyBook Air", "Coastal", "Northwind"];
            let flights: Vec<FlightResult> = rows
                .iter()
                .map(|(price, hour, duration, airline)| {
                    flight("XX1", airlines[*airline], *price, &format!("{:02}:00", hour), *duration)
                })
                .collect();
            let filters = FlightFilters {
                price_range: Some(PriceRange::new(min, min + span)),
                departure_slots: slots,
                ..Default::default()
            };

            let first: Vec<_> = derive_view(&flights, &filters, sort).iter().map(|f| f.id).collect();
            let second: Vec<_> = derive_view(&flights, &filters, sort).iter().map(|f| f.id).collect();
            prop_assert_eq!(first, second);
        }
    }
}
