use chrono::Utc;
use serde::Serialize;
use skybook_catalog::{PriceBreakdown, PricingEngine, SeatCode, SeatMapSnapshot, SelectedAddon};
use skybook_core::payment::{PaymentDetails, PaymentMethod, PaymentRequest, PaymentStatus};
use skybook_core::{FareClass, FlightResult, SeatMapProvider, Session};
use skybook_shared::BookingConfirmedEvent;
use std::collections::{BTreeMap, HashMap, HashSet};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::error::BookingError;
use crate::models::{BookingDraft, Passenger, PassengerForm, PassengerId, PaymentRecord, Stage};
use crate::orchestrator::PaymentOrchestrator;

/// Result of a successful payment.
#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmation {
    pub booking_id: String,
    pub pnr: String,
    pub transaction_id: String,
    pub total_cents: i64,
}

/// Drives one booking draft through the five ordered stages.
///
/// Forward moves happen only through the `submit_*`/`continue_*` operations
/// after their stage validates. Backward moves never discard captured data.
pub struct BookingWizard {
    session: Session,
    stage: Stage,
    draft: BookingDraft,
    seat_map: SeatMapSnapshot,
    pricing: PricingEngine,
    payments: PaymentOrchestrator,
    confirmations: Option<broadcast::Sender<BookingConfirmedEvent>>,
}

impl BookingWizard {
    /// Opens a wizard for `flight`, taking a point-in-time seat map snapshot.
    pub async fn start(
        session: Session,
        flight: &FlightResult,
        fare_class: FareClass,
        seat_maps: &dyn SeatMapProvider,
        payments: PaymentOrchestrator,
        pricing: PricingEngine,
    ) -> Result<Self, BookingError> {
        let booked = seat_maps
            .booked_seats(flight.id, fare_class)
            .await
            .map_err(|e| BookingError::Fetch(e.to_string()))?;
        let seat_map = SeatMapSnapshot::new(flight.id, fare_class, booked);
        debug!(
            "Seat map snapshot for flight {} ({:?}): {} booked",
            flight.id,
            fare_class,
            seat_map.booked_count()
        );

        let draft = BookingDraft::new(
            flight.id,
            flight.schedule.flight_number.clone(),
            fare_class,
            flight.live.fares,
        );
        info!(draft_id = %draft.id, flight = %draft.flight_number, "Booking started");

        Ok(Self {
            session,
            stage: Stage::PassengerDetails,
            draft,
            seat_map,
            pricing,
            payments,
            confirmations: None,
        })
    }

    /// Publish a `BookingConfirmedEvent` here once payment succeeds.
    pub fn with_confirmation_sink(mut self, sink: broadcast::Sender<BookingConfirmedEvent>) -> Self {
        self.confirmations = Some(sink);
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn seat_map(&self) -> &SeatMapSnapshot {
        &self.seat_map
    }

    /// Stage 1 -> 2.
    pub fn submit_passengers(&mut self, forms: Vec<PassengerForm>) -> Result<(), BookingError> {
        self.expect_stage(Stage::PassengerDetails, Stage::SeatSelection)?;

        if forms.is_empty() {
            return Err(BookingError::Validation("At least one passenger is required".to_string()));
        }

        let mut seen_ids = HashSet::new();
        for (i, form) in forms.iter().enumerate() {
            let missing = form.missing_fields();
            if !missing.is_empty() {
                return Err(BookingError::Validation(format!(
                    "Passenger {} is missing {}",
                    i + 1,
                    missing.join(", ")
                )));
            }
            if let Some(id) = form.id {
                if !self.draft.knows_passenger(id) {
                    return Err(BookingError::Validation(format!("Unknown passenger {}", id)));
                }
                if !seen_ids.insert(id) {
                    return Err(BookingError::Validation(format!("Passenger {} appears twice", id)));
                }
            }
        }

        let mut passengers = Vec::with_capacity(forms.len());
        for form in forms {
            let id = match form.id {
                Some(id) => id,
                None => self.draft.allocate_passenger_id(),
            };
            // missing_fields() above guarantees these are present
            let (Some(age), Some(gender), Some(id_type)) = (form.age, form.gender, form.id_type) else {
                return Err(BookingError::Validation(format!("Passenger {} is incomplete", id)));
            };
            passengers.push(Passenger {
                id,
                full_name: form.full_name.trim().to_string(),
                age,
                gender,
                id_type,
                id_number: form.id_number,
            });
        }

        self.draft.passengers = passengers;
        let dropped_seats = self.retain_seats_of_current_passengers();
        self.reclamp_addons();
        if dropped_seats > 0 {
            debug!(draft_id = %self.draft.id, dropped_seats, "Released seats of removed passengers");
        }

        self.advance(Stage::SeatSelection);
        Ok(())
    }

    /// Interactive pick during stage 2. Choosing the seat a passenger
    /// already holds releases it.
    pub fn assign_seat(&mut self, passenger: PassengerId, seat: &str) -> Result<(), BookingError> {
        self.expect_stage(Stage::SeatSelection, Stage::SeatSelection)?;
        if !self.draft.knows_passenger(passenger) {
            return Err(BookingError::Validation(format!("Unknown passenger {}", passenger)));
        }
        let code = parse_seat(seat)?;
        if self.seat_map.is_booked(&code) {
            return Err(BookingError::seat_booked(code.to_string()));
        }

        if self.draft.selected_seats.get(&passenger) == Some(&code) {
            self.draft.selected_seats.remove(&passenger);
            return Ok(());
        }
        let held_by_other = self
            .draft
            .selected_seats
            .iter()
            .any(|(holder, held)| *holder != passenger && *held == code);
        if held_by_other {
            return Err(BookingError::seat_taken(code.to_string()));
        }

        self.draft.selected_seats.insert(passenger, code);
        Ok(())
    }

    pub fn release_seat(&mut self, passenger: PassengerId) -> Result<(), BookingError> {
        self.expect_stage(Stage::SeatSelection, Stage::SeatSelection)?;
        self.draft.selected_seats.remove(&passenger);
        Ok(())
    }

    /// Submit whatever `assign_seat` has built up.
    pub fn confirm_seats(&mut self) -> Result<(), BookingError> {
        let current = self
            .draft
            .selected_seats
            .iter()
            .map(|(id, seat)| (*id, seat.to_string()))
            .collect();
        self.submit_seats(current)
    }

    /// Stage 2 -> 3. The mapping must cover every passenger exactly once.
    pub fn submit_seats(&mut self, mapping: BTreeMap<PassengerId, String>) -> Result<(), BookingError> {
        self.expect_stage(Stage::SeatSelection, Stage::Addons)?;

        let mut parsed = BTreeMap::new();
        let mut holders: HashMap<SeatCode, PassengerId> = HashMap::new();
        for (passenger, raw) in &mapping {
            if !self.draft.knows_passenger(*passenger) {
                return Err(BookingError::Validation(format!("Unknown passenger {}", passenger)));
            }
            let code = parse_seat(raw)?;
            if self.seat_map.is_booked(&code) {
                return Err(BookingError::seat_booked(code.to_string()));
            }
            if holders.insert(code.clone(), *passenger).is_some() {
                return Err(BookingError::seat_taken(code.to_string()));
            }
            parsed.insert(*passenger, code);
        }

        if parsed.len() != self.draft.passengers.len() {
            return Err(BookingError::Validation(format!(
                "Please select seats for all passengers ({} of {} assigned)",
                parsed.len(),
                self.draft.passengers.len()
            )));
        }

        self.draft.selected_seats = parsed;
        self.advance(Stage::Addons);
        Ok(())
    }

    /// Stage 3 edit. Add-ons are optional, so nothing here is rejected:
    /// duplicates collapse (last one wins) and quantities are clamped.
    pub fn update_addons(&mut self, selections: Vec<SelectedAddon>) -> Result<(), BookingError> {
        self.expect_stage(Stage::Addons, Stage::Addons)?;

        let mut addons: Vec<SelectedAddon> = Vec::with_capacity(selections.len());
        for selection in selections {
            match addons.iter_mut().find(|a| a.addon.id == selection.addon.id) {
                Some(existing) => *existing = selection,
                None => addons.push(selection),
            }
        }
        self.draft.addons = addons;
        self.reclamp_addons();
        Ok(())
    }

    /// Stage 3 -> 4.
    pub fn continue_to_payment(&mut self) -> Result<(), BookingError> {
        self.expect_stage(Stage::Addons, Stage::Payment)?;
        self.advance(Stage::Payment);
        Ok(())
    }

    /// Price summary for the draft as it stands. The same figure is charged.
    pub fn price_summary(&self) -> PriceBreakdown {
        self.pricing.quote(
            &self.draft.fares,
            self.draft.fare_class,
            self.draft.passengers.len(),
            &self.draft.addons,
        )
    }

    /// Stage 4 -> 5. A gateway failure keeps the wizard at stage 4 so the
    /// user can retry or switch method.
    pub async fn submit_payment(
        &mut self,
        method: PaymentMethod,
        details: PaymentDetails,
    ) -> Result<BookingConfirmation, BookingError> {
        self.expect_stage(Stage::Payment, Stage::Confirmation)?;

        let missing = details.missing_fields(method);
        if !missing.is_empty() {
            return Err(BookingError::Validation(format!(
                "Please fill in all payment details (missing {})",
                missing.join(", ")
            )));
        }

        let quote = self.price_summary();
        let card_last_four = match method {
            PaymentMethod::Card => details.card_number.as_ref().map(|n| n.last_four()),
            _ => None,
        };
        let request = PaymentRequest {
            draft_id: self.draft.id,
            customer_id: self.session.user_id,
            method,
            amount_cents: quote.total_amount,
            currency: self.pricing.currency().to_string(),
            details,
        };

        let outcome = self.payments.charge(&request).await;
        let receipt = match outcome {
            Ok(receipt) if receipt.status == PaymentStatus::Succeeded => receipt,
            Ok(receipt) => return Err(self.payment_failed(format!("Payment {:?}", receipt.status))),
            Err(e) => return Err(self.payment_failed(e.to_string())),
        };

        let (booking_id, pnr) = self.payments.issue_references();
        self.draft.payment = Some(PaymentRecord {
            method,
            amount_cents: quote.total_amount,
            currency: request.currency.clone(),
            transaction_id: receipt.transaction_id.clone(),
            card_last_four,
            paid_at: receipt.processed_at,
        });
        self.draft.booking_id = Some(booking_id.clone());
        self.draft.pnr = Some(pnr.clone());
        self.draft.last_payment_error = None;
        self.advance(Stage::Confirmation);
        info!(
            draft_id = %self.draft.id,
            booking_id = %booking_id,
            amount_cents = quote.total_amount,
            "Booking confirmed"
        );

        if let Some(sink) = &self.confirmations {
            let event = BookingConfirmedEvent {
                booking_id: booking_id.clone(),
                pnr: pnr.clone(),
                flight_id: self.draft.flight_id,
                customer_id: self.session.user_id,
                passenger_count: self.draft.passengers.len(),
                cabin: self.draft.fare_class.as_str().to_string(),
                seats: self.draft.selected_seats.values().map(ToString::to_string).collect(),
                total_cents: quote.total_amount,
                currency: request.currency,
                timestamp: Utc::now().timestamp(),
            };
            if sink.send(event).is_err() {
                debug!("No listeners for booking confirmations");
            }
        }

        Ok(BookingConfirmation {
            booking_id,
            pnr,
            transaction_id: receipt.transaction_id,
            total_cents: quote.total_amount,
        })
    }

    /// One stage back. Not available from the first stage or after confirmation.
    pub fn go_back(&mut self) -> Result<(), BookingError> {
        let target = self
            .stage
            .previous()
            .ok_or(BookingError::CannotGoBack(self.stage))?;
        self.go_back_to(target)
    }

    /// Jump back to any earlier stage to re-edit it.
    pub fn go_back_to(&mut self, target: Stage) -> Result<(), BookingError> {
        if self.stage == Stage::Confirmation {
            return Err(BookingError::CannotGoBack(self.stage));
        }
        if target >= self.stage {
            return Err(BookingError::InvalidTransition {
                from: self.stage,
                to: target,
            });
        }
        debug!(draft_id = %self.draft.id, from = %self.stage, to = %target, "Going back");
        self.stage = target;
        Ok(())
    }

    fn expect_stage(&self, required: Stage, to: Stage) -> Result<(), BookingError> {
        if self.stage != required {
            return Err(BookingError::InvalidTransition { from: self.stage, to });
        }
        Ok(())
    }

    fn advance(&mut self, to: Stage) {
        debug!(draft_id = %self.draft.id, from = %self.stage, to = %to, "Stage advanced");
        self.stage = to;
    }

    fn payment_failed(&mut self, reason: String) -> BookingError {
        warn!(draft_id = %self.draft.id, "Payment rejected: {}", reason);
        self.draft.last_payment_error = Some(reason.clone());
        BookingError::Payment(reason)
    }

    fn retain_seats_of_current_passengers(&mut self) -> usize {
        let before = self.draft.selected_seats.len();
        let current: HashSet<PassengerId> = self.draft.passengers.iter().map(|p| p.id).collect();
        self.draft.selected_seats.retain(|id, _| current.contains(id));
        before - self.draft.selected_seats.len()
    }

    fn reclamp_addons(&mut self) {
        let passenger_count = self.draft.passengers.len();
        for selected in &mut self.draft.addons {
            selected.quantity = selected.addon.clamp_quantity(selected.quantity, passenger_count);
        }
    }
}

fn parse_seat(raw: &str) -> Result<SeatCode, BookingError> {
    SeatCode::parse(raw).map_err(|e| BookingError::Validation(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;
    use crate::orchestrator::MockPaymentAdapter;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use skybook_catalog::AddonCatalog;
    use skybook_core::search::{Airport, Fares, FlightSchedule, LiveFlightState, SeatCounts};
    use skybook_core::CollaboratorError;
    use skybook_shared::FlightStatus;
    use std::sync::Arc;
    use uuid::Uuid;

    struct FixedSeatMap(Vec<&'static str>);

    #[async_trait]
    impl SeatMapProvider for FixedSeatMap {
        async fn booked_seats(&self, _flight_id: Uuid, _fare_class: FareClass) -> Result<HashSet<String>, CollaboratorError> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct BrokenSeatMap;

    #[async_trait]
    impl SeatMapProvider for BrokenSeatMap {
        async fn booked_seats(&self, _flight_id: Uuid, _fare_class: FareClass) -> Result<HashSet<String>, CollaboratorError> {
            Err("seat map service unavailable".into())
        }
    }

    fn airport(code: &str, city: &str) -> Airport {
        Airport {
            code: code.to_string(),
            city: city.to_string(),
            name: city.to_string(),
            country: "USA".to_string(),
            terminal_info: None,
        }
    }

    fn flight() -> FlightResult {
        FlightResult {
            id: Uuid::new_v4(),
            schedule: FlightSchedule {
                flight_number: "SB101".to_string(),
                airline: "SkyBook Air".to_string(),
                source: airport("JFK", "New York"),
                destination: airport("LAX", "Los Angeles"),
                flight_date: NaiveDate::from_ymd_opt(2025, 12, 10).unwrap(),
                departure_time: "08:00".to_string(),
                arrival_time: "10:30".to_string(),
                duration_minutes: 330,
                distance_km: 3983,
                aircraft_model: Some("A320".to_string()),
            },
            live: LiveFlightState::new(
                FlightStatus::Scheduled,
                Some("A4".to_string()),
                Fares { economy_cents: 19900, business_cents: 49900, first_class_cents: None },
                SeatCounts { economy: 100, business: 12, first_class: 0 },
            ),
        }
    }

    async fn wizard_with(adapter: Arc<MockPaymentAdapter>) -> BookingWizard {
        BookingWizard::start(
            Session::anonymous(),
            &flight(),
            FareClass::Economy,
            &FixedSeatMap(vec!["2A", "2B", "3C", "5D", "7A", "7F"]),
            PaymentOrchestrator::new(adapter),
            PricingEngine::default(),
        )
        .await
        .unwrap()
    }

    async fn wizard() -> BookingWizard {
        wizard_with(Arc::new(MockPaymentAdapter::new())).await
    }

    fn two_passengers() -> Vec<PassengerForm> {
        vec![
            PassengerForm::new("Ana Lima", 34, Gender::Female, "P1234567"),
            PassengerForm::new("Ben Okafor", 41, Gender::Male, "P7654321"),
        ]
    }

    fn ids(w: &BookingWizard) -> (PassengerId, PassengerId) {
        let p = w.draft().passengers();
        (p[0].id, p[1].id)
    }

    fn seats(pairs: &[(PassengerId, &str)]) -> BTreeMap<PassengerId, String> {
        pairs.iter().map(|(id, s)| (*id, s.to_string())).collect()
    }

    async fn at_addons() -> BookingWizard {
        let mut w = wizard().await;
        w.submit_passengers(two_passengers()).unwrap();
        let (a, b) = ids(&w);
        w.submit_seats(seats(&[(a, "12C"), (b, "12D")])).unwrap();
        w
    }

    #[tokio::test]
    async fn test_start_fails_when_seat_map_unavailable() {
        let result = BookingWizard::start(
            Session::anonymous(),
            &flight(),
            FareClass::Economy,
            &BrokenSeatMap,
            PaymentOrchestrator::new(Arc::new(MockPaymentAdapter::new())),
            PricingEngine::default(),
        )
        .await;
        assert!(matches!(result, Err(BookingError::Fetch(_))));
    }

    #[tokio::test]
    async fn test_incomplete_passenger_rejected() {
        let mut w = wizard().await;
        let mut forms = two_passengers();
        forms[1].id_number = "".into();

        let err = w.submit_passengers(forms).unwrap_err();
        assert!(matches!(err, BookingError::Validation(ref m) if m.contains("Passenger 2")));
        assert_eq!(w.stage(), Stage::PassengerDetails);
        assert!(w.draft().passengers().is_empty());

        assert!(matches!(w.submit_passengers(vec![]), Err(BookingError::Validation(_))));
    }

    #[tokio::test]
    async fn test_partial_seat_mapping_rejected_then_complete_accepted() {
        let mut w = wizard().await;
        w.submit_passengers(two_passengers()).unwrap();
        assert_eq!(w.stage(), Stage::SeatSelection);
        assert!(w.draft().selected_seats().is_empty());
        let (a, b) = ids(&w);

        let err = w.submit_seats(seats(&[(a, "12C")])).unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
        assert_eq!(w.stage(), Stage::SeatSelection);

        w.submit_seats(seats(&[(a, "12C"), (b, "12D")])).unwrap();
        assert_eq!(w.stage(), Stage::Addons);
        assert_eq!(w.draft().seat_of(b).unwrap().to_string(), "12D");
    }

    #[tokio::test]
    async fn test_duplicate_and_booked_seats_rejected() {
        let mut w = wizard().await;
        w.submit_passengers(two_passengers()).unwrap();
        let (a, b) = ids(&w);

        let err = w.submit_seats(seats(&[(a, "12C"), (b, "12c")])).unwrap_err();
        assert!(matches!(err, BookingError::SeatUnavailable { ref seat, .. } if seat == "12C"));

        let err = w.submit_seats(seats(&[(a, "2A"), (b, "12D")])).unwrap_err();
        assert!(matches!(err, BookingError::SeatUnavailable { ref seat, .. } if seat == "2A"));

        let err = w.submit_seats(seats(&[(a, "ZZ"), (b, "12D")])).unwrap_err();
        assert!(matches!(err, BookingError::Validation(_)));
        assert!(w.draft().selected_seats().is_empty());
    }

    #[tokio::test]
    async fn test_interactive_assignment() {
        let mut w = wizard().await;
        w.submit_passengers(two_passengers()).unwrap();
        let (a, b) = ids(&w);

        assert!(matches!(w.assign_seat(a, "7A"), Err(BookingError::SeatUnavailable { .. })));
        w.assign_seat(a, "4B").unwrap();
        assert!(matches!(w.assign_seat(b, "4B"), Err(BookingError::SeatUnavailable { .. })));

        // re-picking the held seat toggles it off
        w.assign_seat(a, "4B").unwrap();
        assert!(w.draft().seat_of(a).is_none());

        w.assign_seat(a, "4B").unwrap();
        w.assign_seat(b, "4C").unwrap();
        w.assign_seat(a, "4A").unwrap();
        assert_eq!(w.draft().seat_of(a).unwrap().to_string(), "4A");

        w.confirm_seats().unwrap();
        assert_eq!(w.stage(), Stage::Addons);
    }

    #[tokio::test]
    async fn test_same_name_passengers_keep_separate_seats() {
        let mut w = wizard().await;
        w.submit_passengers(vec![
            PassengerForm::new("Sam Park", 30, Gender::Other, "A1"),
            PassengerForm::new("Sam Park", 8, Gender::Male, "A2"),
        ])
        .unwrap();
        let (a, b) = ids(&w);

        w.submit_seats(seats(&[(a, "9A"), (b, "9B")])).unwrap();
        assert_eq!(w.draft().selected_seats().len(), 2);
    }

    #[tokio::test]
    async fn test_addon_quantities_clamped() {
        let mut w = at_addons().await;
        let catalog = AddonCatalog::default();

        w.update_addons(vec![
            catalog.select("extra_baggage", 9).unwrap(),
            catalog.select("lounge_access", 3).unwrap(),
            catalog.select("meal_veg", 0).unwrap(),
            catalog.select("extra_baggage", 1).unwrap(),
        ])
        .unwrap();

        let addons = w.draft().addons();
        assert_eq!(addons.len(), 3);
        assert_eq!(addons[0].addon.id, "extra_baggage");
        assert_eq!(addons[0].quantity, 1);
        assert_eq!(addons[1].quantity, 1);
        assert_eq!(addons[2].quantity, 1);
        assert_eq!(w.stage(), Stage::Addons);

        w.continue_to_payment().unwrap();
        assert_eq!(w.stage(), Stage::Payment);
    }

    #[tokio::test]
    async fn test_going_back_keeps_later_stage_data() {
        let mut w = at_addons().await;
        let catalog = AddonCatalog::default();
        w.update_addons(vec![catalog.select("extra_baggage", 2).unwrap()]).unwrap();

        w.go_back_to(Stage::PassengerDetails).unwrap();
        let same: Vec<PassengerForm> = w.draft().passengers().iter().map(PassengerForm::from).collect();
        w.submit_passengers(same).unwrap();

        assert_eq!(w.stage(), Stage::SeatSelection);
        assert_eq!(w.draft().selected_seats().len(), 2);
        assert_eq!(w.draft().addons().len(), 1);
        assert_eq!(w.draft().addons()[0].quantity, 2);
    }

    #[tokio::test]
    async fn test_removing_passenger_drops_only_their_seat() {
        let mut w = at_addons().await;
        let catalog = AddonCatalog::default();
        w.update_addons(vec![catalog.select("extra_baggage", 2).unwrap()]).unwrap();
        let (a, b) = ids(&w);

        w.go_back().unwrap();
        w.go_back().unwrap();
        let mut first = PassengerForm::from(&w.draft().passengers()[0]);
        first.full_name = "Ana Lima Souza".to_string();
        w.submit_passengers(vec![first]).unwrap();

        assert_eq!(w.draft().seat_of(a).unwrap().to_string(), "12C");
        assert!(w.draft().seat_of(b).is_none());
        assert_eq!(w.draft().addons()[0].quantity, 1);
    }

    #[tokio::test]
    async fn test_back_navigation_rules() {
        let mut w = wizard().await;
        assert!(matches!(w.go_back(), Err(BookingError::CannotGoBack(Stage::PassengerDetails))));

        w.submit_passengers(two_passengers()).unwrap();
        assert!(matches!(
            w.go_back_to(Stage::Addons),
            Err(BookingError::InvalidTransition { .. })
        ));
        assert!(matches!(
            w.continue_to_payment(),
            Err(BookingError::InvalidTransition { from: Stage::SeatSelection, to: Stage::Payment })
        ));
    }

    #[tokio::test]
    async fn test_payment_total_matches_summary() {
        let adapter = Arc::new(MockPaymentAdapter::new());
        let mut w = wizard_with(adapter.clone()).await;
        w.submit_passengers(two_passengers()).unwrap();
        let (a, b) = ids(&w);
        w.submit_seats(seats(&[(a, "12C"), (b, "12D")])).unwrap();
        w.update_addons(vec![AddonCatalog::default().select("extra_baggage", 2).unwrap()]).unwrap();
        w.continue_to_payment().unwrap();

        let summary = w.price_summary();
        assert_eq!(summary.total_amount, 50770);

        let confirmation = w
            .submit_payment(PaymentMethod::Card, PaymentDetails::card("4242424242424242", "Ana Lima", "12/27", "123"))
            .await
            .unwrap();

        assert_eq!(w.stage(), Stage::Confirmation);
        assert_eq!(confirmation.total_cents, 50770);
        assert_eq!(adapter.approved_charges(), vec![50770]);
        assert_eq!(w.draft().booking_id(), Some(confirmation.booking_id.as_str()));
        assert_eq!(w.draft().payment().unwrap().card_last_four.as_deref(), Some("4242"));
        assert!(matches!(w.go_back(), Err(BookingError::CannotGoBack(Stage::Confirmation))));
    }

    #[tokio::test]
    async fn test_declined_receipt_keeps_payment_stage() {
        let adapter = Arc::new(MockPaymentAdapter::declining_first(1));
        let mut w = wizard_with(adapter.clone()).await;
        w.submit_passengers(two_passengers()).unwrap();
        let (a, b) = ids(&w);
        w.submit_seats(seats(&[(a, "12C"), (b, "12D")])).unwrap();
        w.continue_to_payment().unwrap();

        let err = w.submit_payment(PaymentMethod::Upi, PaymentDetails::upi("ana@upi")).await.unwrap_err();
        assert!(matches!(err, BookingError::Payment(ref m) if m.contains("Declined")));
        assert_eq!(w.stage(), Stage::Payment);
        assert!(w.draft().last_payment_error().is_some());
        assert!(w.draft().payment().is_none());
        assert!(adapter.approved_charges().is_empty());

        w.submit_payment(PaymentMethod::Upi, PaymentDetails::upi("ana@upi")).await.unwrap();
        assert_eq!(w.stage(), Stage::Confirmation);
        assert_eq!(adapter.approved_charges().len(), 1);
    }

    #[tokio::test]
    async fn test_payment_validation_and_retry() {
        let mut w = wizard_with(Arc::new(MockPaymentAdapter::failing_first(1))).await;
        w.submit_passengers(two_passengers()).unwrap();
        let (a, b) = ids(&w);
        w.submit_seats(seats(&[(a, "12C"), (b, "12D")])).unwrap();
        w.continue_to_payment().unwrap();

        let incomplete = PaymentDetails::card("4242424242424242", "", "12/27", "123");
        let err = w.submit_payment(PaymentMethod::Card, incomplete).await.unwrap_err();
        assert!(matches!(err, BookingError::Validation(ref m) if m.contains("card_holder")));

        let err = w.submit_payment(PaymentMethod::Upi, PaymentDetails::upi("ana@upi")).await.unwrap_err();
        assert!(matches!(err, BookingError::Payment(_)));
        assert_eq!(w.stage(), Stage::Payment);
        assert!(w.draft().last_payment_error().is_some());
        assert!(w.draft().booking_id().is_none());
        assert_eq!(w.draft().selected_seats().len(), 2);

        let (tx, mut rx) = broadcast::channel(4);
        w = w.with_confirmation_sink(tx);
        w.submit_payment(PaymentMethod::NetBanking, PaymentDetails::net_banking("First Bank"))
            .await
            .unwrap();
        assert_eq!(w.stage(), Stage::Confirmation);
        assert!(w.draft().last_payment_error().is_none());

        let event = rx.recv().await.unwrap();
        assert_eq!(event.passenger_count, 2);
        assert_eq!(event.seats, vec!["12C", "12D"]);
        assert_eq!(event.cabin, "economy");
        assert_eq!(Some(event.pnr.as_str()), w.draft().pnr());
    }
}
