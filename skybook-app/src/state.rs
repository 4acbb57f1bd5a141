use anyhow::Context;
use chrono::NaiveDate;
use skybook_booking::{BookingError, BookingWizard, MockPaymentAdapter, PaymentOrchestrator};
use skybook_catalog::{AddonCatalog, PricingConfig, PricingEngine};
use skybook_core::{CoreError, FareClass, FlightQuery, FlightResult, Itinerary, PaymentAdapter, Session};
use skybook_live::{LiveResultsReconciler, LiveViewHandle, ReconcilerTask};
use skybook_shared::BookingConfirmedEvent;
use skybook_store::app_config::BusinessRules;
use skybook_store::{Config, EventBus, InMemoryFlightRepository, StaticSeatMap};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::worker::start_availability_worker;

/// Shared wiring for every view and booking session.
#[derive(Clone)]
pub struct AppState {
    pub flights: Arc<InMemoryFlightRepository>,
    pub seat_maps: Arc<StaticSeatMap>,
    pub payments: PaymentOrchestrator,
    pub pricing: PricingEngine,
    pub addons: Arc<AddonCatalog>,
    pub confirmations: EventBus<BookingConfirmedEvent>,
}

impl AppState {
    pub fn new(
        flights: InMemoryFlightRepository,
        seat_maps: StaticSeatMap,
        payment_adapter: Arc<dyn PaymentAdapter>,
        rules: &BusinessRules,
        channel_capacity: usize,
    ) -> Self {
        Self {
            flights: Arc::new(flights),
            seat_maps: Arc::new(seat_maps),
            payments: PaymentOrchestrator::new(payment_adapter).with_booking_prefix(rules.booking_prefix.clone()),
            pricing: PricingEngine::new(PricingConfig {
                tax_rate: rules.tax_rate,
                currency: rules.currency.clone(),
            }),
            addons: Arc::new(AddonCatalog::default()),
            confirmations: EventBus::new("booking.confirmed", channel_capacity),
        }
    }

    /// Load fixtures relative to `today` and wire the mock payment gateway.
    pub fn from_config(config: &Config, today: NaiveDate) -> anyhow::Result<Self> {
        let feed = EventBus::new(config.realtime.topic.clone(), config.realtime.channel_capacity);
        let flights = InMemoryFlightRepository::from_path(&config.fixtures.flights_path, today, feed)
            .with_context(|| format!("Failed to load flights from {}", config.fixtures.flights_path))?;

        Ok(Self::new(
            flights,
            StaticSeatMap::new(&config.fixtures.booked_seats),
            Arc::new(MockPaymentAdapter::new()),
            &config.business_rules,
            config.realtime.channel_capacity,
        ))
    }

    pub fn open_search(&self, session: Session, query: FlightQuery) -> LiveViewHandle {
        self.open_view("search", session, query)
    }

    pub fn open_status_board(&self, session: Session, today: NaiveDate) -> LiveViewHandle {
        self.open_view("status-board", session, FlightQuery::status_board(today))
    }

    /// One live search per leg. Route breaks are logged and the legs are
    /// still searched.
    pub fn open_multi_city(&self, session: Session, itinerary: &Itinerary) -> Result<Vec<LiveViewHandle>, CoreError> {
        let queries = itinerary.queries()?;
        for gap in itinerary.validate()? {
            warn!("{}", gap);
        }
        Ok(queries
            .into_iter()
            .enumerate()
            .map(|(i, query)| self.open_view(&format!("multi-city-{}", i + 1), session.clone(), query))
            .collect())
    }

    fn open_view(&self, name: &str, session: Session, query: FlightQuery) -> LiveViewHandle {
        let reconciler = LiveResultsReconciler::new(session, self.flights.clone());
        ReconcilerTask::spawn(name, reconciler, self.flights.feed().subscribe(), Some(query))
    }

    pub async fn start_booking(
        &self,
        session: Session,
        flight: &FlightResult,
        fare_class: FareClass,
    ) -> Result<BookingWizard, BookingError> {
        let wizard = BookingWizard::start(
            session,
            flight,
            fare_class,
            self.seat_maps.as_ref(),
            self.payments.clone(),
            self.pricing.clone(),
        )
        .await?;
        Ok(wizard.with_confirmation_sink(self.confirmations.sender()))
    }

    /// Subscribes before spawning, so no confirmation published after this
    /// call is missed.
    pub fn spawn_availability_worker(&self) -> JoinHandle<()> {
        let confirmations = self.confirmations.subscribe();
        tokio::spawn(start_availability_worker(
            confirmations,
            self.flights.clone(),
            self.seat_maps.clone(),
        ))
    }
}
