use chrono::{DateTime, Utc};
use skybook_core::search::{FlightQuery, FlightResult};
use skybook_core::{FlightRepository, Session};
use skybook_shared::{FlightChangeNotice, FlightUpdateEvent};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::LiveError;

const NOTICE_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Applied(FlightChangeNotice),
    /// Unknown identity: created after the snapshot or outside this query.
    Ignored,
}

/// Canonical, identity-keyed flight list behind a search page or status board.
///
/// Entries are only ever replaced wholesale by a load. Updates mutate the
/// live part of one entry in place, so positions and identities are stable.
pub struct LiveResultsReconciler {
    session: Session,
    repository: Arc<dyn FlightRepository>,
    flights: Vec<FlightResult>,
    index: HashMap<Uuid, usize>,
    notices: broadcast::Sender<FlightChangeNotice>,
    last_updated: Option<DateTime<Utc>>,
}

impl LiveResultsReconciler {
    pub fn new(session: Session, repository: Arc<dyn FlightRepository>) -> Self {
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            session,
            repository,
            flights: Vec::new(),
            index: HashMap::new(),
            notices,
            last_updated: None,
        }
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<FlightChangeNotice> {
        self.notices.subscribe()
    }

    pub(crate) fn notice_sender(&self) -> broadcast::Sender<FlightChangeNotice> {
        self.notices.clone()
    }

    pub fn flights(&self) -> &[FlightResult] {
        &self.flights
    }

    pub fn get(&self, id: &Uuid) -> Option<&FlightResult> {
        self.index.get(id).map(|&i| &self.flights[i])
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Fetch and replace the whole list. A failed fetch leaves the list
    /// empty; nothing from the previous query survives.
    pub async fn load_initial(&mut self, query: &FlightQuery) -> Result<usize, LiveError> {
        let fetched = self.fetch(query).await;
        self.commit(fetched)
    }

    /// Fetch half of `load_initial`. Does not touch the list, so a caller
    /// can drop the response if its view went away in the meantime.
    pub async fn fetch(&self, query: &FlightQuery) -> Result<Vec<FlightResult>, LiveError> {
        self.repository
            .find_flights(&self.session, query)
            .await
            .map_err(|e| LiveError::Fetch(e.to_string()))
    }

    pub fn commit(&mut self, fetched: Result<Vec<FlightResult>, LiveError>) -> Result<usize, LiveError> {
        self.flights.clear();
        self.index.clear();
        self.last_updated = Some(Utc::now());

        let rows = match fetched {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Flight load failed: {}", e);
                return Err(e);
            }
        };

        for mut flight in rows {
            if self.index.contains_key(&flight.id) {
                debug!("Duplicate flight {} in result set, keeping first", flight.id);
                continue;
            }
            flight.live.recompute_totals();
            self.index.insert(flight.id, self.flights.len());
            self.flights.push(flight);
        }

        info!("Loaded {} flights", self.flights.len());
        Ok(self.flights.len())
    }

    /// Merge a pushed partial update into the matching entry.
    pub fn apply_update(&mut self, event: &FlightUpdateEvent) -> UpdateOutcome {
        let Some(&i) = self.index.get(&event.flight_id) else {
            debug!("Ignoring update for untracked flight {}", event.flight_id);
            return UpdateOutcome::Ignored;
        };

        let flight = &mut self.flights[i];
        flight.live.apply(event);
        let notice = change_notice(&flight.schedule.flight_number, event);
        self.last_updated = Some(notice.received_at);

        debug!(
            "Applied update to flight {} ({}): status={:?} gate={}",
            flight.id,
            flight.schedule.flight_number,
            flight.live.status,
            flight.live.gate_display()
        );
        // nobody listening is fine
        let _ = self.notices.send(notice.clone());
        UpdateOutcome::Applied(notice)
    }
}

fn change_notice(flight_number: &str, event: &FlightUpdateEvent) -> FlightChangeNotice {
    let mut parts = Vec::new();
    if let Some(status) = event.status {
        parts.push(format!("Status: {}", status.label().to_uppercase()));
    }
    if let Some(gate) = event.gate.as_deref().filter(|g| !g.trim().is_empty()) {
        parts.push(format!("Gate: {}", gate.trim()));
    }
    let description = if parts.is_empty() {
        "Fares and availability updated".to_string()
    } else {
        parts.join(" | ")
    };

    FlightChangeNotice {
        flight_id: event.flight_id,
        flight_number: flight_number.to_string(),
        title: format!("Flight {} updated", flight_number),
        description,
        received_at: Utc::now(),
    }
}
