use chrono::{DateTime, Utc};
use skybook_core::search::{FlightQuery, FlightResult};
use skybook_shared::{FlightChangeNotice, FlightUpdateEvent};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::LiveError;
use crate::reconciler::{LiveResultsReconciler, UpdateOutcome};

const COMMAND_BUFFER: usize = 16;

/// What a view renders: the canonical list as of the last change.
#[derive(Debug, Clone, Default)]
pub struct ResultsSnapshot {
    pub flights: Vec<FlightResult>,
    pub last_updated: Option<DateTime<Utc>>,
    pub load_error: Option<LiveError>,
    pub loading: bool,
}

#[derive(Debug, Clone)]
pub enum ViewCommand {
    Reload(FlightQuery),
}

enum Step {
    Stop,
    Command(Option<ViewCommand>),
    Update(Result<FlightUpdateEvent, RecvError>),
}

/// Owns one reconciler on its own task. Loads, feed updates and teardown
/// all arrive as messages, so the list is never shared or locked.
pub struct ReconcilerTask {
    name: String,
    reconciler: LiveResultsReconciler,
    commands: mpsc::Receiver<ViewCommand>,
    updates: broadcast::Receiver<FlightUpdateEvent>,
    snapshots: watch::Sender<Arc<ResultsSnapshot>>,
    shutdown: watch::Receiver<bool>,
    last_error: Option<LiveError>,
}

impl ReconcilerTask {
    pub fn spawn(
        name: impl Into<String>,
        reconciler: LiveResultsReconciler,
        updates: broadcast::Receiver<FlightUpdateEvent>,
        initial_query: Option<FlightQuery>,
    ) -> LiveViewHandle {
        let name = name.into();
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(ResultsSnapshot::default()));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let notices = reconciler.notice_sender();

        let task = ReconcilerTask {
            name: name.clone(),
            reconciler,
            commands: command_rx,
            updates,
            snapshots: snapshot_tx,
            shutdown: shutdown_rx,
            last_error: None,
        };
        let join = tokio::spawn(task.run(initial_query));

        LiveViewHandle {
            name,
            commands: command_tx,
            snapshots: snapshot_rx,
            notices,
            shutdown: shutdown_tx,
            task: join,
        }
    }

    async fn run(mut self, initial_query: Option<FlightQuery>) {
        info!("Live view '{}' started", self.name);

        if let Some(query) = initial_query {
            if !self.reload(query).await {
                return;
            }
        }

        loop {
            let step = tokio::select! {
                biased;
                _ = shutdown_signalled(&mut self.shutdown) => Step::Stop,
                cmd = self.commands.recv() => Step::Command(cmd),
                update = self.updates.recv() => Step::Update(update),
            };

            match step {
                Step::Stop | Step::Command(None) => break,
                Step::Command(Some(ViewCommand::Reload(query))) => {
                    if !self.reload(query).await {
                        break;
                    }
                }
                Step::Update(Ok(event)) => {
                    if let UpdateOutcome::Applied(_) = self.reconciler.apply_update(&event) {
                        self.publish(false);
                    }
                }
                Step::Update(Err(RecvError::Lagged(skipped))) => {
                    warn!("Live view '{}' lagged behind the feed, {} updates skipped", self.name, skipped);
                }
                Step::Update(Err(RecvError::Closed)) => {
                    info!("Flight update feed closed for live view '{}'", self.name);
                    break;
                }
            }
        }

        info!("Live view '{}' stopped", self.name);
    }

    /// Returns false once the view is gone; the caller should exit.
    async fn reload(&mut self, query: FlightQuery) -> bool {
        self.publish(true);

        let fetched = tokio::select! {
            biased;
            _ = shutdown_signalled(&mut self.shutdown) => None,
            result = self.reconciler.fetch(&query) => Some(result),
        };

        let Some(result) = fetched else {
            debug!("Live view '{}' torn down during load, abandoning fetch", self.name);
            return false;
        };
        if self.snapshots.is_closed() {
            debug!("Live view '{}' has no observers, discarding load response", self.name);
            return false;
        }

        self.last_error = self.reconciler.commit(result).err();
        self.publish(false);
        true
    }

    fn publish(&self, loading: bool) {
        let snapshot = ResultsSnapshot {
            flights: self.reconciler.flights().to_vec(),
            last_updated: self.reconciler.last_updated(),
            load_error: self.last_error.clone(),
            loading,
        };
        self.snapshots.send_replace(Arc::new(snapshot));
    }
}

async fn shutdown_signalled(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        // sender dropped with the handle
        if shutdown.changed().await.is_err() {
            return;
        }
    }
}

/// The view's side of a running `ReconcilerTask`.
pub struct LiveViewHandle {
    name: String,
    commands: mpsc::Sender<ViewCommand>,
    snapshots: watch::Receiver<Arc<ResultsSnapshot>>,
    notices: broadcast::Sender<FlightChangeNotice>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl LiveViewHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn reload(&self, query: FlightQuery) -> Result<(), LiveError> {
        self.commands
            .send(ViewCommand::Reload(query))
            .await
            .map_err(|_| LiveError::ViewClosed)
    }

    pub fn snapshot(&self) -> Arc<ResultsSnapshot> {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe_snapshots(&self) -> watch::Receiver<Arc<ResultsSnapshot>> {
        self.snapshots.clone()
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<FlightChangeNotice> {
        self.notices.subscribe()
    }

    /// Resolves with the first published snapshot satisfying `pred`.
    pub async fn wait_for<F>(&self, pred: F) -> Result<Arc<ResultsSnapshot>, LiveError>
    where
        F: Fn(&ResultsSnapshot) -> bool,
    {
        let mut rx = self.snapshots.clone();
        let snapshot = rx.wait_for(|s| pred(&**s)).await.map_err(|_| LiveError::ViewClosed)?;
        Ok(snapshot.clone())
    }

    /// Stop the task and return the last snapshot it published. A load
    /// still in flight is abandoned and never written.
    pub async fn teardown(self) -> Arc<ResultsSnapshot> {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!("Live view '{}' task ended abnormally: {}", self.name, e);
        }
        let last = self.snapshots.borrow().clone();
        last
    }
}
