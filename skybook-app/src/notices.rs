use futures_util::{Stream, StreamExt};
use skybook_shared::FlightChangeNotice;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::warn;
use uuid::Uuid;

/// Toast stream for a view, optionally narrowed to one flight. Lag is
/// logged and skipped.
pub fn notice_stream(
    rx: broadcast::Receiver<FlightChangeNotice>,
    flight_id: Option<Uuid>,
) -> impl Stream<Item = FlightChangeNotice> {
    BroadcastStream::new(rx).filter_map(move |result| async move {
        match result {
            Ok(notice) if flight_id.map_or(true, |id| id == notice.flight_id) => Some(notice),
            Ok(_) => None,
            Err(e) => {
                warn!("Notice stream skipped messages: {}", e);
                None
            }
        }
    })
}
