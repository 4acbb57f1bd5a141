use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to read fixtures: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed fixture file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid fixture row {flight_number}: {reason}")]
    InvalidFixture { flight_number: String, reason: String },

    #[error("Flight not found: {0}")]
    UnknownFlight(Uuid),
}
