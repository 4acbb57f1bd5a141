pub mod itinerary;
pub mod payment;
pub mod repository;
pub mod search;
pub mod session;

pub use itinerary::{Itinerary, ItinerarySegment, RouteGap};
pub use payment::{PaymentAdapter, PaymentDetails, PaymentMethod, PaymentReceipt, PaymentRequest, PaymentStatus};
pub use repository::{FlightRepository, SeatMapProvider};
pub use search::{Airport, FareClass, Fares, FlightQuery, FlightResult, FlightSchedule, LiveFlightState, SeatCounts};
pub use session::Session;

/// Boxed error returned by collaborator implementations.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid time of day: {0}")]
    InvalidTime(String),
    #[error("Itinerary needs between {min} and {max} segments")]
    SegmentLimit { min: usize, max: usize },
    #[error("Unknown itinerary segment {0}")]
    UnknownSegment(uuid::Uuid),
    #[error("Flight {0} is missing origin, destination or date")]
    IncompleteSegment(usize),
    #[error("Flight {later} date cannot be before Flight {earlier} date")]
    SegmentOutOfOrder { earlier: usize, later: usize },
}

pub type CoreResult<T> = Result<T, CoreError>;
