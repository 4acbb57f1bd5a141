use crate::models::Stage;

/// Rejections surfaced by the booking wizard. All of them leave the draft intact.
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Seat {seat} is unavailable: {reason}")]
    SeatUnavailable {
        seat: String,
        reason: String,
    },

    #[error("Payment failed: {0}")]
    Payment(String),

    #[error("Failed to load seat map: {0}")]
    Fetch(String),

    #[error("Invalid stage transition from {from} to {to}")]
    InvalidTransition {
        from: Stage,
        to: Stage,
    },

    #[error("Cannot go back from {0}")]
    CannotGoBack(Stage),
}

impl BookingError {
    pub(crate) fn seat_booked(seat: impl Into<String>) -> Self {
        Self::SeatUnavailable {
            seat: seat.into(),
            reason: "already booked".to_string(),
        }
    }

    pub(crate) fn seat_taken(seat: impl Into<String>) -> Self {
        Self::SeatUnavailable {
            seat: seat.into(),
            reason: "already assigned to another passenger".to_string(),
        }
    }
}
