pub mod models;
pub mod pii;

pub use models::events::{
    BookingConfirmedEvent, FlightChangeNotice, FlightStatus, FlightUpdateEvent,
};
pub use pii::Masked;
