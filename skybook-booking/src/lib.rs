pub mod error;
pub mod models;
pub mod orchestrator;
pub mod wizard;

pub use error::BookingError;
pub use models::{BookingDraft, Gender, IdType, Passenger, PassengerForm, PassengerId, PaymentRecord, Stage};
pub use orchestrator::{MockPaymentAdapter, PaymentOrchestrator};
pub use wizard::{BookingConfirmation, BookingWizard};
