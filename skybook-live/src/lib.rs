pub mod board;
pub mod consumer;
pub mod error;
pub mod reconciler;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use board::{board_rows, BoardDirection, BoardRow};
pub use consumer::{LiveViewHandle, ReconcilerTask, ResultsSnapshot, ViewCommand};
pub use error::LiveError;
pub use reconciler::{LiveResultsReconciler, UpdateOutcome};
pub use view::{available_airlines, derive_view, price_ceiling, FlightFilters, PriceRange, SortKey, TimeSlot};
