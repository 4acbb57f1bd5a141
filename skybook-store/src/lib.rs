pub mod app_config;
pub mod error;
pub mod events;
pub mod flight_repo;
pub mod seat_map;

pub use app_config::Config;
pub use error::StoreError;
pub use events::EventBus;
pub use flight_repo::InMemoryFlightRepository;
pub use seat_map::StaticSeatMap;
