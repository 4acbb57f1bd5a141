pub mod notices;
pub mod state;
pub mod worker;

pub use notices::notice_stream;
pub use state::AppState;
