#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LiveError {
    #[error("Failed to load flights: {0}")]
    Fetch(String),

    #[error("Live view has been torn down")]
    ViewClosed,
}
