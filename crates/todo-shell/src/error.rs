use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    #[error(transparent)]
    Api(#[from] shared::ApiError),

    #[error(transparent)]
    Domain(#[from] domain::DomainError),

    #[error("Usage: {0}")]
    Usage(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),
}
