use thiserror::Error;

#[derive(Debug, Error)]
pub enum TurnoverError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("company must not be empty")]
    EmptyCompany,

    #[error("invalid mailbox '{0}': expected local@domain.tld")]
    InvalidMailbox(String),

    #[error("no consultant at position {0}")]
    EntityNotFound(usize),

    #[error("consultant at position {0} is inactive")]
    EntityInactive(usize),

    #[error("remote store not ready")]
    NotReady,

    #[error("remote store error: {0}")]
    Remote(String),

    #[error("remote store returned {status}: {body}")]
    RemoteStatus { status: u16, body: String },

    #[error("invalid config: {0}")]
    Config(String),

    #[error("roster service stopped")]
    ServiceStopped,

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl TurnoverError {
    /// True for errors raised at the edit boundary. These are the only errors
    /// a mutation reports back to its caller.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TurnoverError::EmptyName
                | TurnoverError::EmptyCompany
                | TurnoverError::InvalidMailbox(_)
                | TurnoverError::EntityNotFound(_)
                | TurnoverError::EntityInactive(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, TurnoverError>;
