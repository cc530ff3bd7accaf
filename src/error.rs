use crate::battle::Side;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("roster has no members")]
    Empty,
    #[error("active index {index} out of range for roster of {len}")]
    OutOfRange { index: usize, len: usize },
    #[error("invalid roster transition: {0}")]
    InvalidTransition(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("catalog returned status {0}")]
    Status(u16),
    #[error("response decode error: {0}")]
    Decode(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BattleError {
    #[error("could not acquire rosters: {0}")]
    Acquisition(String),
    #[error("invalid {side} roster size {count}")]
    InvalidRosterSize { side: Side, count: usize },
    #[error("match is already over")]
    MatchOver,
    #[error(transparent)]
    Roster(#[from] RosterError),
}

impl From<CatalogError> for BattleError {
    fn from(err: CatalogError) -> Self {
        BattleError::Acquisition(err.to_string())
    }
}

#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    #[error("save file io: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode match state: {0}")]
    Encode(#[from] serde_json::Error),
}
