use thiserror::Error;

use crate::world::ObjectKind;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("no boundary objects received during initialization, map extent is undefined")]
    NoBoundaries,

    #[error("object {id} not found")]
    NotFound { id: String },

    #[error("no objects of kind {kind:?}")]
    EmptySet { kind: ObjectKind },

    #[error("no active closing boundary")]
    NoActiveBoundary,

    #[error("tank ids missing from the first message")]
    MissingTankIds,

    #[error("object {id} has no point position")]
    NotAPoint { id: String },

    #[error("engine closed the stream")]
    UnexpectedEof,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
}

impl BotError {
    /// Recoverable errors only steer which branch the strategy takes.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BotError::NoActiveBoundary | BotError::EmptySet { .. })
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
