//! Reasons a room command is rejected.
//!
//! Rejections never reach the client: the next snapshot simply shows the
//! unchanged room. They exist so the room task can log what was ignored.

use thiserror::Error;

use crate::types::Phase;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    /// Command is not valid in the current phase.
    #[error("command requires phase {expected}, room is in {actual}")]
    WrongPhase { expected: Phase, actual: Phase },
    /// Actor is not the captain holding the turn.
    #[error("not this session's turn")]
    NotYourTurn,
    /// Actor has no roster entry.
    #[error("session has no seat")]
    NotSeated,
    /// Session re-claimed its own seat under the same name.
    #[error("session already holds this seat")]
    AlreadySeated,
    /// Name was empty after trimming.
    #[error("name is empty")]
    EmptyName,
    /// Another seat already uses this name.
    #[error("name {0:?} is already taken")]
    NameTaken(String),
    #[error("already a captain")]
    AlreadyCaptain,
    #[error("both captain slots are taken")]
    CaptainsFull,
    #[error("not a captain")]
    NotCaptain,
    /// Draft target is unknown or already on a team.
    #[error("participant {0} is not in the draft pool")]
    NotInPool(String),
    #[error("no map named {0:?}")]
    UnknownMap(String),
    #[error("map {0:?} is already banned")]
    MapAlreadyBanned(String),
}
