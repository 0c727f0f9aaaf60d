use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::room::Room;

const SYNTHETIC_PREFIX: &str = "offline-";

/// Identifies one transport session, or a synthetic seat added on someone's behalf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// A fresh id for a newly accepted connection.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// An id with no live connection behind it. Never receives a disconnect.
    pub fn synthetic() -> Self {
        Self(format!("{SYNTHETIC_PREFIX}{}", Uuid::new_v4()))
    }

    pub fn is_synthetic(&self) -> bool {
        self.0.starts_with(SYNTHETIC_PREFIX)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for SessionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A seat in the room roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: SessionId,
    pub name: String,
    pub is_captain: bool,
}

impl Participant {
    /// Case-insensitive comparison against an already trimmed name.
    pub fn has_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// Which commands the room currently accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Lobby,
    Drafting,
    MapBanning,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lobby => write!(f, "lobby"),
            Self::Drafting => write!(f, "drafting"),
            Self::MapBanning => write!(f, "mapBanning"),
        }
    }
}

/// One entry of the map pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapSlot {
    pub name: String,
    pub banned: bool,
}

/// Messages sent from server to clients via WebSocket.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMsg {
    /// First message on a new connection: the id this session acts as.
    #[serde(rename_all = "camelCase")]
    Welcome { session_id: SessionId },
    /// Full room snapshot, pushed after every accepted mutation.
    RoomState { state: Box<Room> },
    /// Private answer to a name-availability query.
    AvailableNames { names: Vec<String> },
}

/// Messages sent from clients to server via WebSocket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMsg {
    ClaimSeat { name: String },
    ClaimSeatOnBehalf { name: String },
    LeaveSeat,
    BecomeCaptain,
    RelinquishCaptaincy,
    #[serde(rename_all = "camelCase")]
    DraftPick { participant_id: SessionId },
    #[serde(rename_all = "camelCase")]
    BanMap { map_name: String },
    Reset,
    RequestAvailableNames,
    RenameSeat { name: String },
}
