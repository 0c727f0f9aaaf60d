//! The room state machine.
//!
//! One `Room` holds the whole draft: roster, captains, teams, turn order and
//! the map pool. Commands are applied strictly one at a time by the room task
//! and every accepted command yields a new snapshot to broadcast.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::error::RoomError;
use crate::types::{MapSlot, Participant, Phase, SessionId};

pub const MAP_NAMES: [&str; 12] = [
    "abyss", "ascent", "bind", "breeze", "corrode", "fracture", "haven", "icebox", "lotus", "pearl",
    "split", "sunset",
];

/// Roster size needed before drafting can start.
pub const MIN_ROSTER: usize = 10;
/// Members per team, captain included.
pub const TEAM_SIZE: usize = 5;
pub const MAX_CAPTAINS: usize = 2;

const ASURA: &str = "asura";
const ASURA_EXTRA_PICKS: u8 = 2;

pub fn initial_maps() -> Vec<MapSlot> {
    MAP_NAMES
        .iter()
        .map(|name| MapSlot {
            name: name.to_string(),
            banned: false,
        })
        .collect()
}

fn is_asura(name: &str) -> bool {
    name.trim().to_lowercase() == ASURA
}

/// A validated-on-apply room command, issued by one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ClaimSeat(String),
    ClaimSeatOnBehalf(String),
    LeaveSeat,
    BecomeCaptain,
    RelinquishCaptaincy,
    DraftPick(SessionId),
    BanMap(String),
    Reset,
    RenameSeat(String),
    /// The actor's transport session is gone.
    Disconnect,
}

/// How a seat claim was resolved to a roster entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatClaim {
    /// An existing entry with this name was rebound to the claiming session.
    Rejoined,
    /// The claiming session's own entry took the new name.
    Renamed,
    /// A new entry was appended.
    Created,
}

/// Side effects the caller owes after an accepted command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied {
    Seated { claim: SeatClaim, name: String },
    Renamed { old: String, new: String },
    Updated,
}

/// The single shared room. Serializes as the broadcast snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    phase: Phase,
    roster: Vec<Participant>,
    captains: Vec<SessionId>,
    teams: [Vec<SessionId>; 2],
    draft_order: Option<[SessionId; 2]>,
    current_picker: Option<SessionId>,
    extra_picks_remaining: u8,
    maps: Vec<MapSlot>,
    ban_order: Option<[SessionId; 2]>,
    current_banner: Option<SessionId>,
    selected_map: Option<String>,
    #[serde(skip)]
    rng: StdRng,
}

impl Default for Room {
    fn default() -> Self {
        Self::new()
    }
}

impl Room {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// A room whose draft order is reproducible.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            phase: Phase::Lobby,
            roster: Vec::new(),
            captains: Vec::new(),
            teams: [Vec::new(), Vec::new()],
            draft_order: None,
            current_picker: None,
            extra_picks_remaining: 0,
            maps: initial_maps(),
            ban_order: None,
            current_banner: None,
            selected_map: None,
            rng,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn roster(&self) -> &[Participant] {
        &self.roster
    }

    pub fn captains(&self) -> &[SessionId] {
        &self.captains
    }

    pub fn teams(&self) -> &[Vec<SessionId>; 2] {
        &self.teams
    }

    pub fn draft_order(&self) -> Option<&[SessionId; 2]> {
        self.draft_order.as_ref()
    }

    pub fn current_picker(&self) -> Option<&SessionId> {
        self.current_picker.as_ref()
    }

    pub fn extra_picks_remaining(&self) -> u8 {
        self.extra_picks_remaining
    }

    pub fn maps(&self) -> &[MapSlot] {
        &self.maps
    }

    pub fn ban_order(&self) -> Option<&[SessionId; 2]> {
        self.ban_order.as_ref()
    }

    pub fn current_banner(&self) -> Option<&SessionId> {
        self.current_banner.as_ref()
    }

    /// The last unbanned map, once banning is over.
    pub fn selected_map(&self) -> Option<&str> {
        self.selected_map.as_deref()
    }

    pub fn participant(&self, id: &SessionId) -> Option<&Participant> {
        self.roster.iter().find(|p| p.id == *id)
    }

    /// Roster members not on either team.
    pub fn pool(&self) -> impl Iterator<Item = &Participant> {
        self.roster
            .iter()
            .filter(|p| self.team_of(&p.id).is_none())
    }

    pub fn remaining_maps(&self) -> impl Iterator<Item = &MapSlot> {
        self.maps.iter().filter(|m| !m.banned)
    }

    pub fn occupied_names(&self) -> impl Iterator<Item = &str> {
        self.roster.iter().map(|p| p.name.as_str())
    }

    /// Apply one command on behalf of `actor`.
    ///
    /// `Ok` means the room changed and should be re-broadcast. `Err` leaves the
    /// room untouched.
    pub fn apply(&mut self, actor: &SessionId, command: Command) -> Result<Applied, RoomError> {
        match command {
            Command::ClaimSeat(name) => self.claim_seat(actor, &name),
            Command::ClaimSeatOnBehalf(name) => self.claim_seat_on_behalf(&name),
            Command::LeaveSeat => self.leave_seat(actor),
            Command::BecomeCaptain => self.become_captain(actor),
            Command::RelinquishCaptaincy => self.relinquish_captaincy(actor),
            Command::DraftPick(target) => self.draft_pick(actor, target),
            Command::BanMap(name) => self.ban_map(actor, &name),
            Command::Reset => {
                self.reset();
                Ok(Applied::Updated)
            }
            Command::RenameSeat(name) => self.rename_seat(actor, &name),
            Command::Disconnect => self.disconnect(actor),
        }
    }

    /// Back to an empty lobby with a fresh map pool.
    pub fn reset(&mut self) {
        self.roster.clear();
        self.captains.clear();
        self.phase = Phase::Lobby;
        self.clear_progress();
        tracing::info!("Room reset");
    }

    fn require_phase(&self, expected: Phase) -> Result<(), RoomError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(RoomError::WrongPhase {
                expected,
                actual: self.phase,
            })
        }
    }

    fn position_by_id(&self, id: &SessionId) -> Option<usize> {
        self.roster.iter().position(|p| p.id == *id)
    }

    fn position_by_name(&self, name: &str) -> Option<usize> {
        self.roster.iter().position(|p| p.has_name(name))
    }

    fn team_of(&self, id: &SessionId) -> Option<usize> {
        self.teams.iter().position(|team| team.contains(id))
    }

    fn other_captain(&self, id: &SessionId) -> Option<SessionId> {
        let [first, second] = self.draft_order.as_ref()?;
        Some(if first == id { second.clone() } else { first.clone() })
    }

    // ─── Identity ─────────────────────────────────────────────────────

    /// Map a seat claim to a roster entry: by name first, then by session.
    fn resolve_seat(&mut self, actor: &SessionId, name: &str) -> Result<SeatClaim, RoomError> {
        if let Some(idx) = self.position_by_name(name) {
            let old = self.roster[idx].id.clone();
            if old == *actor {
                if self.roster[idx].name == name {
                    return Err(RoomError::AlreadySeated);
                }
                self.roster[idx].name = name.to_string();
                return Ok(SeatClaim::Renamed);
            }
            // One session never owns two seats.
            if self.position_by_id(actor).is_some() {
                return Err(RoomError::NameTaken(name.to_string()));
            }
            self.roster[idx].id = actor.clone();
            self.rebind(&old, actor);
            tracing::info!("Seat {} rebound from {} to {}", name, old, actor);
            return Ok(SeatClaim::Rejoined);
        }

        if let Some(idx) = self.position_by_id(actor) {
            self.roster[idx].name = name.to_string();
            return Ok(SeatClaim::Renamed);
        }

        self.roster.push(Participant {
            id: actor.clone(),
            name: name.to_string(),
            is_captain: false,
        });
        Ok(SeatClaim::Created)
    }

    /// Rewrite every reference to `old` so turn order survives a reconnect.
    fn rebind(&mut self, old: &SessionId, new: &SessionId) {
        let swap = |id: &mut SessionId| {
            if id == old {
                *id = new.clone();
            }
        };
        self.captains.iter_mut().for_each(swap);
        self.teams.iter_mut().flatten().for_each(swap);
        self.draft_order.iter_mut().flatten().for_each(swap);
        self.ban_order.iter_mut().flatten().for_each(swap);
        self.current_picker.iter_mut().for_each(swap);
        self.current_banner.iter_mut().for_each(swap);
    }

    fn claim_seat(&mut self, actor: &SessionId, name: &str) -> Result<Applied, RoomError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RoomError::EmptyName);
        }
        let claim = self.resolve_seat(actor, name)?;
        self.try_start_draft();
        Ok(Applied::Seated {
            claim,
            name: name.to_string(),
        })
    }

    fn claim_seat_on_behalf(&mut self, name: &str) -> Result<Applied, RoomError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RoomError::EmptyName);
        }
        if self.position_by_name(name).is_some() {
            return Err(RoomError::NameTaken(name.to_string()));
        }
        self.roster.push(Participant {
            id: SessionId::synthetic(),
            name: name.to_string(),
            is_captain: false,
        });
        self.try_start_draft();
        Ok(Applied::Seated {
            claim: SeatClaim::Created,
            name: name.to_string(),
        })
    }

    fn rename_seat(&mut self, actor: &SessionId, name: &str) -> Result<Applied, RoomError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RoomError::EmptyName);
        }
        let idx = self.position_by_id(actor).ok_or(RoomError::NotSeated)?;
        if self.position_by_name(name).is_some_and(|other| other != idx) {
            return Err(RoomError::NameTaken(name.to_string()));
        }
        let old = std::mem::replace(&mut self.roster[idx].name, name.to_string());
        Ok(Applied::Renamed {
            old,
            new: name.to_string(),
        })
    }

    // ─── Lobby ────────────────────────────────────────────────────────

    fn leave_seat(&mut self, actor: &SessionId) -> Result<Applied, RoomError> {
        self.require_phase(Phase::Lobby)?;
        let idx = self.position_by_id(actor).ok_or(RoomError::NotSeated)?;
        self.roster.remove(idx);
        self.captains.retain(|id| id != actor);
        Ok(Applied::Updated)
    }

    fn become_captain(&mut self, actor: &SessionId) -> Result<Applied, RoomError> {
        self.require_phase(Phase::Lobby)?;
        let idx = self.position_by_id(actor).ok_or(RoomError::NotSeated)?;
        if self.roster[idx].is_captain {
            return Err(RoomError::AlreadyCaptain);
        }
        if self.captains.len() >= MAX_CAPTAINS {
            return Err(RoomError::CaptainsFull);
        }
        self.roster[idx].is_captain = true;
        self.captains.push(actor.clone());
        self.try_start_draft();
        Ok(Applied::Updated)
    }

    fn relinquish_captaincy(&mut self, actor: &SessionId) -> Result<Applied, RoomError> {
        self.require_phase(Phase::Lobby)?;
        let idx = self.position_by_id(actor).ok_or(RoomError::NotSeated)?;
        if !self.roster[idx].is_captain {
            return Err(RoomError::NotCaptain);
        }
        self.roster[idx].is_captain = false;
        self.captains.retain(|id| id != actor);
        Ok(Applied::Updated)
    }

    fn try_start_draft(&mut self) -> bool {
        if self.phase != Phase::Lobby
            || self.captains.len() != MAX_CAPTAINS
            || self.roster.len() < MIN_ROSTER
        {
            return false;
        }

        let (a, b) = (self.captains[0].clone(), self.captains[1].clone());
        self.teams = [vec![a.clone()], vec![b.clone()]];
        let order = if self.rng.random_bool(0.5) { [a, b] } else { [b, a] };
        self.current_picker = Some(order[0].clone());
        self.draft_order = Some(order);
        self.extra_picks_remaining = 0;
        self.phase = Phase::Drafting;
        tracing::info!("Drafting started with {} seated", self.roster.len());
        true
    }

    // ─── Drafting ─────────────────────────────────────────────────────

    fn draft_pick(&mut self, actor: &SessionId, target: SessionId) -> Result<Applied, RoomError> {
        self.require_phase(Phase::Drafting)?;
        if self.current_picker.as_ref() != Some(actor) {
            return Err(RoomError::NotYourTurn);
        }
        let picked_name = self
            .pool()
            .find(|p| p.id == target)
            .map(|p| p.name.clone())
            .ok_or_else(|| RoomError::NotInPool(target.to_string()))?;
        let team = self.team_of(actor).ok_or(RoomError::NotYourTurn)?;
        let other = self.other_captain(actor).ok_or(RoomError::NotYourTurn)?;

        self.teams[team].push(target);

        if self.try_start_map_ban() {
            return Ok(Applied::Updated);
        }

        if is_asura(&picked_name) {
            self.current_picker = Some(other);
            self.extra_picks_remaining = ASURA_EXTRA_PICKS;
        } else if self.extra_picks_remaining > 0 {
            self.extra_picks_remaining -= 1;
            if self.extra_picks_remaining == 0 {
                self.current_picker = Some(other);
            }
        } else {
            self.current_picker = Some(other);
        }
        self.pass_turn_from_full_team();
        Ok(Applied::Updated)
    }

    /// A captain whose team is already full forfeits the turn and any owed picks.
    fn pass_turn_from_full_team(&mut self) {
        let Some(picker) = self.current_picker.clone() else {
            return;
        };
        let full = self
            .team_of(&picker)
            .is_some_and(|team| self.teams[team].len() >= TEAM_SIZE);
        if full {
            self.current_picker = self.other_captain(&picker);
            self.extra_picks_remaining = 0;
        }
    }

    fn try_start_map_ban(&mut self) -> bool {
        if self.teams.iter().any(|team| team.len() != TEAM_SIZE) {
            return false;
        }
        let Some([first, second]) = self.draft_order.clone() else {
            return false;
        };

        // Second pick in the draft bans first.
        self.current_banner = Some(second.clone());
        self.ban_order = Some([second, first]);
        self.current_picker = None;
        self.extra_picks_remaining = 0;
        self.phase = Phase::MapBanning;
        tracing::info!("Draft complete, map banning started");
        true
    }

    // ─── Map banning ──────────────────────────────────────────────────

    fn ban_map(&mut self, actor: &SessionId, name: &str) -> Result<Applied, RoomError> {
        self.require_phase(Phase::MapBanning)?;
        if self.current_banner.as_ref() != Some(actor) {
            return Err(RoomError::NotYourTurn);
        }
        let map = self
            .maps
            .iter_mut()
            .find(|m| m.name == name)
            .ok_or_else(|| RoomError::UnknownMap(name.to_string()))?;
        if map.banned {
            return Err(RoomError::MapAlreadyBanned(name.to_string()));
        }
        map.banned = true;

        if self.remaining_maps().count() > 1 {
            self.current_banner = self.ban_order.as_ref().map(|[first, second]| {
                if first == actor { second.clone() } else { first.clone() }
            });
        } else {
            let selected = self.remaining_maps().next().map(|m| m.name.clone());
            tracing::info!("Map banning complete, selected {:?}", selected);
            self.selected_map = selected;
            self.current_banner = None;
        }
        Ok(Applied::Updated)
    }

    // ─── Disconnects ──────────────────────────────────────────────────

    /// Drop the actor's captaincy and regress to the lobby if the draft can
    /// no longer continue. The seat itself is kept so the player can rejoin.
    fn disconnect(&mut self, actor: &SessionId) -> Result<Applied, RoomError> {
        let idx = self.position_by_id(actor).ok_or(RoomError::NotSeated)?;
        self.roster[idx].is_captain = false;
        self.captains.retain(|id| id != actor);

        if self.phase != Phase::Lobby
            && (self.captains.len() < MAX_CAPTAINS || self.roster.len() < MIN_ROSTER)
        {
            tracing::info!("Lost a captain during {}, back to lobby", self.phase);
            self.phase = Phase::Lobby;
            self.clear_progress();
        }
        Ok(Applied::Updated)
    }

    fn clear_progress(&mut self) {
        self.teams = [Vec::new(), Vec::new()];
        self.draft_order = None;
        self.current_picker = None;
        self.extra_picks_remaining = 0;
        self.ban_order = None;
        self.current_banner = None;
        self.selected_map = None;
        self.maps = initial_maps();
    }
}
