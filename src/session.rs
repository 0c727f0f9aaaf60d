use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::{Instant, interval_at};

use crate::room::{Applied, Command, Room};
use crate::store::NicknameStore;
use crate::types::{ClientMsg, ServerMsg, SessionId};

/// Commands the WebSocket handler sends to the room task.
#[derive(Debug)]
pub enum SessionCommand {
    Connect {
        session_id: SessionId,
    },
    Client {
        session_id: SessionId,
        msg: ClientMsg,
    },
    Disconnect {
        session_id: SessionId,
    },
    /// Persist everything and stop; `done` fires once the files are written.
    Shutdown {
        done: oneshot::Sender<()>,
    },
}

/// Events fanned out from the room task to WebSocket connections.
#[derive(Debug, Clone)]
pub enum RoomEvent {
    /// Send a message to a specific session.
    SendTo { session_id: SessionId, msg: ServerMsg },
    /// Send a message to every connected session.
    Broadcast { msg: ServerMsg },
}

#[derive(Clone)]
pub struct RoomHandle {
    pub cmd_tx: mpsc::Sender<SessionCommand>,
    pub event_tx: broadcast::Sender<RoomEvent>,
}

impl RoomHandle {
    /// Ask the room task to persist and stop, waiting until it has.
    pub async fn shutdown(&self) {
        let (done, wait) = oneshot::channel();
        if self.cmd_tx.send(SessionCommand::Shutdown { done }).await.is_ok() {
            let _ = wait.await;
        }
    }
}

struct RoomTask {
    room: Room,
    store: NicknameStore,
    event_tx: broadcast::Sender<RoomEvent>,
}

impl RoomTask {
    fn send_to(&self, session_id: &SessionId, msg: ServerMsg) {
        let _ = self.event_tx.send(RoomEvent::SendTo {
            session_id: session_id.clone(),
            msg,
        });
    }

    fn broadcast_state(&self) {
        let _ = self.event_tx.send(RoomEvent::Broadcast {
            msg: self.snapshot(),
        });
    }

    fn snapshot(&self) -> ServerMsg {
        ServerMsg::RoomState {
            state: Box::new(self.room.clone()),
        }
    }

    fn handle(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Connect { session_id } => {
                self.send_to(&session_id, self.snapshot());
            }
            SessionCommand::Disconnect { session_id } => {
                self.apply(&session_id, Command::Disconnect);
            }
            SessionCommand::Client { session_id, msg } => {
                let command = match msg {
                    ClientMsg::RequestAvailableNames => {
                        let names = self.store.available(self.room.occupied_names());
                        self.send_to(&session_id, ServerMsg::AvailableNames { names });
                        return;
                    }
                    ClientMsg::ClaimSeat { name } => Command::ClaimSeat(name),
                    ClientMsg::ClaimSeatOnBehalf { name } => Command::ClaimSeatOnBehalf(name),
                    ClientMsg::LeaveSeat => Command::LeaveSeat,
                    ClientMsg::BecomeCaptain => Command::BecomeCaptain,
                    ClientMsg::RelinquishCaptaincy => Command::RelinquishCaptaincy,
                    ClientMsg::DraftPick { participant_id } => Command::DraftPick(participant_id),
                    ClientMsg::BanMap { map_name } => Command::BanMap(map_name),
                    ClientMsg::Reset => Command::Reset,
                    ClientMsg::RenameSeat { name } => Command::RenameSeat(name),
                };
                self.apply(&session_id, command);
            }
            // Handled by the task loop.
            SessionCommand::Shutdown { .. } => {}
        }
    }

    fn apply(&mut self, session_id: &SessionId, command: Command) {
        match self.room.apply(session_id, command) {
            Ok(applied) => {
                match applied {
                    Applied::Seated { name, .. } => {
                        self.store.register(&name);
                    }
                    Applied::Renamed { old, new } => {
                        self.store.unregister(&old);
                        self.store.register(&new);
                    }
                    Applied::Updated => {}
                }
                self.broadcast_state();
            }
            Err(e) => tracing::debug!("Ignored command from {}: {}", session_id, e),
        }
    }

    fn persist(&mut self) {
        self.store.flush();
        self.store.save_continuity(self.room.occupied_names());
    }
}

/// Spawn the room task. Returns the handle connections talk to.
pub fn spawn_room(room: Room, store: NicknameStore, persist_every: Duration) -> RoomHandle {
    let (cmd_tx, cmd_rx) = mpsc::channel(256);
    let (event_tx, _) = broadcast::channel(256);

    let task = RoomTask {
        room,
        store,
        event_tx: event_tx.clone(),
    };
    tokio::spawn(room_task(task, cmd_rx, persist_every));

    RoomHandle { cmd_tx, event_tx }
}

async fn room_task(
    mut task: RoomTask,
    mut cmd_rx: mpsc::Receiver<SessionCommand>,
    persist_every: Duration,
) {
    let mut ticker = interval_at(Instant::now() + persist_every, persist_every);

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => match cmd {
                Some(SessionCommand::Shutdown { done }) => {
                    task.persist();
                    let _ = done.send(());
                    break;
                }
                Some(cmd) => task.handle(cmd),
                None => {
                    task.persist();
                    break;
                }
            },
            _ = ticker.tick() => task.persist(),
        }
    }

    tracing::info!("Room task ended");
}
