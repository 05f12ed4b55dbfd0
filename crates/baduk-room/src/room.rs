//! Room actor: an isolated Tokio task that owns one game room.
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel. The actor owns the roster, the room state and
//! the game session; every operation is a command with a oneshot reply, so
//! each read-modify-write happens in one step with nothing interleaved.
//!
//! A second, unbounded channel carries timer events from the negotiation
//! countdown task back into the actor.

use std::collections::HashMap;

use baduk_protocol::{ColorChoice, Recipient, Role, ServerEvent, Snapshot};
use baduk_rules::Rules;
use baduk_session::Session;
use baduk_transport::ConnectionId;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::negotiation::{NegotiationEvent, resolve_colors, spawn_countdown};
use crate::{Client, MAX_PLAYERS, RoomConfig, RoomError, RoomState};

/// Channel sender for delivering outbound events to one client.
///
/// The connection handler owns the receiving end and writes each event to
/// the socket in the order it was sent.
pub type ClientSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    Join {
        client_id: ConnectionId,
        name: String,
        sender: ClientSender,
        reply: oneshot::Sender<Result<Client, RoomError>>,
    },

    /// Replies with the number of clients left in the room.
    Leave {
        client_id: ConnectionId,
        reply: oneshot::Sender<Result<usize, RoomError>>,
    },

    ChooseColor {
        client_id: ConnectionId,
        choice: ColorChoice,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    PlaceStone {
        client_id: ConnectionId,
        index: usize,
        reply: oneshot::Sender<Result<Snapshot, RoomError>>,
    },

    /// Broadcast the current board to the whole room.
    RequestBoard {
        reply: oneshot::Sender<Snapshot>,
    },

    GetClient {
        client_id: ConnectionId,
        reply: oneshot::Sender<Result<Client, RoomError>>,
    },

    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },

    Shutdown,
}

/// A snapshot of room metadata (not the game itself).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub name: String,
    pub state: RoomState,
    /// Players and spectators.
    pub client_count: usize,
    pub player_count: usize,
}

/// Handle to a running room actor. Used to send commands to it.
///
/// Cheap to clone: it is just the room name and an `mpsc::Sender`. The
/// [`RoomManager`](crate::RoomManager) holds one of these per room.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    name: String,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Returns the room's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a client to the room and returns its record.
    ///
    /// The client becomes a Player while fewer than two players are
    /// present, otherwise a Spectator. Its role is sent to `sender` before
    /// anything else.
    pub async fn join(
        &self,
        client_id: ConnectionId,
        name: impl Into<String>,
        sender: ClientSender,
    ) -> Result<Client, RoomError> {
        let name = name.into();
        self.request(|reply| RoomCommand::Join {
            client_id,
            name,
            sender,
            reply,
        })
        .await?
    }

    /// Removes a client and returns how many clients remain.
    pub async fn leave(&self, client_id: ConnectionId) -> Result<usize, RoomError> {
        self.request(|reply| RoomCommand::Leave { client_id, reply })
            .await?
    }

    /// Records a player's color preference during negotiation.
    pub async fn choose_color(
        &self,
        client_id: ConnectionId,
        choice: ColorChoice,
    ) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::ChooseColor {
            client_id,
            choice,
            reply,
        })
        .await?
    }

    /// Plays a stone for `client_id` at a linear cell index. On success the
    /// new board has already been broadcast and is returned as well.
    pub async fn place_stone(
        &self,
        client_id: ConnectionId,
        index: usize,
    ) -> Result<Snapshot, RoomError> {
        self.request(|reply| RoomCommand::PlaceStone {
            client_id,
            index,
            reply,
        })
        .await?
    }

    /// Broadcasts the current board to the room and returns it.
    pub async fn request_board(&self) -> Result<Snapshot, RoomError> {
        self.request(|reply| RoomCommand::RequestBoard { reply })
            .await
    }

    /// Looks up a member of the room.
    pub async fn client(&self, client_id: ConnectionId) -> Result<Client, RoomError> {
        self.request(|reply| RoomCommand::GetClient { client_id, reply })
            .await?
    }

    /// Requests the current room info.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        self.request(|reply| RoomCommand::GetInfo { reply }).await
    }

    /// Tells the room to shut down.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.name.clone()))
    }

    /// Sends a command carrying a reply channel and waits for the answer.
    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable(self.name.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.name.clone()))
    }
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor<R: Rules> {
    name: String,
    state: RoomState,
    config: RoomConfig,
    /// In join order, so the first player is always ahead of the second.
    clients: Vec<Client>,
    /// Per-client outbound channels.
    senders: HashMap<ConnectionId, ClientSender>,
    session: Session<R>,
    /// Bumped whenever a negotiation starts or is abandoned. Timer events
    /// from any other epoch are ignored.
    epoch: u64,
    countdown: Option<JoinHandle<()>>,
    /// Kept so `timer_rx` never reports closed while the room is alive.
    timer_tx: mpsc::UnboundedSender<NegotiationEvent>,
    timer_rx: mpsc::UnboundedReceiver<NegotiationEvent>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl<R: Rules> RoomActor<R> {
    /// Runs the actor loop, processing commands and timer events until
    /// shutdown.
    async fn run(mut self) {
        tracing::info!(room = %self.name, "room actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    match cmd {
                        Some(RoomCommand::Shutdown) | None => break,
                        Some(cmd) => self.handle_command(cmd),
                    }
                }
                Some(event) = self.timer_rx.recv() => {
                    self.handle_timer(event);
                }
            }
        }

        self.cancel_countdown();
        tracing::info!(room = %self.name, "room actor stopped");
    }

    fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join {
                client_id,
                name,
                sender,
                reply,
            } => {
                let _ = reply.send(self.handle_join(client_id, name, sender));
            }
            RoomCommand::Leave { client_id, reply } => {
                let _ = reply.send(self.handle_leave(client_id));
            }
            RoomCommand::ChooseColor {
                client_id,
                choice,
                reply,
            } => {
                let _ = reply.send(self.handle_choose_color(client_id, choice));
            }
            RoomCommand::PlaceStone {
                client_id,
                index,
                reply,
            } => {
                let _ = reply.send(self.handle_place_stone(client_id, index));
            }
            RoomCommand::RequestBoard { reply } => {
                let snapshot = self.session.snapshot();
                self.broadcast(ServerEvent::Board(snapshot.clone()));
                let _ = reply.send(snapshot);
            }
            RoomCommand::GetClient { client_id, reply } => {
                let _ = reply.send(self.find(client_id).cloned());
            }
            RoomCommand::GetInfo { reply } => {
                let _ = reply.send(self.info());
            }
            // Handled by `run`.
            RoomCommand::Shutdown => {}
        }
    }

    fn handle_join(
        &mut self,
        client_id: ConnectionId,
        name: String,
        sender: ClientSender,
    ) -> Result<Client, RoomError> {
        if self.clients.iter().any(|c| c.id == client_id) {
            return Err(RoomError::DuplicateConnection(client_id));
        }
        if self.clients.iter().any(|c| c.name == name) {
            return Err(RoomError::DuplicateName(name));
        }

        let role = if self.player_count() < MAX_PLAYERS {
            Role::Player
        } else {
            Role::Spectator
        };
        let client = Client::new(client_id, name, role);
        self.clients.push(client.clone());
        self.senders.insert(client_id, sender);

        tracing::info!(
            room = %self.name,
            %client_id,
            name = %client.name,
            %role,
            clients = self.clients.len(),
            "client joined"
        );

        self.dispatch(Recipient::One(client_id), ServerEvent::Type(role));

        if self.state == RoomState::Waiting && self.player_count() == MAX_PLAYERS {
            self.start_negotiation();
        }

        Ok(client)
    }

    fn handle_leave(&mut self, client_id: ConnectionId) -> Result<usize, RoomError> {
        let pos = self
            .clients
            .iter()
            .position(|c| c.id == client_id)
            .ok_or(RoomError::ClientNotFound(client_id))?;
        let client = self.clients.remove(pos);
        self.senders.remove(&client_id);

        tracing::info!(
            room = %self.name,
            %client_id,
            name = %client.name,
            role = %client.role,
            clients = self.clients.len(),
            "client left"
        );

        if client.is_player() && self.state != RoomState::Waiting {
            self.interrupt();
        }

        Ok(self.clients.len())
    }

    fn handle_choose_color(
        &mut self,
        client_id: ConnectionId,
        choice: ColorChoice,
    ) -> Result<(), RoomError> {
        let state = self.state;
        let client = self
            .clients
            .iter_mut()
            .find(|c| c.id == client_id)
            .ok_or(RoomError::ClientNotFound(client_id))?;

        if !client.is_player() {
            return Err(RoomError::NotAPlayer(client_id));
        }
        if !state.accepts_color_choices() {
            return Err(RoomError::InvalidState(format!(
                "cannot choose a color while room is {state}"
            )));
        }

        client.color = choice.stone();
        tracing::debug!(room = %self.name, %client_id, ?choice, "color preference recorded");

        self.dispatch(Recipient::AllExcept(client_id), ServerEvent::EnemyColor(choice));
        Ok(())
    }

    fn handle_place_stone(
        &mut self,
        client_id: ConnectionId,
        index: usize,
    ) -> Result<Snapshot, RoomError> {
        let client = self.find(client_id)?;
        let (is_player, color) = (client.is_player(), client.color);

        if !self.state.accepts_moves() {
            return Err(RoomError::InvalidState(format!(
                "cannot place a stone while room is {}",
                self.state
            )));
        }
        if !is_player {
            return Err(RoomError::NotAPlayer(client_id));
        }
        let color = color.ok_or_else(|| {
            RoomError::InvalidState("player has no color assigned".into())
        })?;

        let (x, y) = self.session.index_to_coords(index)?;
        self.session.try_move(color, x, y)?;

        let snapshot = self.session.snapshot();
        self.broadcast(ServerEvent::Board(snapshot.clone()));
        Ok(snapshot)
    }

    fn handle_timer(&mut self, event: NegotiationEvent) {
        let epoch = match event {
            NegotiationEvent::Tick { epoch, .. } | NegotiationEvent::Expired { epoch } => epoch,
        };
        if epoch != self.epoch || self.state != RoomState::SelectingColors {
            tracing::debug!(
                room = %self.name,
                epoch,
                current = self.epoch,
                state = %self.state,
                "ignoring stale negotiation event"
            );
            return;
        }

        match event {
            NegotiationEvent::Tick { remaining, .. } => {
                self.broadcast(ServerEvent::ColorCountDown(remaining));
            }
            NegotiationEvent::Expired { .. } => {
                self.countdown = None;
                self.finish_negotiation();
            }
        }
    }

    /// Waiting → SelectingColors. Clears both players' colors and starts
    /// a fresh countdown.
    fn start_negotiation(&mut self) {
        debug_assert!(self.state.can_transition_to(RoomState::SelectingColors));
        self.cancel_countdown();
        self.state = RoomState::SelectingColors;
        self.epoch += 1;
        for client in &mut self.clients {
            client.color = None;
        }

        self.countdown = Some(spawn_countdown(
            self.epoch,
            self.config.countdown.clone(),
            self.timer_tx.clone(),
        ));
        tracing::info!(room = %self.name, epoch = self.epoch, "color negotiation started");
    }

    /// SelectingColors → Playing. Resolves colors, tells each player its
    /// own, then starts (or resumes) the game.
    fn finish_negotiation(&mut self) {
        let mut players = self.clients.iter_mut().filter(|c| c.is_player());
        let (Some(first), Some(second)) = (players.next(), players.next()) else {
            tracing::warn!(room = %self.name, "negotiation expired without two players");
            self.state = RoomState::Waiting;
            return;
        };

        let (c1, c2) = resolve_colors(first.color, second.color, &mut rand::rng());
        first.color = Some(c1);
        second.color = Some(c2);
        let (p1, p2) = (first.id, second.id);

        self.dispatch(Recipient::One(p1), ServerEvent::Color(c1));
        self.dispatch(Recipient::One(p2), ServerEvent::Color(c2));
        self.broadcast(ServerEvent::ColorCountDown(0));

        debug_assert!(self.state.can_transition_to(RoomState::Playing));
        self.state = RoomState::Playing;
        self.broadcast(ServerEvent::Board(self.session.snapshot()));

        tracing::info!(
            room = %self.name,
            %p1,
            %p2,
            first = %c1,
            second = %c2,
            turn = self.session.turn(),
            "colors resolved, game on"
        );
    }

    /// A player left during negotiation or play: drop back to Waiting and
    /// show the reset countdown. The session is kept.
    fn interrupt(&mut self) {
        let from = self.state;
        debug_assert!(from.can_transition_to(RoomState::Waiting));

        if from == RoomState::SelectingColors {
            self.cancel_countdown();
            for client in &mut self.clients {
                client.color = None;
            }
        }
        self.epoch += 1;
        self.state = RoomState::Waiting;
        self.broadcast(ServerEvent::ColorCountDown(self.config.reset_countdown));

        tracing::info!(room = %self.name, %from, "player left, room back to waiting");
    }

    fn cancel_countdown(&mut self) {
        if let Some(task) = self.countdown.take() {
            task.abort();
        }
    }

    fn find(&self, client_id: ConnectionId) -> Result<&Client, RoomError> {
        self.clients
            .iter()
            .find(|c| c.id == client_id)
            .ok_or(RoomError::ClientNotFound(client_id))
    }

    fn player_count(&self) -> usize {
        self.clients.iter().filter(|c| c.is_player()).count()
    }

    fn broadcast(&self, event: ServerEvent) {
        self.dispatch(Recipient::All, event);
    }

    /// Delivers an event to every client the recipient addresses, in roster
    /// order. Clients whose receiver is already gone are skipped.
    fn dispatch(&self, recipient: Recipient, event: ServerEvent) {
        let targets = self
            .clients
            .iter()
            .filter(|c| recipient.includes(c.id))
            .filter_map(|c| self.senders.get(&c.id));
        for sender in targets {
            let _ = sender.send(event.clone());
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            name: self.name.clone(),
            state: self.state,
            client_count: self.clients.len(),
            player_count: self.player_count(),
        }
    }
}

/// Spawns a new room actor task and returns a handle to communicate with it.
///
/// `config.channel_size` controls backpressure: if the command channel
/// fills up, senders wait.
pub(crate) fn spawn_room<R: Rules>(name: String, config: RoomConfig) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.channel_size.max(1));
    let (timer_tx, timer_rx) = mpsc::unbounded_channel();

    let actor = RoomActor::<R> {
        name: name.clone(),
        state: RoomState::Waiting,
        session: Session::new(&config.session),
        config,
        clients: Vec::new(),
        senders: HashMap::new(),
        epoch: 0,
        countdown: None,
        timer_tx,
        timer_rx,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle { name, sender: tx }
}
