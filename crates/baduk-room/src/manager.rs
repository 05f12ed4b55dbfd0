//! Room manager: creates, tracks and tears down rooms by name, and knows
//! which room every connection is in.

use std::collections::HashMap;
use std::marker::PhantomData;

use baduk_rules::Rules;
use baduk_transport::ConnectionId;
use tokio::sync::Mutex;

use crate::room::spawn_room;
use crate::{Client, ClientSender, RoomConfig, RoomError, RoomHandle, RoomInfo};

/// The maps behind the manager's lock.
#[derive(Default)]
struct Registry {
    /// Active rooms, keyed by name.
    rooms: HashMap<String, RoomHandle>,

    /// Maps each connection to the room it is in.
    /// A connection can be in at most ONE room at a time.
    connections: HashMap<ConnectionId, String>,
}

impl Registry {
    fn spawn<R: Rules>(&mut self, name: &str, config: &RoomConfig) -> RoomHandle {
        let handle = spawn_room::<R>(name.to_owned(), config.clone());
        self.rooms.insert(name.to_owned(), handle.clone());
        tracing::info!(room = %name, "room created");
        handle
    }

    /// Drops a room from the index and stops its actor.
    async fn destroy(&mut self, name: &str) {
        if let Some(handle) = self.rooms.remove(name) {
            let _ = handle.shutdown().await;
            self.connections.retain(|_, room| room.as_str() != name);
            tracing::info!(room = %name, "room destroyed");
        }
    }
}

/// Manages all active rooms and tracks which connection is in which room.
///
/// This is the entry point for room operations from the connection
/// handlers. All bookkeeping goes through one async mutex, and the join and
/// disconnect paths hold it across the room round-trip, so two connections
/// racing for the same new room name cannot both create it, and a room
/// emptied by a disconnect is gone before the next join looks it up.
pub struct RoomManager<R: Rules> {
    config: RoomConfig,
    registry: Mutex<Registry>,
    _rules: PhantomData<fn() -> R>,
}

impl<R: Rules> RoomManager<R> {
    /// Creates a new, empty room manager. Every room it creates uses
    /// `config`.
    pub fn new(config: RoomConfig) -> Self {
        Self {
            config,
            registry: Mutex::new(Registry::default()),
            _rules: PhantomData,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Creates a room named `name`.
    ///
    /// # Errors
    /// [`RoomError::AlreadyExists`] if the name is taken.
    pub async fn create_if_absent(&self, name: &str) -> Result<RoomHandle, RoomError> {
        let mut registry = self.registry.lock().await;
        if registry.rooms.contains_key(name) {
            return Err(RoomError::AlreadyExists(name.to_owned()));
        }
        Ok(registry.spawn::<R>(name, &self.config))
    }

    /// Returns the handle of the room named `name`.
    pub async fn lookup(&self, name: &str) -> Result<RoomHandle, RoomError> {
        self.registry
            .lock()
            .await
            .rooms
            .get(name)
            .cloned()
            .ok_or_else(|| RoomError::RoomNotFound(name.to_owned()))
    }

    /// Destroys the room named `name` if nobody is in it.
    ///
    /// Returns whether a room was removed. Calling it for a room that is
    /// already gone is fine and returns `false`.
    pub async fn remove_if_empty(&self, name: &str) -> Result<bool, RoomError> {
        let mut registry = self.registry.lock().await;
        let Some(handle) = registry.rooms.get(name) else {
            return Ok(false);
        };
        let empty = match handle.info().await {
            Ok(info) => info.client_count == 0,
            // The actor is gone; nothing left to keep.
            Err(RoomError::Unavailable(_)) => true,
            Err(e) => return Err(e),
        };
        if empty {
            registry.destroy(name).await;
        }
        Ok(empty)
    }

    /// Finds the room a connection is in, together with its client record.
    ///
    /// # Errors
    /// [`RoomError::ClientNotFound`] if the connection is in no room.
    pub async fn resolve(
        &self,
        client_id: ConnectionId,
    ) -> Result<(RoomHandle, Client), RoomError> {
        let handle = {
            let registry = self.registry.lock().await;
            let name = registry
                .connections
                .get(&client_id)
                .ok_or(RoomError::ClientNotFound(client_id))?;
            registry
                .rooms
                .get(name)
                .cloned()
                .ok_or_else(|| RoomError::RoomNotFound(name.clone()))?
        };
        let client = handle.client(client_id).await?;
        Ok((handle, client))
    }

    /// Puts a connection into the room named `room`, creating the room if
    /// it does not exist yet.
    ///
    /// A room created here whose join fails is removed again, so a failed
    /// join never leaves an empty room behind.
    ///
    /// # Errors
    /// - [`RoomError::DuplicateConnection`] if the connection is already in
    ///   a room (this one or another).
    /// - [`RoomError::DuplicateName`] if the name is taken in the room.
    pub async fn join(
        &self,
        client_id: ConnectionId,
        name: &str,
        room: &str,
        sender: ClientSender,
    ) -> Result<(RoomHandle, Client), RoomError> {
        let mut registry = self.registry.lock().await;

        if registry.connections.contains_key(&client_id) {
            return Err(RoomError::DuplicateConnection(client_id));
        }

        let existing = registry.rooms.get(room).cloned();
        let (handle, created) = match existing {
            Some(handle) => (handle, false),
            None => (registry.spawn::<R>(room, &self.config), true),
        };

        match handle.join(client_id, name, sender).await {
            Ok(client) => {
                registry.connections.insert(client_id, room.to_owned());
                Ok((handle, client))
            }
            Err(e) => {
                if created {
                    registry.destroy(room).await;
                }
                Err(e)
            }
        }
    }

    /// Removes a connection from its room, destroying the room if it is
    /// now empty.
    ///
    /// # Errors
    /// [`RoomError::ClientNotFound`] if the connection is in no room.
    pub async fn disconnect(&self, client_id: ConnectionId) -> Result<(), RoomError> {
        let mut registry = self.registry.lock().await;

        let room = registry
            .connections
            .remove(&client_id)
            .ok_or(RoomError::ClientNotFound(client_id))?;
        let Some(handle) = registry.rooms.get(&room).cloned() else {
            return Ok(());
        };

        match handle.leave(client_id).await {
            Ok(0) | Err(RoomError::Unavailable(_)) => {
                registry.destroy(&room).await;
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Lists every room with its state and head counts, sorted by name.
    ///
    /// Rooms that fail to respond (e.g., shutting down) are skipped.
    pub async fn list_rooms(&self) -> Vec<RoomInfo> {
        let handles: Vec<RoomHandle> = {
            let registry = self.registry.lock().await;
            registry.rooms.values().cloned().collect()
        };

        let mut infos = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Ok(info) = handle.info().await {
                infos.push(info);
            }
        }
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }

    /// Returns the number of active rooms.
    pub async fn room_count(&self) -> usize {
        self.registry.lock().await.rooms.len()
    }

    /// Returns the name of the room a connection is in, if any.
    pub async fn room_of(&self, client_id: ConnectionId) -> Option<String> {
        self.registry
            .lock()
            .await
            .connections
            .get(&client_id)
            .cloned()
    }
}

impl<R: Rules> Default for RoomManager<R> {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}
