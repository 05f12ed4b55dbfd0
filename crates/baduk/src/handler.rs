//! Per-connection handler: frame decoding, event routing and the outbound
//! queue.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The task owns one unbounded queue of [`ServerEvent`]s. Rooms push into
//! it through the sender handed over on join, and the handler pushes its
//! own error replies into the same queue, so everything a client sees is
//! written by this one task in the order it was produced.

use std::sync::Arc;

use baduk_protocol::{ClientEvent, Codec, ServerEvent};
use baduk_room::{ErrorKind, RoomError, RoomHandle};
use baduk_rules::Rules;
use baduk_transport::{Connection, ConnectionId, TransportError, WebSocketConnection};
use tokio::sync::mpsc;

use crate::BadukError;
use crate::server::ServerState;

/// Drop guard that takes the connection out of its room when the handler
/// exits, however it exits.
///
/// `Drop` is synchronous, so the async disconnect runs on a spawned task.
struct ConnectionGuard<R: Rules, C: Codec> {
    conn_id: ConnectionId,
    state: Arc<ServerState<R, C>>,
}

impl<R: Rules, C: Codec> Drop for ConnectionGuard<R, C> {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            match state.rooms.disconnect(conn_id).await {
                Ok(()) => tracing::debug!(%conn_id, "left room on disconnect"),
                // Never joined a room.
                Err(RoomError::ClientNotFound(_)) => {}
                Err(e) => tracing::warn!(%conn_id, error = %e, "disconnect cleanup failed"),
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<R, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<R, C>>,
) -> Result<(), BadukError>
where
    R: Rules,
    C: Codec,
{
    let conn_id = conn.id();
    tracing::debug!(%conn_id, peer = %conn.peer_addr(), "handling new connection");

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    let _guard = ConnectionGuard {
        conn_id,
        state: Arc::clone(&state),
    };

    loop {
        tokio::select! {
            inbound = conn.recv() => {
                let frame = match inbound {
                    Ok(Some(frame)) => frame,
                    Ok(None) => {
                        tracing::info!(%conn_id, "connection closed cleanly");
                        break;
                    }
                    Err(e @ TransportError::InvalidFrame) => {
                        tracing::debug!(%conn_id, error = %e, "unreadable frame");
                        send_error(&tx, ErrorKind::ProtocolMisuse.code(), e.to_string());
                        continue;
                    }
                    Err(e) => {
                        tracing::debug!(%conn_id, error = %e, "recv error");
                        break;
                    }
                };
                handle_frame(&state, conn_id, &tx, &frame).await;
            }
            // `tx` lives as long as this loop, so the queue never closes here.
            Some(event) = rx.recv() => {
                let frame = state.codec.encode(&event)?;
                conn.send(&frame).await?;
            }
        }
    }

    // _guard drops here → room disconnect fires.
    Ok(())
}

/// Decodes one inbound frame and routes it. Failures become an `error`
/// event for this connection only.
async fn handle_frame<R, C>(
    state: &ServerState<R, C>,
    conn_id: ConnectionId,
    tx: &mpsc::UnboundedSender<ServerEvent>,
    frame: &str,
) where
    R: Rules,
    C: Codec,
{
    let event: ClientEvent = match state.codec.decode(frame) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "failed to decode event");
            send_error(tx, ErrorKind::ProtocolMisuse.code(), e.to_string());
            return;
        }
    };

    let name = event.name();
    tracing::trace!(%conn_id, event = name, "dispatching");

    if let Err(e) = dispatch(state, conn_id, tx, event).await {
        tracing::debug!(%conn_id, event = name, code = e.code(), error = %e, "request rejected");
        send_error(tx, e.code(), e.to_string());
    }
}

/// Routes a decoded event to the room layer.
async fn dispatch<R, C>(
    state: &ServerState<R, C>,
    conn_id: ConnectionId,
    tx: &mpsc::UnboundedSender<ServerEvent>,
    event: ClientEvent,
) -> Result<(), RoomError>
where
    R: Rules,
    C: Codec,
{
    match event {
        ClientEvent::Join { name, room } => {
            if name.trim().is_empty() || room.trim().is_empty() {
                return Err(RoomError::ProtocolMisuse(
                    "join needs a non-empty name and room".into(),
                ));
            }
            let (handle, client) = state.rooms.join(conn_id, &name, &room, tx.clone()).await?;
            tracing::info!(
                %conn_id,
                room = handle.name(),
                name = %client.name,
                role = %client.role,
                "client joined"
            );
        }
        ClientEvent::ColorChoice(choice) => {
            room_of(state, conn_id).await?.choose_color(conn_id, choice).await?;
        }
        ClientEvent::StoneRequest(index) => {
            room_of(state, conn_id).await?.place_stone(conn_id, index).await?;
        }
        ClientEvent::BoardRequest(_) => {
            room_of(state, conn_id).await?.request_board().await?;
        }
    }
    Ok(())
}

/// The room this connection is in. Every event except `join` needs one.
async fn room_of<R: Rules, C: Codec>(
    state: &ServerState<R, C>,
    conn_id: ConnectionId,
) -> Result<RoomHandle, RoomError> {
    let (handle, _) = state.rooms.resolve(conn_id).await?;
    Ok(handle)
}

fn send_error(tx: &mpsc::UnboundedSender<ServerEvent>, code: u16, message: String) {
    // The receiver lives in the handler that called us.
    let _ = tx.send(ServerEvent::Error { code, message });
}
