//! Live overview surface over WebSocket.
//!
//! # Protocol
//! Clients send `{"event": "register_<scope>_overview_data", "data": "<name>"}`
//! frames. On registration the client leaves its previous room, receives the
//! scope's snapshot once, then joins the room and receives every tick's
//! refresh. `deregister` leaves all rooms. A client is a member of at most
//! one room at a time.
use crate::app::AppState;
use crate::overview;
use crate::overview::OverviewScope;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use bytes::Bytes;
use serde::Deserialize;
use tokio::sync::broadcast;

#[derive(Debug, Deserialize)]
struct SocketRequest {
    event: String,
    #[serde(default)]
    data: String,
}

pub(crate) async fn socket_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state, socket))
}

async fn handle_socket(state: AppState, mut socket: WebSocket) {
    // The single room this client currently belongs to; dropping the receiver
    // is what leaves the room.
    let mut room: Option<broadcast::Receiver<Bytes>> = None;
    loop {
        tokio::select! {
            incoming = socket.recv() => {
                let Some(Ok(message)) = incoming else { break };
                let Message::Text(text) = message else { continue };
                let Ok(request) = serde_json::from_str::<SocketRequest>(&text) else {
                    tracing::warn!("dropping malformed socket frame");
                    continue;
                };
                let scope = match request.event.as_str() {
                    "register_main_overview_data" => OverviewScope::Main,
                    "register_factories_overview_data" => OverviewScope::Factories,
                    "register_factory_overview_data" => {
                        OverviewScope::Factory(request.data.to_lowercase())
                    }
                    "register_station_overview_data" => {
                        OverviewScope::Station(request.data.to_lowercase())
                    }
                    "deregister" => {
                        room = None;
                        continue;
                    }
                    other => {
                        tracing::warn!(event = other, "unknown socket event");
                        continue;
                    }
                };

                // Leave the previous room before joining the next one.
                room = None;
                match overview::snapshot_frame(&state.core, &scope).await {
                    Ok(frame) => {
                        let text = String::from_utf8_lossy(&frame).to_string();
                        if socket.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                        room = Some(state.core.transport.join_room(&scope.room()).await);
                    }
                    Err(err) => {
                        tracing::error!(room = scope.room(), error = %err,
                            "failed to compute overview snapshot on join");
                    }
                }
            }
            frame = room_recv(&mut room), if room.is_some() => {
                let Some(frame) = frame else { continue };
                let text = String::from_utf8_lossy(&frame).to_string();
                if socket.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
        }
    }
}

// Awaits the next broadcast frame; a lagged receiver skips to the newest
// frames on the following tick, which is the right behavior for snapshots.
async fn room_recv(room: &mut Option<broadcast::Receiver<Bytes>>) -> Option<Bytes> {
    match room {
        Some(receiver) => match receiver.recv().await {
            Ok(frame) => Some(frame),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "overview subscriber lagged");
                None
            }
            Err(broadcast::error::RecvError::Closed) => None,
        },
        None => std::future::pending().await,
    }
}
