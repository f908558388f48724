use crate::SignalingService;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tandem_core::{ConnectionId, RoomCode};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
pub struct JoinParams {
    pub room: Option<String>,
}

/// `GET /ws?room=CODE`. The room is validated before the upgrade so a bad
/// request never creates room state.
pub async fn ws_handler(
    Query(params): Query<JoinParams>,
    State(service): State<SignalingService>,
    ws: WebSocketUpgrade,
) -> Response {
    let Some(raw) = params.room else {
        return (StatusCode::BAD_REQUEST, "room query param required").into_response();
    };

    let room = match RoomCode::parse(&raw) {
        Ok(room) => room,
        Err(e) => {
            warn!("Rejecting signaling upgrade: {}", e);
            return (StatusCode::BAD_REQUEST, e.to_string()).into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, room, service))
}

async fn handle_socket(socket: WebSocket, room: RoomCode, service: SignalingService) {
    let conn_id = ConnectionId::new();
    info!("New WebSocket connection {} for room {}", conn_id, room);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    service.rooms().join(&room, conn_id, tx);

    let heartbeat = service.heartbeat();
    let mut send_task = tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + heartbeat, heartbeat);
        loop {
            tokio::select! {
                frame = rx.recv() => {
                    let Some(frame) = frame else { break };
                    if sender.send(Message::Text(frame.into())).await.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if sender.send(Message::Ping(Default::default())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();
        let room = room.clone();

        async move {
            let idle = service.idle_timeout();
            loop {
                let msg = match tokio::time::timeout(idle, receiver.next()).await {
                    Ok(Some(Ok(msg))) => msg,
                    Ok(_) => break,
                    Err(_) => {
                        warn!(
                            "No frames or pongs from {} for {:?}, dropping it from room {}",
                            conn_id, idle, room
                        );
                        break;
                    }
                };
                match msg {
                    Message::Text(text) => {
                        if let Err(e) = service.rooms().relay(&room, conn_id, text.as_str()) {
                            warn!("Dropping frame from {} in room {}: {}", conn_id, room, e);
                        }
                    }
                    Message::Binary(data) => {
                        warn!(
                            "Ignoring {}-byte binary frame from {} in room {}",
                            data.len(),
                            conn_id,
                            room
                        );
                    }
                    Message::Close(_) => break,
                    _ => debug!("Control frame from {}", conn_id),
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    service.rooms().leave(&room, conn_id);
    info!("WebSocket disconnected: {}", conn_id);
}
