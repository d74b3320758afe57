//! Gateway bridge WebSocket handler.
//!
//! The bridge streams platform events to the bot and receives commands back.
//! Each event is handled on its own task so that collection windows never
//! block the stream.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::mpsc;

use crate::{
    domain::{ButtonPress, ChatMessage, GatewayError, PresenceUpdate},
    infrastructure::{dto::gateway::InboundFrame, gateway::BridgeSender},
    ui::state::AppState,
};

pub async fn gateway_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, StatusCode> {
    let (tx, rx) = mpsc::unbounded_channel();

    match state.gateway.attach(tx.clone()).await {
        Ok(()) => Ok(ws.on_upgrade(move |socket| handle_bridge(socket, state, tx, rx))),
        Err(GatewayError::AlreadyConnected) => {
            tracing::warn!("A gateway bridge is already connected. Rejecting connection.");
            Err(StatusCode::CONFLICT)
        }
        Err(e) => {
            tracing::error!("Failed to attach gateway bridge: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Forwards serialized commands from `rx` to the bridge socket.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_bridge(
    socket: WebSocket,
    state: Arc<AppState>,
    tx: BridgeSender,
    rx: mpsc::UnboundedReceiver<String>,
) {
    let (sender, mut receiver) = socket.split();
    tracing::info!("Gateway bridge connected");

    let state_clone = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("Gateway bridge WebSocket error: {}", e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => handle_frame(&state_clone, &text).await,
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                }
                Message::Close(_) => {
                    tracing::info!("Gateway bridge requested close");
                    break;
                }
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state.gateway.detach(&tx).await;
    tracing::info!("Gateway bridge disconnected");
}

async fn handle_frame(state: &Arc<AppState>, text: &str) {
    let frame = match serde_json::from_str::<InboundFrame>(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!("Failed to parse gateway frame: {}", e);
            return;
        }
    };

    match frame {
        InboundFrame::CommandResult(result) => {
            state.gateway.resolve(result).await;
        }
        InboundFrame::PresenceUpdate(dto) => match PresenceUpdate::try_from(dto) {
            Ok(event) => {
                let usecase = state.lifecycle_usecase.clone();
                tokio::spawn(async move {
                    let report = usecase.execute(event).await;
                    tracing::debug!("Presence handled: {:?}", report);
                });
            }
            Err(e) => tracing::warn!("Invalid presence update: {}", e),
        },
        InboundFrame::ButtonPressed(dto) => match ButtonPress::try_from(dto) {
            Ok(press) => {
                let usecase = state.dispatch_usecase.clone();
                tokio::spawn(async move {
                    let custom_id = press.custom_id.clone();
                    if let Err(e) = usecase.execute(press).await {
                        tracing::info!("Control {} failed: {}", custom_id, e);
                    }
                });
            }
            Err(e) => tracing::warn!("Invalid button press: {}", e),
        },
        InboundFrame::MessageCreated(dto) => match ChatMessage::try_from(dto) {
            Ok(message) => {
                if state.collector.offer(&message) {
                    tracing::debug!("Message from {} consumed as input", message.author_id);
                }
            }
            Err(e) => tracing::warn!("Invalid chat message: {}", e),
        },
    }
}
