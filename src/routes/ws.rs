// WebSocket handler: pushes the view on connect and after every change

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use bytes::Bytes;
use tokio::sync::watch;
use tokio::time::{Duration, timeout};

use super::AppState;
use crate::models::ViewState;
use crate::remote::DashboardApi;

pub(super) const WS_PING_INTERVAL: Duration = Duration::from_secs(30);
pub(super) const WS_SEND_TIMEOUT: Duration = Duration::from_secs(10);

pub(super) async fn ws_dashboard<A: DashboardApi>(
    ws: WebSocketUpgrade,
    State(state): State<AppState<A>>,
) -> impl IntoResponse {
    let rx = state.controller.subscribe();
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = stream_view(socket, rx).await {
            tracing::info!("Dashboard stream error: {}", e);
        }
    })
}

async fn send_json(socket: &mut WebSocket, view: &ViewState) -> anyhow::Result<bool> {
    let json = serde_json::to_string(view)?;
    let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Text(json.into()))).await;
    Ok(matches!(r, Ok(Ok(()))))
}

async fn stream_view(
    mut socket: WebSocket,
    mut rx: watch::Receiver<ViewState>,
) -> anyhow::Result<()> {
    tracing::info!("Client connected to dashboard stream");

    let initial = rx.borrow_and_update().clone();
    if !send_json(&mut socket, &initial).await? {
        return Ok(());
    }

    let mut ping_interval = tokio::time::interval(WS_PING_INTERVAL);
    ping_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // interval fires immediately; the first ping waits a full period
    ping_interval.reset();
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = rx.borrow_and_update().clone();
                if !send_json(&mut socket, &view).await? {
                    break;
                }
            }
            _ = ping_interval.tick() => {
                let r = timeout(WS_SEND_TIMEOUT, socket.send(Message::Ping(Bytes::new()))).await;
                if !matches!(r, Ok(Ok(()))) {
                    break;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
    tracing::info!("Client disconnected from dashboard stream");
    Ok(())
}
