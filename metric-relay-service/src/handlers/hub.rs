//! WebSocket subscriber sessions.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;

use crate::services::{record_subscribers, MetricsHub};
use crate::startup::AppState;

/// `GET /hubs/metrics`
pub async fn subscribe(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    let hub = state.hub.clone();
    ws.on_upgrade(move |socket| run_session(socket, hub))
}

/// Forward hub frames to one socket until either side goes away.
async fn run_session(socket: WebSocket, hub: MetricsHub) {
    let (mut sender, mut receiver) = socket.split();
    let mut frames = hub.subscribe();

    record_subscribers(hub.subscriber_count());
    tracing::info!(
        subscribers = hub.subscriber_count(),
        "Subscriber connected"
    );

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "Subscriber socket error");
                        break;
                    }
                    // Subscribers only listen; anything they send is ignored.
                    Some(Ok(_)) => {}
                }
            }
            frame = frames.recv() => {
                match frame {
                    Ok(frame) => {
                        if sender.send(Message::Text(frame.to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Subscriber fell behind, skipping missed frames");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }

    drop(frames);
    record_subscribers(hub.subscriber_count());
    tracing::info!(
        subscribers = hub.subscriber_count(),
        "Subscriber disconnected"
    );
}
