//! Live-query WebSocket upgrade.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::Response;
use chrono::Utc;
use futures::{SinkExt, StreamExt};
use tracing::{debug, warn};

use biblioteca_realtime::message::OutboundMessage;
use biblioteca_service::SessionContext;

use crate::dto::request::WsQuery;
use crate::error::ApiError;
use crate::extractors::auth::request_info;
use crate::state::AppState;

/// GET /ws?token={jwt}
///
/// The token is validated before the upgrade, so stale or invalid tokens
/// get a plain 401 instead of a socket.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    let (ip_address, user_agent) = request_info(&headers);
    let session = state
        .auth_service
        .session(&query.token)
        .await?
        .with_request_info(ip_address, user_agent);

    Ok(ws.on_upgrade(move |socket| handle_socket(state, session, socket)))
}

async fn handle_socket(state: AppState, session: SessionContext, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let engine = state.realtime.clone();
    let (handle, mut outbound_rx) = engine.register(session);
    let conn_id = handle.id;
    let period = engine.ping_interval();
    let mut ping = tokio::time::interval_at(tokio::time::Instant::now() + period, period);

    let mut outbound_task = tokio::spawn(async move {
        loop {
            let frame = tokio::select! {
                next = outbound_rx.recv() => match next {
                    Some(frame) => frame,
                    None => break,
                },
                _ = ping.tick() => OutboundMessage::Ping {
                    timestamp: Utc::now().timestamp_millis(),
                },
            };
            let text = match serde_json::to_string(&frame) {
                Ok(text) => text,
                Err(e) => {
                    warn!(connection_id = %conn_id, error = %e, "Failed to encode frame");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
            if frame.closes_connection() {
                let _ = ws_tx.send(Message::Close(None)).await;
                break;
            }
        }
    });

    loop {
        let result = tokio::select! {
            next = ws_rx.next() => match next {
                Some(result) => result,
                None => break,
            },
            _ = &mut outbound_task => break,
        };
        match result {
            Ok(Message::Text(text)) => engine.handle_inbound(conn_id, text.as_str()).await,
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(connection_id = %conn_id, error = %e, "WebSocket read error");
                break;
            }
        }
    }

    outbound_task.abort();
    engine.unregister(conn_id);
}
