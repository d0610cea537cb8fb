//! WebSocket upgrade handler

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::app::AppState;
use crate::session::{ClientHandle, ConnectionId, SessionManager};
use crate::util::rate_limit::InputRateLimiter;
use crate::ws::protocol::{ClientMsg, ServerMsg};

/// WebSocket upgrade handler
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handle the upgraded WebSocket connection
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (client, rx) = ClientHandle::channel();
    let conn_id = client.id();
    info!(conn = %conn_id, "New WebSocket connection");

    let (ws_sink, ws_stream) = socket.split();

    let writer_handle = tokio::spawn(run_writer(conn_id, ws_sink, rx));
    let limiter = InputRateLimiter::new(state.config.input_rate_limit);

    run_reader(&state.sessions, &client, ws_stream, &limiter).await;

    // Cleanup on disconnect
    state.sessions.leave(conn_id);
    writer_handle.abort();

    info!(conn = %conn_id, "WebSocket connection closed");
}

/// Writer task: outbound queue -> WebSocket
async fn run_writer(
    conn_id: ConnectionId,
    mut ws_sink: SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<ServerMsg>,
) {
    while let Some(msg) = rx.recv().await {
        if let Err(e) = send_msg(&mut ws_sink, &msg).await {
            debug!(conn = %conn_id, error = %e, "WebSocket send failed");
            break;
        }
    }
}

/// Reader loop: WebSocket -> session manager
async fn run_reader(
    sessions: &Arc<SessionManager>,
    client: &ClientHandle,
    mut ws_stream: SplitStream<WebSocket>,
    limiter: &InputRateLimiter,
) {
    let conn_id = client.id();

    while let Some(result) = ws_stream.next().await {
        match result {
            Ok(Message::Text(text)) => match ClientMsg::decode(&text) {
                Ok(ClientMsg::Keydown(_)) if !limiter.check() => {
                    warn!(conn = %conn_id, "Rate limited keydown message");
                }
                Ok(msg) => dispatch(sessions, client, msg),
                Err(e) => {
                    warn!(conn = %conn_id, error = %e, "Failed to parse client message");
                }
            },
            Ok(Message::Binary(_)) => {
                warn!(conn = %conn_id, "Received binary message, ignoring");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!(conn = %conn_id, "Client initiated close");
                break;
            }
            Err(e) => {
                error!(conn = %conn_id, error = %e, "WebSocket error");
                break;
            }
        }
    }
}

/// Route one decoded client message to the session manager
pub fn dispatch(sessions: &Arc<SessionManager>, client: &ClientHandle, msg: ClientMsg) {
    match msg {
        ClientMsg::NewGame => {
            sessions.new_game(client);
        }
        ClientMsg::JoinGame(code) => {
            if let Err(e) = sessions.join_game(client, code.trim()) {
                debug!(conn = %client.id(), room = %code, error = %e, "Join rejected");
                client.send(e.reply());
            }
        }
        ClientMsg::Keydown(payload) => sessions.handle_input(client.id(), &payload),
    }
}

/// Send a message over WebSocket
async fn send_msg(sink: &mut SplitSink<WebSocket, Message>, msg: &ServerMsg) -> Result<(), String> {
    let json = msg.encode().map_err(|e| e.to_string())?;
    sink.send(Message::Text(json)).await.map_err(|e| e.to_string())
}
