//! Single-page web UI: minijinja-rendered index plus a WebSocket that runs
//! one chat session per connection.

use anyhow::{Context, Result};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
    routing::get,
    serve, Router,
};
use minijinja::{path_loader, Environment};
use minijinja_autoreload::AutoReloader;
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::mpsc;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::constants::{GEMINI_ERROR_MESSAGE, GEMINI_INIT_ERROR_MESSAGE};
use crate::form::{FormRecord, FormSubmission};
use crate::gemini::{GeminiChat, GeminiEvent};
use crate::intent::Intent;
use crate::session::{Session, Speaker, TranscriptEntry};

/// Messages the browser sends over the WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    /// The free-text input box was submitted.
    Input { text: String },
    /// The contact form was submitted.
    Form {
        #[serde(flatten)]
        submission: FormSubmission,
    },
}

/// Messages sent back to the browser.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerMessage<'a> {
    Info { message: &'a str },
    /// Render the contact form fields.
    ShowForm,
    /// One streamed chunk of the bot reply.
    Fragment { text: &'a str },
    /// The current chat turn is complete.
    TurnEnd,
    FormError { message: String },
    FormAccepted { record: &'a FormRecord },
    /// Full transcript after each chat turn, in append order.
    Transcript { entries: &'a [TranscriptEntry] },
}

#[derive(Clone)]
struct AppState {
    templates: Arc<AutoReloader>,
}

fn create_minijinja_env() -> Result<AutoReloader> {
    // AutoReloader keeps template edits live during development.
    let reloader = AutoReloader::new(|notifier| {
        let loader = path_loader("templates");
        let mut env = Environment::new();
        env.set_loader(loader);
        notifier.watch_path("templates", true);
        Ok(env)
    });
    Ok(reloader)
}

async fn index_handler(
    State(state): State<AppState>,
) -> Result<axum::response::Html<String>, axum::response::Html<String>> {
    state
        .templates
        .acquire_env()
        .and_then(|env| {
            env.get_template("index.html").and_then(|tmpl| {
                let context = minijinja::context! {
                    title => "Chatbot",
                };
                tmpl.render(context)
            })
        })
        .map(axum::response::Html)
        .map_err(|e| {
            error!("Failed to get or render template: {}", e);
            axum::response::Html(format!("Internal Server Error: {}", e))
        })
}

async fn ws_handler(ws: WebSocketUpgrade, State(_state): State<AppState>) -> impl IntoResponse {
    info!("WebSocket connection upgrade requested");
    ws.on_upgrade(handle_socket)
}

/// Drive one session for the lifetime of this connection.
async fn handle_socket(mut socket: WebSocket) {
    info!("New WebSocket connection established");
    let mut session = Session::new();
    let mut relay = match GeminiChat::from_env() {
        Ok(chat) => Some(chat),
        Err(e) => {
            warn!("Gemini relay unavailable for this session: {:?}", e);
            send_msg(
                &mut socket,
                &ServerMessage::Info {
                    message: GEMINI_INIT_ERROR_MESSAGE,
                },
            )
            .await;
            None
        }
    };

    while let Some(Ok(msg)) = socket.recv().await {
        let text = match msg {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };
        let client_msg = match serde_json::from_str::<ClientMessage>(&text) {
            Ok(m) => m,
            Err(e) => {
                warn!("Ignoring malformed client message: {} ({})", text, e);
                continue;
            }
        };
        match client_msg {
            ClientMessage::Input { text } => {
                if text.trim().is_empty() {
                    continue;
                }
                match Intent::classify(&text) {
                    Intent::Form => {
                        session.open_form();
                        send_msg(&mut socket, &ServerMessage::ShowForm).await;
                    }
                    Intent::Chat => {
                        chat_turn(&mut socket, &mut session, relay.as_mut(), &text).await;
                    }
                }
            }
            ClientMessage::Form { submission } => match session.submit_form(&submission) {
                Ok(record) => {
                    let msg = ServerMessage::FormAccepted { record };
                    send_msg(&mut socket, &msg).await;
                }
                Err(e) => {
                    send_msg(
                        &mut socket,
                        &ServerMessage::FormError {
                            message: e.to_string(),
                        },
                    )
                    .await;
                }
            },
        }
    }
    info!("WebSocket connection closed");
}

/// One chat turn: stream fragments to the browser as they arrive, then the
/// refreshed transcript.
async fn chat_turn(
    socket: &mut WebSocket,
    session: &mut Session,
    relay: Option<&mut GeminiChat>,
    question: &str,
) {
    session.append(Speaker::You, question);

    match relay {
        Some(relay) => {
            let (tx, mut rx) = mpsc::channel(100);
            let ((), send_result) = tokio::join!(
                async {
                    while let Some(event) = rx.recv().await {
                        match event {
                            GeminiEvent::Fragment { text } => {
                                send_msg(socket, &ServerMessage::Fragment { text: &text }).await;
                                session.append(Speaker::Bot, text);
                            }
                            GeminiEvent::End => break,
                        }
                    }
                },
                relay.send_message_stream(question, tx)
            );
            if let Err(e) = send_result {
                error!("Relay task failed: {:?}", e);
            }
        }
        None => {
            send_msg(
                socket,
                &ServerMessage::Fragment {
                    text: GEMINI_ERROR_MESSAGE,
                },
            )
            .await;
            session.append(Speaker::Bot, GEMINI_ERROR_MESSAGE);
        }
    }

    send_msg(socket, &ServerMessage::TurnEnd).await;
    let transcript = ServerMessage::Transcript {
        entries: session.transcript(),
    };
    send_msg(socket, &transcript).await;
}

async fn send_msg(socket: &mut WebSocket, msg: &ServerMessage<'_>) {
    match serde_json::to_string(msg) {
        Ok(json) => {
            if socket.send(Message::Text(json)).await.is_err() {
                warn!("WebSocket client disconnected during send");
            }
        }
        Err(e) => error!("Failed to serialize server message: {}", e),
    }
}

pub fn app() -> Result<Router> {
    let templates = Arc::new(create_minijinja_env()?);
    let state = AppState { templates };
    Ok(Router::new()
        .route("/", get(index_handler))
        .route("/ws", get(ws_handler))
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

pub async fn start_web_server(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Web server listening on http://{}", addr);
    serve(listener, app()?)
        .await
        .context("Web server failed")?;
    Ok(())
}
