use crate::state::AppState;
use async_trait::async_trait;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use futures::Stream;
use moyanavi::{
    session::{ErrorNotice, Renderer, Session},
    trace::DisplayAction,
};
use serde::{Deserialize, Serialize};
use std::{
    convert::Infallible,
    pin::Pin,
    task::{Context, Poll},
};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

#[derive(Debug, Deserialize)]
struct ChatRequest {
    input: String,
}

// Server-sent event stream of JSON frames
pub struct SseResponse {
    rx: ReceiverStream<String>,
}

impl SseResponse {
    fn new(rx: ReceiverStream<String>) -> Self {
        Self { rx }
    }
}

impl Stream for SseResponse {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx)
            .poll_next(cx)
            .map(|opt| opt.map(|s| Ok(Bytes::from(s))))
    }
}

impl IntoResponse for SseResponse {
    fn into_response(self) -> Response {
        let body = axum::body::Body::from_stream(self);

        (
            [
                (header::CONTENT_TYPE, "text/event-stream"),
                (header::CACHE_CONTROL, "no-cache"),
                (header::CONNECTION, "keep-alive"),
            ],
            body,
        )
            .into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Frame<'a> {
    Trace(&'a DisplayAction),
    Answer {
        text: &'a str,
    },
    Error {
        kind: ErrorNotice,
        message: &'a str,
    },
    Finish,
}

impl Frame<'_> {
    fn encode(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"));
        format!("data: {}\n\n", json)
    }
}

/// Forwards what the session renders to the client. The page keeps one item
/// per surface, so trace frames replace rather than append.
struct ChannelRenderer {
    tx: mpsc::Sender<String>,
}

impl ChannelRenderer {
    async fn send(&self, frame: Frame<'_>) {
        if let Err(e) = self.tx.send(frame.encode()).await {
            tracing::debug!("Client went away, dropping frame: {}", e);
        }
    }
}

#[async_trait]
impl Renderer for ChannelRenderer {
    async fn render_trace(&mut self, action: DisplayAction) {
        self.send(Frame::Trace(&action)).await;
    }

    async fn render_answer(&mut self, answer: &str) {
        self.send(Frame::Answer { text: answer }).await;
    }

    async fn render_error(&mut self, notice: ErrorNotice) {
        self.send(Frame::Error {
            kind: notice,
            message: notice.message(),
        })
        .await;
    }
}

async fn handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> SseResponse {
    // Create channel for streaming
    let (tx, rx) = mpsc::channel(100);
    let stream = ReceiverStream::new(rx);

    tokio::spawn(async move {
        let session = Session::new();
        tracing::info!(session_id = %session.id(), "starting agent run");

        let mut renderer = ChannelRenderer { tx };
        let outcome = session
            .run(state.runtime.as_ref(), &request.input, &mut renderer)
            .await;
        tracing::info!(session_id = %session.id(), ?outcome, "agent run finished");

        renderer.send(Frame::Finish).await;
    });

    SseResponse::new(stream)
}

// Configure routes for this module
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/reply", post(handler))
        .with_state(state)
}
