//! Webhook HTTP server
//!
//! Two routes:
//! - `GET /` - health check, always `Ok`
//! - `POST /{token}/` - Telegram update; always answered `200 Ok` so
//!   Telegram never redelivers, whatever happened while handling it

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{body::Bytes, extract::State, routing::get, routing::post, Router};
use tokio::net::TcpListener;

use crate::handlers::MessageHandler;
use crate::telegram::WebhookEvent;

#[derive(Clone)]
struct GatewayState {
    handler: Arc<dyn MessageHandler>,
}

/// Builds the router with the webhook mounted on `webhook_path`
pub fn create_router(handler: Arc<dyn MessageHandler>, webhook_path: &str) -> Router {
    Router::new()
        .route("/", get(index))
        .route(webhook_path, post(webhook))
        .with_state(GatewayState { handler })
}

/// Serves `router` on `0.0.0.0:{port}` until the process stops
pub async fn run_server(port: u16, router: Router) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    log::info!("Starting webhook server on http://{}", addr);

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

async fn index() -> &'static str {
    "Ok"
}

async fn webhook(State(state): State<GatewayState>, body: Bytes) -> &'static str {
    let event: WebhookEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            log::warn!("Undecodable webhook body ({} bytes): {}", body.len(), e);
            return "Ok";
        }
    };

    match event.message {
        Some(ref msg) => {
            if let Err(e) = state.handler.handle_message(msg).await {
                log::error!("Failed to handle message {} in chat {}: {}", msg.message_id, msg.chat_id(), e);
            }
        }
        None => log::info!("Update {:?} carries no message, skipping", event.update_id),
    }

    "Ok"
}
