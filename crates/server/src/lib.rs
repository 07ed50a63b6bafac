//! In-memory deck service speaking the v2 deck API over HTTP.

pub mod config;
pub mod error;
pub mod routes;
pub mod store;

pub use config::*;
pub use error::*;
pub use routes::*;
pub use store::*;

use fivedraw_core::{RngState, SystemClock};
use std::sync::Arc;
use tiny_http::{Header, Request, Response, Server, StatusCode};
use tracing::{debug, info, warn};

pub fn service_from_config(config: &ServerConfig) -> DeckService {
    let rng = match config.seed {
        Some(seed) => RngState::from_seed(seed),
        None => RngState::from_entropy(),
    };
    info!(seed = rng.seed(), "deck shuffling seeded");
    DeckService::new(DeckStore::new(rng, config.deck_ttl), Box::new(SystemClock))
}

pub fn bind(addr: &str) -> Result<Server, ServerError> {
    Server::http(addr).map_err(|err| ServerError::Bind {
        addr: addr.to_string(),
        reason: err.to_string(),
    })
}

/// Answers requests until the listener shuts down.
pub fn serve(server: &Server, service: Arc<DeckService>) {
    for request in server.incoming_requests() {
        if let Err(err) = handle_request(request, &service) {
            warn!(error = %err, "request error");
        }
    }
}

fn handle_request(request: Request, service: &DeckService) -> Result<(), ServerError> {
    let reply = service.handle(request.method(), request.url());
    debug!(method = %request.method(), url = request.url(), status = reply.status, "handled");
    respond(request, reply)
}

fn respond(request: Request, reply: ApiReply) -> Result<(), ServerError> {
    let status = StatusCode(reply.status);
    match reply.body {
        Some(body) => {
            let data = serde_json::to_vec(&body)?;
            let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..])
                .map_err(|_| ServerError::Header)?;
            request.respond(
                Response::from_data(data)
                    .with_status_code(status)
                    .with_header(header),
            )?;
        }
        None => request.respond(Response::empty(status))?,
    }
    Ok(())
}
