use crate::ClientConfig;
use fivedraw_core::wire::{DealResponse, ErrorResponse, NewDeckResponse, RestartResponse};
use fivedraw_core::{Card, DeckError, DeckId, NewDeck, RemoteDeck, RestartedDeck};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Blocking client for the v2 deck API.
#[derive(Debug, Clone)]
pub struct HttpDeckClient {
    base_url: String,
    http: Client,
}

impl HttpDeckClient {
    pub fn new(config: &ClientConfig) -> Result<Self, DeckError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| DeckError::RemoteUnavailable(format!("http client: {err}")))?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v2/deck/{path}", self.base_url)
    }

    fn send(&self, request: RequestBuilder, subject: &str) -> Result<Response, DeckError> {
        let response = request
            .send()
            .map_err(|err| DeckError::RemoteUnavailable(err.to_string()))?;
        let status = response.status();
        debug!(subject, status = status.as_u16(), "deck service replied");
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(DeckError::DeckNotFound(subject.to_string()));
        }
        let detail = response
            .json::<ErrorResponse>()
            .map(|body| body.detail)
            .unwrap_or_else(|_| "no detail".to_string());
        Err(DeckError::RemoteUnavailable(format!("{status}: {detail}")))
    }
}

fn decode<T: DeserializeOwned>(response: Response) -> Result<T, DeckError> {
    response
        .json::<T>()
        .map_err(|err| DeckError::RemoteUnavailable(format!("undecodable body: {err}")))
}

impl RemoteDeck for HttpDeckClient {
    /// There is no deck to be missing yet, so every failure here reads as
    /// the service being unavailable.
    fn create(&self) -> Result<NewDeck, DeckError> {
        let response = self
            .send(self.http.post(self.url("new")), "new")
            .map_err(|err| match err {
                DeckError::DeckNotFound(_) => {
                    DeckError::RemoteUnavailable("deck service has no create endpoint".to_string())
                }
                other => other,
            })?;
        NewDeck::try_from(decode::<NewDeckResponse>(response)?)
    }

    fn probe(&self, id: &DeckId) -> Result<(), DeckError> {
        self.send(self.http.head(self.url(id.as_str())), id.as_str())?;
        Ok(())
    }

    fn deal(&self, id: &DeckId, count: usize) -> Result<Vec<Card>, DeckError> {
        let path = format!("{id}/deal/{count}");
        let response = self.send(self.http.post(self.url(&path)), id.as_str())?;
        Ok(decode::<DealResponse>(response)?.cards)
    }

    fn restart(&self, id: &DeckId) -> Result<RestartedDeck, DeckError> {
        let path = format!("{id}/restart-game");
        let response = self.send(self.http.post(self.url(&path)), id.as_str())?;
        RestartedDeck::try_from(decode::<RestartResponse>(response)?)
    }
}
