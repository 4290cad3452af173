//! Remote catalog access: the `CatalogClient` seam and its HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::EventId,
    protocol::{CreateEventRequest, CreateOrganizerRequest, Event, Organizer, RegistrationRequest},
};
use tracing::debug;
use url::Url;

use crate::error::CatalogError;

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn list_organizers(&self) -> Result<Vec<Organizer>, CatalogError>;
    async fn list_events(&self) -> Result<Vec<Event>, CatalogError>;
    async fn create_organizer(&self, request: &CreateOrganizerRequest) -> Result<(), CatalogError>;
    async fn create_event(&self, request: &CreateEventRequest) -> Result<(), CatalogError>;
    async fn register_participant(
        &self,
        event_id: &EventId,
        request: &RegistrationRequest,
    ) -> Result<(), CatalogError>;
}

#[async_trait]
impl<T> CatalogClient for std::sync::Arc<T>
where
    T: CatalogClient + ?Sized,
{
    async fn list_organizers(&self) -> Result<Vec<Organizer>, CatalogError> {
        (**self).list_organizers().await
    }

    async fn list_events(&self) -> Result<Vec<Event>, CatalogError> {
        (**self).list_events().await
    }

    async fn create_organizer(&self, request: &CreateOrganizerRequest) -> Result<(), CatalogError> {
        (**self).create_organizer(request).await
    }

    async fn create_event(&self, request: &CreateEventRequest) -> Result<(), CatalogError> {
        (**self).create_event(request).await
    }

    async fn register_participant(
        &self,
        event_id: &EventId,
        request: &RegistrationRequest,
    ) -> Result<(), CatalogError> {
        (**self).register_participant(event_id, request).await
    }
}

/// Validates a backend base url. It must be an absolute http(s) url that can
/// carry path segments.
pub fn parse_base_url(raw: &str) -> Result<Url, CatalogError> {
    let invalid = |reason: String| CatalogError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    let url = Url::parse(raw.trim()).map_err(|err| invalid(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("url cannot carry a path".to_string()));
    }
    Ok(url)
}

pub struct HttpCatalogClient {
    http: Client,
    base_url: Url,
}

impl HttpCatalogClient {
    pub fn new(base_url: &str) -> Result<Self, CatalogError> {
        Ok(Self {
            http: Client::new(),
            base_url: parse_base_url(base_url)?,
        })
    }

    /// Builds a client whose requests give up after `timeout`.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, CatalogError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| CatalogError::Transport {
                url: base_url.to_string(),
                source,
            })?;
        Ok(Self {
            http,
            base_url: parse_base_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // parse_base_url rejected cannot-be-a-base urls, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        debug!(%url, "catalog GET");
        let response = self
            .http
            .get(url.clone())
            .send()
            .await
            .map_err(|source| CatalogError::Transport {
                url: url.to_string(),
                source,
            })?;
        let response = ensure_success(&url, response)?;
        response
            .json()
            .await
            .map_err(|source| CatalogError::Decode {
                url: url.to_string(),
                source,
            })
    }

    /// Response bodies of writes are never inspected; only the status counts.
    async fn post_json<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<(), CatalogError> {
        debug!(%url, "catalog POST");
        let response = self
            .http
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|source| CatalogError::Transport {
                url: url.to_string(),
                source,
            })?;
        ensure_success(&url, response)?;
        Ok(())
    }
}

fn ensure_success(url: &Url, response: Response) -> Result<Response, CatalogError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(CatalogError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn list_organizers(&self) -> Result<Vec<Organizer>, CatalogError> {
        self.get_json(self.endpoint(&["organizers"])).await
    }

    async fn list_events(&self) -> Result<Vec<Event>, CatalogError> {
        self.get_json(self.endpoint(&["events"])).await
    }

    async fn create_organizer(&self, request: &CreateOrganizerRequest) -> Result<(), CatalogError> {
        self.post_json(self.endpoint(&["organizers"]), request).await
    }

    async fn create_event(&self, request: &CreateEventRequest) -> Result<(), CatalogError> {
        self.post_json(self.endpoint(&["events"]), request).await
    }

    async fn register_participant(
        &self,
        event_id: &EventId,
        request: &RegistrationRequest,
    ) -> Result<(), CatalogError> {
        let url = self.endpoint(&["events", event_id.as_str(), "register"]);
        self.post_json(url, request).await
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
