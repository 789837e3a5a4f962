//! Hosted backend client
//!
//! This module speaks the two protocol surfaces of the hosted backend:
//! - the auth API under `{url}/auth/v1` (sign-up, password grant,
//!   logout, user lookup, token refresh)
//! - the resource API under `{url}/rest/v1` (row reads and writes with
//!   embedded joins, filters and ranges)
//!
//! [`BackendClient`] owns the connection pool, the credentials, the
//! active session slot and the auth-change broadcast channel. Request
//! building lives in [`rest`], auth flows in [`auth`], and the error
//! taxonomies in [`error`].

pub mod auth;
pub mod error;
pub mod rest;

pub use auth::{spawn_session_refresh, AuthChange};
pub use error::{AuthError, DataError};
pub use rest::{OrderDirection, ResourceQuery};

use tokio::sync::{broadcast, RwLock};

use crate::config::BackendConfig;
use crate::models::Session;

/// Capacity of the auth-change broadcast channel. Sign-in and sign-out
/// are rare, so a small buffer is enough for a slow listener.
const AUTH_EVENT_CAPACITY: usize = 16;

/// Client for one hosted backend deployment.
///
/// Cheap to share behind an `Arc`; all interior state is synchronized.
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    session: RwLock<Option<Session>>,
    auth_events: broadcast::Sender<AuthChange>,
}

impl BackendClient {
    /// Create a client for the configured deployment.
    pub fn new(config: &BackendConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().build()?;
        let (auth_events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);

        Ok(Self {
            http,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            session: RwLock::new(None),
            auth_events,
        })
    }

    /// Snapshot of the active session, if any.
    pub async fn session(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// Subscribe to sign-in/sign-out notifications.
    ///
    /// Events are emitted whenever the session slot changes, no matter
    /// which code path changed it.
    pub fn subscribe_changes(&self) -> broadcast::Receiver<AuthChange> {
        self.auth_events.subscribe()
    }

    fn rest_url(&self, resource: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, resource)
    }

    fn auth_url(&self, endpoint: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, endpoint)
    }

    /// Bearer token for resource requests: the user's access token when
    /// signed in, the anon key otherwise.
    async fn bearer_token(&self) -> String {
        match self.session.read().await.as_ref() {
            Some(session) => session.access_token.clone(),
            None => self.anon_key.clone(),
        }
    }
}
