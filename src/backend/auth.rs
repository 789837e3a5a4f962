//! Auth API client
//!
//! Implements the account flows against the hosted auth API: sign-up,
//! password sign-in, sign-out, account lookup and token refresh. All of
//! them funnel session changes through the client's session slot, which
//! is also where the [`AuthChange`] notifications come from.

use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use super::error::AuthError;
use super::BackendClient;
use crate::models::{CurrentUser, Session, SignUpOutcome};

/// Lifetime assumed for sessions whose response omits `expires_in`.
const DEFAULT_SESSION_SECS: i64 = 3600;

/// Leeway before expiry at which the refresh task renews the session.
const REFRESH_LEEWAY_SECS: i64 = 60;

/// How often the refresh task looks at the session.
const REFRESH_CHECK_SECS: u64 = 30;

/// Out-of-band notification that the active session changed.
///
/// Emitted on the client's broadcast channel whenever the session slot
/// flips, regardless of which flow flipped it (sign-in, sign-up with
/// auto-confirm, sign-out, failed refresh).
#[derive(Debug, Clone)]
pub enum AuthChange {
    /// A session became active for this account
    SignedIn(CurrentUser),
    /// The active session ended
    SignedOut,
}

// ============================================================================
// Wire payloads
// ============================================================================

#[derive(Debug, Deserialize)]
struct AuthUserPayload {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: serde_json::Value,
}

impl AuthUserPayload {
    fn into_user(self) -> CurrentUser {
        let full_name = self
            .user_metadata
            .get("full_name")
            .and_then(|value| value.as_str())
            .map(String::from);

        CurrentUser {
            id: self.id,
            email: self.email.unwrap_or_default(),
            full_name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SessionPayload {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    user: AuthUserPayload,
}

impl SessionPayload {
    fn into_session(self) -> Session {
        let lifetime = self.expires_in.unwrap_or(DEFAULT_SESSION_SECS);
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: Utc::now() + chrono::Duration::seconds(lifetime),
            user: self.user.into_user(),
        }
    }
}

/// Sign-up answers differ by deployment: auto-confirm projects return a
/// full session, confirmation-required projects return just the account.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpPayload {
    Session(SessionPayload),
    Account(AuthUserPayload),
}

#[derive(Debug, Default, Deserialize)]
struct AuthFailureBody {
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Map an auth API failure response onto the error taxonomy.
///
/// The auth API has shipped several error body shapes over time, so all
/// known message fields are tried before falling back to the status.
fn map_auth_failure(status: reqwest::StatusCode, body: &str) -> AuthError {
    let parsed: AuthFailureBody = serde_json::from_str(body).unwrap_or_default();
    let code = parsed.error_code.unwrap_or_default();
    let message = parsed
        .msg
        .or(parsed.error_description)
        .or(parsed.error)
        .unwrap_or_else(|| format!("status {status}"));

    if code == "user_already_exists" || message.contains("already registered") {
        return AuthError::EmailTaken;
    }
    if code == "invalid_credentials"
        || message.contains("Invalid login credentials")
        || message.contains("invalid_grant")
    {
        return AuthError::InvalidCredentials;
    }

    AuthError::Rejected(message)
}

// ============================================================================
// Auth flows
// ============================================================================

impl BackendClient {
    /// Register a new account.
    ///
    /// The display name travels in the signup metadata so the auth
    /// record carries it even before the profile row exists. Whether a
    /// session comes back depends on the deployment's email
    /// confirmation setting.
    pub async fn sign_up_account(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<SignUpOutcome, AuthError> {
        let body = json!({
            "email": email,
            "password": password,
            "data": { "full_name": full_name },
        });

        let response = self
            .http
            .post(self.auth_url("signup"))
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(map_auth_failure(status, &text));
        }

        match serde_json::from_str::<SignUpPayload>(&text)? {
            SignUpPayload::Session(payload) => {
                let session = payload.into_session();
                self.store_session(session.clone()).await;
                Ok(SignUpOutcome::Active(session))
            }
            SignUpPayload::Account(_) => Ok(SignUpOutcome::ConfirmationRequired {
                email: email.to_string(),
            }),
        }
    }

    /// Exchange email and password for a session.
    pub async fn sign_in_password(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let body = json!({ "email": email, "password": password });

        let response = self
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(map_auth_failure(status, &text));
        }

        let session = serde_json::from_str::<SessionPayload>(&text)?.into_session();
        self.store_session(session.clone()).await;
        Ok(session)
    }

    /// End the active session.
    ///
    /// Without a session this is a no-op that reports success, so
    /// repeated sign-outs stay idempotent. Only a transport failure is
    /// an error; once the revocation request got through, the local
    /// session is dropped no matter what the server answered.
    pub async fn sign_out_session(&self) -> Result<(), AuthError> {
        let Some(session) = self.session().await else {
            return Ok(());
        };

        let response = self
            .http
            .post(self.auth_url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(
                status = %response.status(),
                "logout was not acknowledged; dropping the local session anyway"
            );
        }
        self.clear_session().await;
        Ok(())
    }

    /// Fetch the account record behind the active session.
    pub async fn fetch_auth_user(&self) -> Result<CurrentUser, AuthError> {
        let Some(session) = self.session().await else {
            return Err(AuthError::Rejected("no active session".to_string()));
        };

        let response = self
            .http
            .get(self.auth_url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(map_auth_failure(status, &text));
        }

        Ok(serde_json::from_str::<AuthUserPayload>(&text)?.into_user())
    }

    /// Mint a replacement session from the stored refresh token.
    ///
    /// A rejected refresh token means the session is dead for good, so
    /// the slot is cleared and listeners hear a sign-out. Transport
    /// failures keep the session so a later attempt can still succeed.
    pub async fn refresh_session(&self) -> Result<Session, AuthError> {
        let Some(current) = self.session().await else {
            return Err(AuthError::Rejected("no active session".to_string()));
        };

        let body = json!({ "refresh_token": current.refresh_token });
        let response = self
            .http
            .post(self.auth_url("token"))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.anon_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            self.clear_session().await;
            return Err(map_auth_failure(status, &text));
        }

        let session = serde_json::from_str::<SessionPayload>(&text)?.into_session();
        self.store_session(session.clone()).await;
        Ok(session)
    }

    /// Install a session and notify listeners.
    pub(crate) async fn store_session(&self, session: Session) {
        let user = session.user.clone();
        *self.session.write().await = Some(session);
        // No receivers is fine; the send result is irrelevant then.
        let _ = self.auth_events.send(AuthChange::SignedIn(user));
    }

    /// Drop the session, notifying listeners only if one was active.
    pub(crate) async fn clear_session(&self) {
        let had_session = self.session.write().await.take().is_some();
        if had_session {
            let _ = self.auth_events.send(AuthChange::SignedOut);
        }
    }
}

/// Spawn the background task that renews the session before it expires.
///
/// Checks every [`REFRESH_CHECK_SECS`] seconds and refreshes once the
/// session is within [`REFRESH_LEEWAY_SECS`] of expiry. Failures are
/// logged and retried on the next tick.
pub fn spawn_session_refresh(client: Arc<BackendClient>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(REFRESH_CHECK_SECS));
        loop {
            ticker.tick().await;

            let due = client
                .session()
                .await
                .map(|session| session.expires_within(chrono::Duration::seconds(REFRESH_LEEWAY_SECS)))
                .unwrap_or(false);
            if !due {
                continue;
            }

            match client.refresh_session().await {
                Ok(session) => debug!(expires_at = %session.expires_at, "session refreshed"),
                Err(err) => warn!(error = %err, "session refresh failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;

    fn client() -> BackendClient {
        BackendClient::new(&BackendConfig {
            url: "https://abc.supabase.co".to_string(),
            anon_key: "anon-key".to_string(),
        })
        .expect("client should build")
    }

    fn session_json() -> &'static str {
        r#"{
            "access_token": "jwt-token",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "refresh-token",
            "user": {
                "id": "8b5f8f2e-6a3c-4f0a-9c84-2f4f3a1d9b10",
                "email": "siti@kampus.ac.id",
                "user_metadata": {"full_name": "Siti Rahma"}
            }
        }"#
    }

    #[test]
    fn test_sign_up_payload_with_session() {
        let payload: SignUpPayload =
            serde_json::from_str(session_json()).expect("payload should decode");

        match payload {
            SignUpPayload::Session(session) => {
                let session = session.into_session();
                assert_eq!(session.access_token, "jwt-token");
                assert_eq!(session.user.full_name.as_deref(), Some("Siti Rahma"));
                assert!(session.expires_at > Utc::now());
            }
            SignUpPayload::Account(_) => panic!("expected the session variant"),
        }
    }

    #[test]
    fn test_sign_up_payload_with_account_stub() {
        let json = r#"{
            "id": "8b5f8f2e-6a3c-4f0a-9c84-2f4f3a1d9b10",
            "email": "siti@kampus.ac.id",
            "confirmation_sent_at": "2025-11-01T12:00:00Z"
        }"#;

        let payload: SignUpPayload = serde_json::from_str(json).expect("payload should decode");
        assert!(matches!(payload, SignUpPayload::Account(_)));
    }

    #[test]
    fn test_auth_user_without_metadata() {
        let json = r#"{"id": "8b5f8f2e-6a3c-4f0a-9c84-2f4f3a1d9b10", "email": "siti@kampus.ac.id"}"#;
        let user = serde_json::from_str::<AuthUserPayload>(json)
            .expect("payload should decode")
            .into_user();

        assert_eq!(user.email, "siti@kampus.ac.id");
        assert!(user.full_name.is_none());
    }

    #[test]
    fn test_failure_mapping_duplicate_email() {
        let err = map_auth_failure(
            reqwest::StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"code":422,"msg":"User already registered"}"#,
        );
        assert!(matches!(err, AuthError::EmailTaken));

        let err = map_auth_failure(
            reqwest::StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"error_code":"user_already_exists","msg":"something else"}"#,
        );
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[test]
    fn test_failure_mapping_bad_credentials() {
        let err = map_auth_failure(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert!(matches!(err, AuthError::InvalidCredentials));

        let err = map_auth_failure(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#,
        );
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn test_failure_mapping_other_rejection() {
        let err = map_auth_failure(
            reqwest::StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"msg":"Password should be at least 6 characters"}"#,
        );
        match err {
            AuthError::Rejected(message) => assert!(message.contains("6 characters")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_failure_mapping_unparseable_body() {
        let err = map_auth_failure(reqwest::StatusCode::BAD_GATEWAY, "<html>gateway error</html>");
        match err {
            AuthError::Rejected(message) => assert!(message.contains("502")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_session_slot_emits_changes() {
        let client = client();
        let mut changes = client.subscribe_changes();

        let session = serde_json::from_str::<SessionPayload>(session_json())
            .expect("payload should decode")
            .into_session();
        client.store_session(session).await;
        client.clear_session().await;

        match changes.recv().await.expect("signed-in event") {
            AuthChange::SignedIn(user) => assert_eq!(user.email, "siti@kampus.ac.id"),
            AuthChange::SignedOut => panic!("expected sign-in first"),
        }
        assert!(matches!(
            changes.recv().await.expect("signed-out event"),
            AuthChange::SignedOut
        ));
    }

    #[tokio::test]
    async fn test_clear_without_session_is_silent() {
        let client = client();
        let mut changes = client.subscribe_changes();

        client.clear_session().await;

        assert!(matches!(
            changes.try_recv(),
            Err(tokio::sync::broadcast::error::TryRecvError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_sign_out_without_session_is_ok() {
        let client = client();
        assert!(client.sign_out_session().await.is_ok());
    }
}
