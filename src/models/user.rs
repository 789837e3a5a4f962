//! Account and session models
//!
//! This module defines the signed-in user, the auth session issued by the
//! backend, and the profile row stored in the `users` resource.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The signed-in account as the application sees it.
///
/// Built by merging the auth provider's account record with the profile
/// row from the `users` resource. The profile row may be missing, in
/// which case `full_name` falls back to whatever the auth metadata had.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Account identifier assigned by the auth provider
    pub id: Uuid,
    /// Email address the account was registered with
    pub email: String,
    /// Display name, if one was ever provided
    pub full_name: Option<String>,
}

impl CurrentUser {
    /// Name to greet the user with.
    ///
    /// Prefers the stored full name and falls back to the email address,
    /// mirroring how the greeting bar behaves when no profile row exists.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

/// Profile row stored in the `users` resource.
///
/// Written once right after sign-up and merged into [`CurrentUser`] on
/// every session restore.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Mirrors the auth account id
    pub id: Uuid,
    /// Email address (duplicated from the auth record for joins)
    pub email: String,
    /// Display name
    #[serde(default)]
    pub full_name: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

/// An authenticated session issued by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token sent with resource requests
    pub access_token: String,
    /// Token used to mint a replacement session
    pub refresh_token: String,
    /// Instant after which `access_token` stops being accepted
    pub expires_at: DateTime<Utc>,
    /// Account the session belongs to
    pub user: CurrentUser,
}

impl Session {
    /// Whether the session expires within the given leeway.
    ///
    /// Used by the refresh task to renew tokens a little before they
    /// actually lapse.
    pub fn expires_within(&self, leeway: Duration) -> bool {
        self.expires_at - leeway <= Utc::now()
    }
}

/// Result of a successful sign-up request.
///
/// Backends configured with email confirmation return only an account
/// stub; the session arrives later once the user clicks the link.
#[derive(Debug, Clone)]
pub enum SignUpOutcome {
    /// The backend issued a session right away
    Active(Session),
    /// The account exists but must confirm its email first
    ConfirmationRequired {
        /// Address the confirmation mail was sent to
        email: String,
    },
}

impl SignUpOutcome {
    /// Whether the sign-up produced a usable session
    pub fn is_active(&self) -> bool {
        matches!(self, SignUpOutcome::Active(_))
    }
}
