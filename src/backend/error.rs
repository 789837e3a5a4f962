//! Backend error taxonomies
//!
//! Two error families cross the backend boundary: [`AuthError`] for the
//! auth API and [`DataError`] for the resource API. Transport problems
//! keep their reqwest source so callers can log the underlying cause.

/// Errors from the auth API.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The email/password pair was not accepted
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// An account with this email already exists
    #[error("Email is already registered")]
    EmailTaken,

    /// The auth API rejected the request for another reason
    #[error("Sign-in rejected: {0}")]
    Rejected(String),

    /// The request never produced a usable response
    #[error("Auth request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// A successful response did not match the expected shape
    #[error("Auth response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors from the resource API.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    /// The request never produced a usable response
    #[error("Backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("Backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// A successful response did not match the expected shape
    #[error("Backend payload could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

impl DataError {
    /// Build a [`DataError::Status`] from a response status and raw body.
    ///
    /// The resource API wraps errors in a JSON object with a `message`
    /// field; anything else is carried through verbatim, truncated so a
    /// proxy error page cannot flood the logs.
    pub fn from_status(status: u16, body: &str) -> Self {
        #[derive(serde::Deserialize)]
        struct ErrorBody {
            message: String,
        }

        let message = match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => parsed.message,
            Err(_) => {
                let trimmed = body.trim();
                let mut message: String = trimmed.chars().take(200).collect();
                if trimmed.chars().count() > 200 {
                    message.push_str("...");
                }
                message
            }
        };

        DataError::Status { status, message }
    }
}
