//! Review model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A review left on a marketplace template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: i64,
    pub user_id: Uuid,
    pub template_id: i64,
    /// Star rating on a 1-5 scale
    pub rating: i32,
    #[serde(default)]
    pub comment: String,
    pub created_at: DateTime<Utc>,
    /// Reviewer name, embedded from the `users` resource
    #[serde(default, rename = "users")]
    pub author: Option<ReviewAuthor>,
}

impl Review {
    /// Name to credit the review to
    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .and_then(|author| author.full_name.as_deref())
            .unwrap_or("Anonim")
    }
}

/// The slice of a profile row carried along with a review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewAuthor {
    #[serde(default)]
    pub full_name: Option<String>,
}

/// Input for posting a new review.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub user_id: Uuid,
    pub template_id: i64,
    pub rating: i32,
    pub comment: String,
}
