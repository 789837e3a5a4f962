//! Gateway facade over the hosted backend
//!
//! The [`Gateway`] trait is the only surface the application controller
//! sees; everything above this module is backend-agnostic. The
//! production [`HttpGateway`] binds the protocol client to the fault
//! policy:
//!
//! - read operations absorb transport faults into empty values and log
//!   a warning, so a flaky backend degrades the page instead of
//!   breaking it
//! - lookups that find nothing are `Ok(None)`, which is an answer, not
//!   a fault
//! - write operations propagate typed errors so the caller can tell
//!   the user what happened

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::warn;
use uuid::Uuid;

use crate::backend::{AuthChange, AuthError, BackendClient, DataError, OrderDirection};
use crate::models::{
    Category, Course, CurrentUser, NewOrder, NewReview, Order, ProgressEntry, ProgressUpdate,
    Review, Session, SignUpOutcome, Template, UserProfile,
};

/// Column list for course reads, embedding the videos.
const COURSE_SELECT: &str = "*,course_videos(id,title,youtube_url,duration,channel,order_index)";
/// Column list for template reads, embedding the category.
const TEMPLATE_SELECT: &str = "*,categories(id,name)";
/// Column list for progress reads, embedding course and video titles.
const PROGRESS_SELECT: &str = "*,courses(id,title),course_videos(id,title)";
/// Column list for order history, embedding the purchased template.
const ORDER_SELECT: &str = "*,templates(id,title,price)";
/// Column list for reviews, embedding the reviewer's name.
const REVIEW_SELECT: &str = "*,users(full_name)";

/// Everything the application needs from the backend.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Register an account, returning a session or a pending-confirmation marker
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<SignUpOutcome, AuthError>;

    /// Exchange credentials for a session
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// End the active session; a no-op without one
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// The signed-in account with its profile merged in, if a session is active
    async fn current_user(&self) -> Option<CurrentUser>;

    /// All courses with embedded videos, ordered by semester
    async fn courses(&self) -> Result<Vec<Course>, DataError>;

    /// One course with embedded videos
    async fn course_by_id(&self, id: i64) -> Result<Option<Course>, DataError>;

    /// One page of templates, newest first, optionally category-filtered
    async fn templates(
        &self,
        category: Option<i64>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Template>, DataError>;

    /// All marketplace categories, alphabetical
    async fn categories(&self) -> Result<Vec<Category>, DataError>;

    /// One account's progress rows with course and video titles
    async fn user_progress(&self, user_id: Uuid) -> Result<Vec<ProgressEntry>, DataError>;

    /// Record progress on a video (insert-or-update)
    async fn update_progress(&self, update: ProgressUpdate) -> Result<(), DataError>;

    /// Record a purchase and return the stored row
    async fn create_order(&self, order: NewOrder) -> Result<Order, DataError>;

    /// One account's purchases with the template summary, newest first
    async fn user_orders(&self, user_id: Uuid) -> Result<Vec<Order>, DataError>;

    /// Reviews on one template with reviewer names, newest first
    async fn template_reviews(&self, template_id: i64) -> Result<Vec<Review>, DataError>;

    /// Post a review and return the stored row
    async fn create_review(&self, review: NewReview) -> Result<Review, DataError>;

    /// Subscribe to sign-in/sign-out notifications
    fn subscribe_auth_changes(&self) -> broadcast::Receiver<AuthChange>;
}

/// Production gateway speaking to the hosted backend.
pub struct HttpGateway {
    backend: Arc<BackendClient>,
}

impl HttpGateway {
    /// Create a gateway over the given client.
    pub fn new(backend: Arc<BackendClient>) -> Self {
        Self { backend }
    }

    /// Create a boxed gateway for use with dependency injection.
    pub fn boxed(backend: Arc<BackendClient>) -> Arc<dyn Gateway> {
        Arc::new(Self::new(backend))
    }
}

/// Swallow a read failure, log it, and hand back empty data.
fn absorb<T: Default>(resource: &str, result: Result<T, DataError>) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            warn!(
                "Failed to fetch {}: {}; continuing with empty data",
                resource, err
            );
            T::default()
        }
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<SignUpOutcome, AuthError> {
        let outcome = self
            .backend
            .sign_up_account(email, password, full_name)
            .await?;

        // The profile row backs the greeting and review bylines. The
        // account already exists here, so a failed insert must not turn
        // a successful sign-up into an error.
        if let SignUpOutcome::Active(session) = &outcome {
            let profile = UserProfile {
                id: session.user.id,
                email: email.to_string(),
                full_name: Some(full_name.to_string()),
                created_at: Utc::now(),
            };
            if let Err(err) = self.backend.table("users").insert(&profile).await {
                warn!("Failed to store the profile row for {}: {}", email, err);
            }
        }

        Ok(outcome)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.backend.sign_in_password(email, password).await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.backend.sign_out_session().await
    }

    async fn current_user(&self) -> Option<CurrentUser> {
        self.backend.session().await?;

        let account = match self.backend.fetch_auth_user().await {
            Ok(account) => account,
            Err(err) => {
                warn!("Failed to confirm the signed-in account: {}", err);
                return None;
            }
        };

        let profile = self
            .backend
            .table("users")
            .select("*")
            .eq("id", account.id)
            .fetch_single::<UserProfile>()
            .await;

        match profile {
            Ok(Some(profile)) => Some(CurrentUser {
                id: account.id,
                email: profile.email,
                full_name: profile.full_name.or(account.full_name),
            }),
            Ok(None) => Some(account),
            Err(err) => {
                warn!(
                    "Failed to fetch the profile for {}: {}; using auth data",
                    account.email, err
                );
                Some(account)
            }
        }
    }

    async fn courses(&self) -> Result<Vec<Course>, DataError> {
        let result = self
            .backend
            .table("courses")
            .select(COURSE_SELECT)
            .order("semester", OrderDirection::Ascending)
            .fetch::<Course>()
            .await
            .map(|mut courses| {
                for course in &mut courses {
                    course.sort_videos();
                }
                courses
            });

        Ok(absorb("courses", result))
    }

    async fn course_by_id(&self, id: i64) -> Result<Option<Course>, DataError> {
        let result = self
            .backend
            .table("courses")
            .select(COURSE_SELECT)
            .eq("id", id)
            .fetch_single::<Course>()
            .await
            .map(|course| {
                course.map(|mut course| {
                    course.sort_videos();
                    course
                })
            });

        Ok(absorb("course", result))
    }

    async fn templates(
        &self,
        category: Option<i64>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Template>, DataError> {
        let mut query = self
            .backend
            .table("templates")
            .select(TEMPLATE_SELECT)
            .order("created_at", OrderDirection::Descending)
            .limit(limit)
            .offset(offset);
        if let Some(category_id) = category {
            query = query.eq("category_id", category_id);
        }

        Ok(absorb("templates", query.fetch().await))
    }

    async fn categories(&self) -> Result<Vec<Category>, DataError> {
        let result = self
            .backend
            .table("categories")
            .select("*")
            .order("name", OrderDirection::Ascending)
            .fetch()
            .await;

        Ok(absorb("categories", result))
    }

    async fn user_progress(&self, user_id: Uuid) -> Result<Vec<ProgressEntry>, DataError> {
        let result = self
            .backend
            .table("user_progress")
            .select(PROGRESS_SELECT)
            .eq("user_id", user_id)
            .fetch()
            .await;

        Ok(absorb("user progress", result))
    }

    async fn update_progress(&self, update: ProgressUpdate) -> Result<(), DataError> {
        let row = json!({
            "user_id": update.user_id,
            "course_id": update.course_id,
            "video_id": update.video_id,
            "completed": update.completed,
            "watched_seconds": update.watched_seconds,
            "updated_at": Utc::now(),
        });

        self.backend.table("user_progress").upsert(&row).await
    }

    async fn create_order(&self, order: NewOrder) -> Result<Order, DataError> {
        let row = json!({
            "user_id": order.user_id,
            "template_id": order.template_id,
            "created_at": Utc::now(),
        });

        self.backend
            .table("orders")
            .select("*")
            .insert_returning(&row)
            .await
    }

    async fn user_orders(&self, user_id: Uuid) -> Result<Vec<Order>, DataError> {
        let result = self
            .backend
            .table("orders")
            .select(ORDER_SELECT)
            .eq("user_id", user_id)
            .order("created_at", OrderDirection::Descending)
            .fetch()
            .await;

        Ok(absorb("orders", result))
    }

    async fn template_reviews(&self, template_id: i64) -> Result<Vec<Review>, DataError> {
        let result = self
            .backend
            .table("reviews")
            .select(REVIEW_SELECT)
            .eq("template_id", template_id)
            .order("created_at", OrderDirection::Descending)
            .fetch()
            .await;

        Ok(absorb("reviews", result))
    }

    async fn create_review(&self, review: NewReview) -> Result<Review, DataError> {
        let row = json!({
            "user_id": review.user_id,
            "template_id": review.template_id,
            "rating": review.rating,
            "comment": review.comment,
            "created_at": Utc::now(),
        });

        self.backend
            .table("reviews")
            .select("*")
            .insert_returning(&row)
            .await
    }

    fn subscribe_auth_changes(&self) -> broadcast::Receiver<AuthChange> {
        self.backend.subscribe_changes()
    }
}
