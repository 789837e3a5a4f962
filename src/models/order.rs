//! Order model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A template purchase recorded for an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub user_id: Uuid,
    pub template_id: i64,
    pub created_at: DateTime<Utc>,
    /// Purchased template summary, embedded when the order history is
    /// fetched with a join select
    #[serde(default, rename = "templates")]
    pub template: Option<OrderedTemplate>,
}

/// The slice of a template carried along with an order row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderedTemplate {
    pub id: i64,
    pub title: String,
    pub price: i64,
}

/// Input for recording a new order.
///
/// The creation timestamp is stamped by the gateway when the row is
/// written.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub template_id: i64,
}
