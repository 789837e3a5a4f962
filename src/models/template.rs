//! Marketplace template model
//!
//! Templates are the products sold on the marketplace page. The resource
//! API embeds the owning category under the `categories` key.

use serde::{Deserialize, Serialize};

/// Rating shown when a template has not collected any reviews yet.
pub const DEFAULT_RATING: f64 = 4.8;

/// A website template offered on the marketplace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    /// Unique identifier
    pub id: i64,
    /// Template title
    pub title: String,
    /// Short description shown on the card
    #[serde(default)]
    pub description: String,
    /// Price in whole rupiah
    pub price: i64,
    /// Average review rating on a 0-5 scale
    #[serde(default)]
    pub rating: Option<f64>,
    /// Number of completed sales
    #[serde(default)]
    pub sales: i64,
    /// Preview image
    #[serde(default)]
    pub preview_url: Option<String>,
    /// Live demo link
    #[serde(default)]
    pub demo_url: Option<String>,
    /// Category the template belongs to, embedded by the join select
    #[serde(default, rename = "categories")]
    pub category: Option<Category>,
}

impl Template {
    /// Rating to display, substituting the default for unrated templates
    pub fn display_rating(&self) -> f64 {
        self.rating.unwrap_or(DEFAULT_RATING)
    }
}

/// A marketplace category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// Display name
    pub name: String,
}
