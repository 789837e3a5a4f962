//! Resource API query builder
//!
//! Queries are assembled with a builder and executed in one shot:
//!
//! ```ignore
//! let courses: Vec<Course> = client
//!     .table("courses")
//!     .select("*,course_videos(id,title)")
//!     .order("semester", OrderDirection::Ascending)
//!     .fetch()
//!     .await?;
//! ```
//!
//! Filters use the resource API's predicate syntax (`column=eq.value`),
//! ranges use `limit`/`offset`, and embedded joins ride inside the
//! `select` column list.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::DataError;
use super::BackendClient;

/// Sort direction for `order` clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderDirection {
    Ascending,
    Descending,
}

impl OrderDirection {
    fn suffix(self) -> &'static str {
        match self {
            OrderDirection::Ascending => "asc",
            OrderDirection::Descending => "desc",
        }
    }
}

/// One pending request against a single resource.
///
/// Built by [`BackendClient::table`], consumed by one of the terminal
/// methods (`fetch`, `fetch_single`, `insert_returning`, `upsert`).
pub struct ResourceQuery<'a> {
    client: &'a BackendClient,
    resource: String,
    select: Option<String>,
    filters: Vec<(String, String)>,
    order: Vec<String>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl BackendClient {
    /// Start a query against the named resource.
    pub fn table(&self, resource: &str) -> ResourceQuery<'_> {
        ResourceQuery {
            client: self,
            resource: resource.to_string(),
            select: None,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }
}

impl<'a> ResourceQuery<'a> {
    /// Column list to return. Embedded resources use the
    /// `other_table(col,col)` join syntax.
    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_string());
        self
    }

    /// Keep only rows where `column` equals `value`.
    pub fn eq<V: std::fmt::Display>(mut self, column: &str, value: V) -> Self {
        self.filters
            .push((column.to_string(), format!("eq.{value}")));
        self
    }

    /// Sort by `column`. Repeated calls append secondary sort keys.
    pub fn order(mut self, column: &str, direction: OrderDirection) -> Self {
        self.order.push(format!("{}.{}", column, direction.suffix()));
        self
    }

    /// Return at most `limit` rows.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skip the first `offset` rows.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Query parameters in the order they were added, with `select`
    /// first and the range last. Stable ordering keeps request logs and
    /// tests readable.
    fn query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        if let Some(select) = &self.select {
            params.push(("select".to_string(), select.clone()));
        }
        for (column, predicate) in &self.filters {
            params.push((column.clone(), predicate.clone()));
        }
        if !self.order.is_empty() {
            params.push(("order".to_string(), self.order.join(",")));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            params.push(("offset".to_string(), offset.to_string()));
        }
        params
    }

    async fn send(
        self,
        method: reqwest::Method,
        prepare: impl FnOnce(reqwest::RequestBuilder) -> reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, DataError> {
        let token = self.client.bearer_token().await;
        let request = self
            .client
            .http
            .request(method, self.client.rest_url(&self.resource))
            .query(&self.query_params())
            .header("apikey", &self.client.anon_key)
            .bearer_auth(token);

        Ok(prepare(request).send().await?)
    }

    /// Fetch all matching rows.
    pub async fn fetch<T: DeserializeOwned>(self) -> Result<Vec<T>, DataError> {
        let response = self.send(reqwest::Method::GET, |request| request).await?;
        let body = success_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Fetch exactly one row, with absence reported as `Ok(None)`.
    ///
    /// Sends the single-object Accept header; the resource API answers
    /// 406 when no row matches the filters.
    pub async fn fetch_single<T: DeserializeOwned>(self) -> Result<Option<T>, DataError> {
        let response = self
            .send(reqwest::Method::GET, |request| {
                request.header("Accept", "application/vnd.pgrst.object+json")
            })
            .await?;

        if response.status() == reqwest::StatusCode::NOT_ACCEPTABLE {
            return Ok(None);
        }

        let body = success_body(response).await?;
        Ok(Some(serde_json::from_str(&body)?))
    }

    /// Insert one row and decode the created row from the response.
    pub async fn insert_returning<T: DeserializeOwned>(
        self,
        row: &impl Serialize,
    ) -> Result<T, DataError> {
        let body = serde_json::to_string(&[row]).map_err(DataError::Decode)?;
        let response = self
            .send(reqwest::Method::POST, |request| {
                request
                    .header("Accept", "application/vnd.pgrst.object+json")
                    .header("Prefer", "return=representation")
                    .header("Content-Type", "application/json")
                    .body(body)
            })
            .await?;

        let body = success_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Insert one row without reading anything back.
    pub async fn insert(self, row: &impl Serialize) -> Result<(), DataError> {
        let body = serde_json::to_string(&[row]).map_err(DataError::Decode)?;
        let response = self
            .send(reqwest::Method::POST, |request| {
                request.header("Content-Type", "application/json").body(body)
            })
            .await?;

        success_body(response).await?;
        Ok(())
    }

    /// Insert or update one row, merging on the resource's conflict
    /// target. Nothing is decoded back.
    pub async fn upsert(self, row: &impl Serialize) -> Result<(), DataError> {
        let body = serde_json::to_string(&[row]).map_err(DataError::Decode)?;
        let response = self
            .send(reqwest::Method::POST, |request| {
                request
                    .header("Prefer", "resolution=merge-duplicates")
                    .header("Content-Type", "application/json")
                    .body(body)
            })
            .await?;

        success_body(response).await?;
        Ok(())
    }
}

/// Read the body and turn non-success statuses into [`DataError::Status`].
async fn success_body(response: reqwest::Response) -> Result<String, DataError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(DataError::from_status(status.as_u16(), &body));
    }
    Ok(body)
}
