//! HTTP layer - routes and handlers
//!
//! The page is server-rendered from one shared controller:
//! - GET  /                        - assembled page
//! - POST /auth/sign-in            - sign in, redirect to /
//! - POST /auth/sign-up            - register, redirect to /
//! - POST /auth/sign-out           - sign out, redirect to /
//! - GET  /marketplace?category=   - first template page for a filter
//! - POST /marketplace/load-more   - next template page, redirect to /
//! - GET  /courses/{id}            - expand one course, render page
//! - GET  /healthz                 - liveness probe

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{Html, Redirect},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;

use crate::app::{run_load_more, AppController, PageSurface};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub app: Arc<Mutex<AppController<PageSurface>>>,
}

/// Form body for sign-in.
#[derive(Debug, Deserialize)]
pub struct SignInForm {
    pub email: String,
    pub password: String,
}

/// Form body for registration.
#[derive(Debug, Deserialize)]
pub struct SignUpForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Query string for the marketplace listing.
#[derive(Debug, Deserialize)]
pub struct MarketplaceQuery {
    pub category: Option<i64>,
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/auth/sign-in", post(sign_in))
        .route("/auth/sign-up", post(sign_up))
        .route("/auth/sign-out", post(sign_out))
        .route("/marketplace", get(marketplace))
        .route("/marketplace/load-more", post(load_more))
        .route("/courses/{id}", get(course_detail))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET / - the assembled page
async fn index(State(state): State<AppState>) -> Html<String> {
    Html(state.app.lock().await.render_page())
}

/// POST /auth/sign-in
async fn sign_in(State(state): State<AppState>, Form(form): Form<SignInForm>) -> Redirect {
    state
        .app
        .lock()
        .await
        .submit_sign_in(&form.email, &form.password)
        .await;
    Redirect::to("/")
}

/// POST /auth/sign-up
async fn sign_up(State(state): State<AppState>, Form(form): Form<SignUpForm>) -> Redirect {
    state
        .app
        .lock()
        .await
        .submit_sign_up(
            &form.full_name,
            &form.email,
            &form.password,
            &form.password_confirm,
        )
        .await;
    Redirect::to("/")
}

/// POST /auth/sign-out
async fn sign_out(State(state): State<AppState>) -> Redirect {
    state.app.lock().await.sign_out().await;
    Redirect::to("/")
}

/// GET /marketplace?category={id} - reset the listing to a filter
async fn marketplace(
    State(state): State<AppState>,
    Query(query): Query<MarketplaceQuery>,
) -> Html<String> {
    let mut app = state.app.lock().await;
    app.load_templates(query.category).await;
    Html(app.render_page())
}

/// POST /marketplace/load-more
async fn load_more(State(state): State<AppState>) -> Redirect {
    run_load_more(&state.app).await;
    Redirect::to("/")
}

/// GET /courses/{id} - expand one course
async fn course_detail(State(state): State<AppState>, Path(id): Path<i64>) -> Html<String> {
    let mut app = state.app.lock().await;
    app.show_course(id).await;
    Html(app.render_page())
}

/// GET /healthz
async fn healthz() -> &'static str {
    "ok"
}
