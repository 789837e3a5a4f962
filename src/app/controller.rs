//! Page controller
//!
//! Owns the page state and is its only mutator: the auth widget, the
//! course catalog, the expanded course detail, and the paginated
//! marketplace. Every user action runs gateway call, state update,
//! render in that order and writes the resulting fragments to the
//! injected [`Surface`]. No action panics the page; read failures
//! degrade to the seeded fallback datasets.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::app::fallback;
use crate::app::render::Renderer;
use crate::app::surface::{Container, Notice, PageSurface, Surface};
use crate::backend::{AuthChange, DataError};
use crate::gateway::Gateway;
use crate::models::{Course, CurrentUser, SignUpOutcome, Template};

/// Authentication state of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Anonymous,
    /// A sign-in or sign-up is with the backend.
    Authenticating,
    Authenticated(CurrentUser),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}

/// A claimed marketplace page fetch.
///
/// Handed out by [`AppController::begin_load_more`] while the in-flight
/// guard is set; the gateway call runs with the controller unlocked and
/// the outcome goes back through [`AppController::finish_load_more`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadMoreRequest {
    category: Option<i64>,
    limit: u32,
    offset: u32,
}

impl LoadMoreRequest {
    pub fn category(&self) -> Option<i64> {
        self.category
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }
}

pub struct AppController<S: Surface> {
    gateway: Arc<dyn Gateway>,
    renderer: Renderer,
    surface: S,
    page_size: u32,
    auth: AuthState,
    courses: Vec<Course>,
    templates: Vec<Template>,
    /// 1-based count of loaded marketplace pages.
    templates_page: u32,
    /// Set after one empty page; no further loads happen.
    templates_exhausted: bool,
    /// In-flight guard; a second trigger is dropped, not queued.
    templates_loading: bool,
    category_filter: Option<i64>,
}

impl<S: Surface> AppController<S> {
    pub fn new(gateway: Arc<dyn Gateway>, renderer: Renderer, surface: S, page_size: u32) -> Self {
        Self {
            gateway,
            renderer,
            surface,
            page_size,
            auth: AuthState::Anonymous,
            courses: Vec::new(),
            templates: Vec::new(),
            templates_page: 0,
            templates_exhausted: false,
            templates_loading: false,
            category_filter: None,
        }
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn gateway(&self) -> Arc<dyn Gateway> {
        Arc::clone(&self.gateway)
    }

    pub fn templates_loaded(&self) -> usize {
        self.templates.len()
    }

    pub fn templates_exhausted(&self) -> bool {
        self.templates_exhausted
    }

    /// Restore the session, then populate every container.
    pub async fn init(&mut self) {
        self.auth = match self.gateway.current_user().await {
            Some(user) => AuthState::Authenticated(user),
            None => AuthState::Anonymous,
        };
        self.render_auth();

        self.load_courses().await;
        self.load_templates(None).await;
    }

    // ========================================================================
    // Courses
    // ========================================================================

    /// Fetch and render the course catalog.
    pub async fn load_courses(&mut self) {
        match self.gateway.courses().await {
            Ok(courses) => self.courses = courses,
            Err(err) => {
                warn!("Failed to load courses: {}; showing seeded catalog", err);
                self.courses = fallback::courses();
            }
        }

        let html = self.renderer.course_cards(&self.courses);
        self.surface.set(Container::Courses, html);
    }

    /// Fetch one course and render the expanded detail view.
    pub async fn show_course(&mut self, id: i64) {
        match self.gateway.course_by_id(id).await {
            Ok(Some(course)) => {
                let html = self.renderer.course_detail(&course);
                self.surface.set(Container::CourseDetail, html);
            }
            Ok(None) => {
                self.surface.set(Container::CourseDetail, String::new());
                self.surface.notice(Notice::error("Course tidak ditemukan"));
            }
            Err(err) => {
                warn!("Failed to load course {}: {}", id, err);
                match fallback::course_by_id(id) {
                    Some(course) => {
                        let html = self.renderer.course_detail(&course);
                        self.surface.set(Container::CourseDetail, html);
                    }
                    None => {
                        self.surface.set(Container::CourseDetail, String::new());
                        self.surface
                            .notice(Notice::error("Gagal memuat detail mata kuliah"));
                    }
                }
            }
        }
    }

    // ========================================================================
    // Marketplace
    // ========================================================================

    /// Fetch the first template page for the given filter, replacing the
    /// marketplace container and resetting pagination.
    pub async fn load_templates(&mut self, category: Option<i64>) {
        self.category_filter = category;
        self.templates_loading = false;
        self.templates_exhausted = false;

        match self.gateway.templates(category, self.page_size, 0).await {
            Ok(templates) => {
                self.templates_exhausted = templates.is_empty();
                self.templates = templates;
            }
            Err(err) => {
                warn!("Failed to load templates: {}; showing seeded catalog", err);
                self.templates = fallback::templates();
            }
        }
        self.templates_page = 1;

        let html = self.renderer.template_cards(&self.templates);
        self.surface.set(Container::Marketplace, html);
        self.surface
            .set_load_more_visible(!self.templates_exhausted);
    }

    /// Claim the next marketplace page, or `None` while a load is in
    /// flight or the listing is exhausted.
    pub fn begin_load_more(&mut self) -> Option<LoadMoreRequest> {
        if self.templates_loading || self.templates_exhausted {
            return None;
        }

        self.templates_loading = true;
        Some(LoadMoreRequest {
            category: self.category_filter,
            limit: self.page_size,
            offset: self.templates_page * self.page_size,
        })
    }

    /// Apply the outcome of a claimed page fetch.
    pub fn finish_load_more(
        &mut self,
        request: LoadMoreRequest,
        result: Result<Vec<Template>, DataError>,
    ) {
        self.templates_loading = false;

        // The filter may have changed while the fetch was in flight;
        // a page for the old listing must not land in the new one.
        if request.category != self.category_filter
            || request.offset != self.templates_page * self.page_size
        {
            debug!("Dropping a stale marketplace page");
            return;
        }

        match result {
            Ok(templates) if templates.is_empty() => {
                self.templates_exhausted = true;
                self.surface.set_load_more_visible(false);
            }
            Ok(templates) => {
                let html = self.renderer.template_cards(&templates);
                self.surface.append(Container::Marketplace, html);
                self.templates.extend(templates);
                self.templates_page += 1;
            }
            Err(err) => {
                warn!("Failed to load more templates: {}", err);
            }
        }
    }

    // ========================================================================
    // Auth
    // ========================================================================

    pub async fn submit_sign_in(&mut self, email: &str, password: &str) {
        self.auth = AuthState::Authenticating;
        self.render_auth();

        match self.gateway.sign_in(email, password).await {
            Ok(session) => {
                self.auth = AuthState::Authenticated(session.user);
                self.surface.notice(Notice::info("Login berhasil!"));
            }
            Err(err) => {
                self.auth = AuthState::Anonymous;
                self.surface
                    .notice(Notice::error(format!("Login gagal: {}", err)));
            }
        }
        self.render_auth();
    }

    pub async fn submit_sign_up(
        &mut self,
        full_name: &str,
        email: &str,
        password: &str,
        password_confirm: &str,
    ) {
        if password != password_confirm {
            self.surface.notice(Notice::error("Password tidak cocok!"));
            return;
        }

        self.auth = AuthState::Authenticating;
        self.render_auth();

        match self.gateway.sign_up(email, password, full_name).await {
            Ok(SignUpOutcome::Active(session)) => {
                self.auth = AuthState::Authenticated(session.user);
                self.surface.notice(Notice::info("Registrasi berhasil!"));
            }
            Ok(SignUpOutcome::ConfirmationRequired { .. }) => {
                self.auth = AuthState::Anonymous;
                self.surface.notice(Notice::info(
                    "Registrasi berhasil! Silakan cek email Anda untuk verifikasi.",
                ));
            }
            Err(err) => {
                self.auth = AuthState::Anonymous;
                self.surface
                    .notice(Notice::error(format!("Registrasi gagal: {}", err)));
            }
        }
        self.render_auth();
    }

    pub async fn sign_out(&mut self) {
        match self.gateway.sign_out().await {
            Ok(()) => {
                self.auth = AuthState::Anonymous;
                self.surface.notice(Notice::info("Logout berhasil!"));
            }
            Err(err) => {
                warn!("Sign-out failed: {}", err);
                self.surface
                    .notice(Notice::error("Gagal logout. Silakan coba lagi."));
            }
        }
        self.render_auth();
    }

    /// React to an out-of-band session change from the backend client.
    pub async fn apply_auth_change(&mut self, change: AuthChange) {
        match change {
            AuthChange::SignedIn(user) => {
                // Prefer the profile-merged identity when it is reachable.
                let user = self.gateway.current_user().await.unwrap_or(user);
                self.auth = AuthState::Authenticated(user);
            }
            AuthChange::SignedOut => {
                self.auth = AuthState::Anonymous;
            }
        }
        self.render_auth();
    }

    fn render_auth(&mut self) {
        let html = self.renderer.auth_greeting(&self.auth);
        self.surface.set(Container::AuthGreeting, html);
    }
}

impl AppController<PageSurface> {
    /// Assemble the full page, draining queued notices into banners.
    pub fn render_page(&mut self) -> String {
        let notices = self.surface.take_notices();
        let banners = self.renderer.notice_banners(&notices);
        self.surface.assemble(&banners)
    }
}

/// Run one load-more cycle against the shared controller.
///
/// The gateway call happens with the lock released so a concurrent
/// trigger observes the in-flight guard and is dropped instead of
/// queueing up a duplicate fetch.
pub async fn run_load_more<S: Surface>(app: &Mutex<AppController<S>>) {
    let (gateway, request) = {
        let mut controller = app.lock().await;
        match controller.begin_load_more() {
            Some(request) => (controller.gateway(), request),
            None => return,
        }
    };

    let result = gateway
        .templates(request.category(), request.limit(), request.offset())
        .await;

    app.lock().await.finish_load_more(request, result);
}
