//! Shared fixtures for the integration suites: a scriptable gateway
//! and a surface that records every write the controller makes.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::{broadcast, Semaphore};
use uuid::Uuid;

use studihub::app::{Container, Notice, Surface};
use studihub::backend::{AuthChange, AuthError, DataError};
use studihub::gateway::Gateway;
use studihub::models::{
    Category, Course, CourseVideo, CurrentUser, NewOrder, NewReview, Order, ProgressEntry,
    ProgressUpdate, Review, Session, SignUpOutcome, Template,
};

pub fn sample_user() -> CurrentUser {
    CurrentUser {
        id: Uuid::parse_str("8b5f8f2e-6a3c-4f0a-9c84-2f4f3a1d9b10").expect("fixture id"),
        email: "budi@kampus.ac.id".to_string(),
        full_name: Some("Budi Santoso".to_string()),
    }
}

pub fn sample_session() -> Session {
    Session {
        access_token: "access-test".to_string(),
        refresh_token: "refresh-test".to_string(),
        expires_at: Utc::now() + Duration::hours(1),
        user: sample_user(),
    }
}

pub fn course(id: i64, semester: i32) -> Course {
    Course {
        id,
        title: format!("Mata Kuliah {id}"),
        description: "Deskripsi singkat".to_string(),
        semester,
        credits: 3,
        image_url: None,
        videos: vec![CourseVideo {
            id: id * 10,
            title: format!("Video {id}"),
            youtube_url: "https://www.youtube.com/embed/abc".to_string(),
            duration: None,
            channel: None,
            order_index: 1,
        }],
    }
}

pub fn template(id: i64) -> Template {
    Template {
        id,
        title: format!("Template {id}"),
        description: String::new(),
        price: 250_000,
        rating: None,
        sales: 5,
        preview_url: None,
        demo_url: None,
        category: None,
    }
}

/// What the scripted sign-up should produce.
pub enum SignUpScript {
    Active,
    ConfirmationRequired,
    Reject(String),
}

/// Gateway double with canned data and call accounting.
pub struct ScriptedGateway {
    reads_fail: bool,
    sign_in_ok: bool,
    sign_out_ok: bool,
    sign_up_script: SignUpScript,
    courses: Vec<Course>,
    course_detail: Option<Course>,
    template_pages: Mutex<VecDeque<Vec<Template>>>,
    current: Mutex<Option<CurrentUser>>,
    templates_gate: Option<Arc<Semaphore>>,
    templates_calls: AtomicUsize,
    sign_up_calls: AtomicUsize,
    categories_seen: Mutex<Vec<Option<i64>>>,
    auth_tx: broadcast::Sender<AuthChange>,
}

impl ScriptedGateway {
    pub fn new() -> Self {
        let (auth_tx, _) = broadcast::channel(8);
        Self {
            reads_fail: false,
            sign_in_ok: true,
            sign_out_ok: true,
            sign_up_script: SignUpScript::Active,
            courses: Vec::new(),
            course_detail: None,
            template_pages: Mutex::new(VecDeque::new()),
            current: Mutex::new(None),
            templates_gate: None,
            templates_calls: AtomicUsize::new(0),
            sign_up_calls: AtomicUsize::new(0),
            categories_seen: Mutex::new(Vec::new()),
            auth_tx,
        }
    }

    pub fn with_current_user(self, user: CurrentUser) -> Self {
        *self.current.lock().expect("current lock") = Some(user);
        self
    }

    pub fn with_courses(mut self, courses: Vec<Course>) -> Self {
        self.courses = courses;
        self
    }

    pub fn with_course(mut self, course: Course) -> Self {
        self.course_detail = Some(course);
        self
    }

    pub fn with_template_pages(self, pages: Vec<Vec<Template>>) -> Self {
        *self.template_pages.lock().expect("pages lock") = pages.into();
        self
    }

    pub fn failing_reads(mut self) -> Self {
        self.reads_fail = true;
        self
    }

    pub fn rejecting_sign_in(mut self) -> Self {
        self.sign_in_ok = false;
        self
    }

    pub fn failing_sign_out(mut self) -> Self {
        self.sign_out_ok = false;
        self
    }

    pub fn with_sign_up(mut self, script: SignUpScript) -> Self {
        self.sign_up_script = script;
        self
    }

    /// Make `templates` block until a permit is added to the gate.
    pub fn gated_templates(mut self, gate: Arc<Semaphore>) -> Self {
        self.templates_gate = Some(gate);
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn emit(&self, change: AuthChange) {
        let _ = self.auth_tx.send(change);
    }

    pub fn templates_calls(&self) -> usize {
        self.templates_calls.load(Ordering::SeqCst)
    }

    pub fn sign_up_calls(&self) -> usize {
        self.sign_up_calls.load(Ordering::SeqCst)
    }

    pub fn categories_seen(&self) -> Vec<Option<i64>> {
        self.categories_seen.lock().expect("categories lock").clone()
    }

    fn read_failure() -> DataError {
        DataError::Status {
            status: 500,
            message: "backend down".to_string(),
        }
    }
}

#[async_trait]
impl Gateway for ScriptedGateway {
    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        _full_name: &str,
    ) -> Result<SignUpOutcome, AuthError> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);
        match &self.sign_up_script {
            SignUpScript::Active => {
                let session = sample_session();
                *self.current.lock().expect("current lock") = Some(session.user.clone());
                Ok(SignUpOutcome::Active(session))
            }
            SignUpScript::ConfirmationRequired => Ok(SignUpOutcome::ConfirmationRequired {
                email: email.to_string(),
            }),
            SignUpScript::Reject(message) => Err(AuthError::Rejected(message.clone())),
        }
    }

    async fn sign_in(&self, _email: &str, _password: &str) -> Result<Session, AuthError> {
        if self.sign_in_ok {
            let session = sample_session();
            *self.current.lock().expect("current lock") = Some(session.user.clone());
            Ok(session)
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        if self.sign_out_ok {
            *self.current.lock().expect("current lock") = None;
            Ok(())
        } else {
            Err(AuthError::Rejected("revocation failed".to_string()))
        }
    }

    async fn current_user(&self) -> Option<CurrentUser> {
        self.current.lock().expect("current lock").clone()
    }

    async fn courses(&self) -> Result<Vec<Course>, DataError> {
        if self.reads_fail {
            Err(Self::read_failure())
        } else {
            Ok(self.courses.clone())
        }
    }

    async fn course_by_id(&self, id: i64) -> Result<Option<Course>, DataError> {
        if self.reads_fail {
            return Err(Self::read_failure());
        }
        Ok(self
            .course_detail
            .clone()
            .filter(|course| course.id == id))
    }

    async fn templates(
        &self,
        category: Option<i64>,
        _limit: u32,
        _offset: u32,
    ) -> Result<Vec<Template>, DataError> {
        self.templates_calls.fetch_add(1, Ordering::SeqCst);
        self.categories_seen
            .lock()
            .expect("categories lock")
            .push(category);

        if let Some(gate) = &self.templates_gate {
            gate.acquire().await.expect("gate open").forget();
        }
        if self.reads_fail {
            return Err(Self::read_failure());
        }

        Ok(self
            .template_pages
            .lock()
            .expect("pages lock")
            .pop_front()
            .unwrap_or_default())
    }

    async fn categories(&self) -> Result<Vec<Category>, DataError> {
        Ok(Vec::new())
    }

    async fn user_progress(&self, _user_id: Uuid) -> Result<Vec<ProgressEntry>, DataError> {
        Ok(Vec::new())
    }

    async fn update_progress(&self, _update: ProgressUpdate) -> Result<(), DataError> {
        Ok(())
    }

    async fn create_order(&self, _order: NewOrder) -> Result<Order, DataError> {
        Err(Self::read_failure())
    }

    async fn user_orders(&self, _user_id: Uuid) -> Result<Vec<Order>, DataError> {
        Ok(Vec::new())
    }

    async fn template_reviews(&self, _template_id: i64) -> Result<Vec<Review>, DataError> {
        Ok(Vec::new())
    }

    async fn create_review(&self, _review: NewReview) -> Result<Review, DataError> {
        Err(Self::read_failure())
    }

    fn subscribe_auth_changes(&self) -> broadcast::Receiver<AuthChange> {
        self.auth_tx.subscribe()
    }
}

/// One recorded surface mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Set(Container, String),
    Append(Container, String),
}

/// Surface that records writes instead of assembling a page.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub ops: Vec<SurfaceOp>,
    pub notices: Vec<Notice>,
    pub load_more_visible: Option<bool>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `set` made to a container, oldest first.
    pub fn sets(&self, container: Container) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::Set(target, html) if *target == container => Some(html.as_str()),
                _ => None,
            })
            .collect()
    }

    /// The content the container would show after replaying all ops.
    pub fn content(&self, container: Container) -> String {
        let mut content = String::new();
        for op in &self.ops {
            match op {
                SurfaceOp::Set(target, html) if *target == container => {
                    content = html.clone();
                }
                SurfaceOp::Append(target, html) if *target == container => {
                    content.push_str(html);
                }
                _ => {}
            }
        }
        content
    }

    pub fn notice_messages(&self) -> Vec<&str> {
        self.notices.iter().map(|notice| notice.message.as_str()).collect()
    }
}

impl Surface for RecordingSurface {
    fn set(&mut self, container: Container, html: String) {
        self.ops.push(SurfaceOp::Set(container, html));
    }

    fn append(&mut self, container: Container, html: String) {
        self.ops.push(SurfaceOp::Append(container, html));
    }

    fn notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    fn set_load_more_visible(&mut self, visible: bool) {
        self.load_more_visible = Some(visible);
    }
}
