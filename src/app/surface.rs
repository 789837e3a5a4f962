//! Render surface abstraction
//!
//! The controller never touches HTML documents directly; it writes
//! rendered fragments into named containers on a [`Surface`]. The
//! production [`PageSurface`] accumulates those fragments and stitches
//! the full page shell; tests substitute a recording surface to assert
//! on what was written where.

/// Named fragment targets on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// The course grid on the landing section
    Courses,
    /// The expanded view of a single course
    CourseDetail,
    /// The marketplace template grid
    Marketplace,
    /// The greeting / auth controls in the header
    AuthGreeting,
}

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Error,
}

impl NoticeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NoticeKind::Info => "info",
            NoticeKind::Error => "error",
        }
    }
}

/// A one-shot user notification, shown once and then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Where rendered fragments land.
pub trait Surface: Send {
    /// Replace the container's content.
    fn set(&mut self, container: Container, html: String);

    /// Add to the end of the container's content.
    fn append(&mut self, container: Container, html: String);

    /// Queue a one-shot notification.
    fn notice(&mut self, notice: Notice);

    /// Show or hide the marketplace load-more control.
    fn set_load_more_visible(&mut self, visible: bool);
}

/// Production surface backing the server-rendered page.
///
/// Holds the last rendered fragment per container plus the pending
/// notices, and assembles the page shell on demand. Notices drain when
/// they are taken, so each one is shown exactly once.
#[derive(Debug, Default)]
pub struct PageSurface {
    courses: String,
    course_detail: String,
    marketplace: String,
    auth_greeting: String,
    notices: Vec<Notice>,
    load_more_visible: bool,
}

impl PageSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, container: Container) -> &mut String {
        match container {
            Container::Courses => &mut self.courses,
            Container::CourseDetail => &mut self.course_detail,
            Container::Marketplace => &mut self.marketplace,
            Container::AuthGreeting => &mut self.auth_greeting,
        }
    }

    /// Current content of a container.
    pub fn fragment(&self, container: Container) -> &str {
        match container {
            Container::Courses => &self.courses,
            Container::CourseDetail => &self.course_detail,
            Container::Marketplace => &self.marketplace,
            Container::AuthGreeting => &self.auth_greeting,
        }
    }

    /// Take the queued notices, leaving none behind.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn load_more_visible(&self) -> bool {
        self.load_more_visible
    }

    /// Stitch the full page shell around the current fragments.
    ///
    /// `notice_banners` is the already-rendered notice fragment; the
    /// caller is responsible for draining the notices it renders.
    pub fn assemble(&self, notice_banners: &str) -> String {
        let load_more = if self.load_more_visible {
            concat!(
                r#"<form method="post" action="/marketplace/load-more" class="load-more">"#,
                r#"<button type="submit">Muat Lebih Banyak</button></form>"#
            )
        } else {
            ""
        };

        let course_detail = if self.course_detail.is_empty() {
            String::new()
        } else {
            format!(
                r#"<section id="course-detail" class="container mx-auto px-4 py-8">{}</section>"#,
                self.course_detail
            )
        };

        format!(
            r#"<!DOCTYPE html>
<html lang="id">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>StudiHub - Portal Belajar Informatika</title>
<script src="https://cdn.tailwindcss.com"></script>
</head>
<body class="bg-gray-50">
<header class="site-header flex justify-between items-center px-4 py-3 bg-white shadow">
<a class="brand text-xl font-bold" href="/">StudiHub</a>
<div id="auth-greeting">{auth}</div>
</header>
<div id="notices">{notices}</div>
<main>
<section id="courses" class="container mx-auto px-4 py-8">
<h2 class="text-2xl font-bold mb-4">Mata Kuliah</h2>
<div class="course-grid grid gap-6 md:grid-cols-3">{courses}</div>
</section>
{detail}
<section id="marketplace" class="container mx-auto px-4 py-8">
<h2 class="text-2xl font-bold mb-4">Marketplace Template</h2>
<div class="template-grid grid gap-4 md:grid-cols-4">{marketplace}</div>
{load_more}
</section>
</main>
<footer class="site-footer text-center text-gray-500 py-6">StudiHub</footer>
</body>
</html>"#,
            auth = self.auth_greeting,
            notices = notice_banners,
            courses = self.courses,
            detail = course_detail,
            marketplace = self.marketplace,
            load_more = load_more,
        )
    }
}

impl Surface for PageSurface {
    fn set(&mut self, container: Container, html: String) {
        *self.slot(container) = html;
    }

    fn append(&mut self, container: Container, html: String) {
        self.slot(container).push_str(&html);
    }

    fn notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    fn set_load_more_visible(&mut self, visible: bool) {
        self.load_more_visible = visible;
    }
}
