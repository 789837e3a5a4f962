//! HTML fragment rendering
//!
//! Fragments are rendered from embedded Tera templates. Model rows are
//! precomputed into plain JSON values so the templates stay logic-free:
//! prices arrive formatted, artwork URLs resolved, WhatsApp links built.
//! A render failure is logged and yields an empty fragment so one bad
//! template never takes the whole page down.

use serde_json::json;
use tera::{Context as TeraContext, Tera};

use crate::app::controller::AuthState;
use crate::app::surface::Notice;
use crate::config::ContentConfig;
use crate::models::{Course, CourseVideo, Template};

const COURSE_CARDS_TEMPLATE: &str = include_str!("templates/course_cards.html");
const COURSE_DETAIL_TEMPLATE: &str = include_str!("templates/course_detail.html");
const TEMPLATE_CARDS_TEMPLATE: &str = include_str!("templates/template_cards.html");
const AUTH_GREETING_TEMPLATE: &str = include_str!("templates/auth_greeting.html");
const NOTICES_TEMPLATE: &str = include_str!("templates/notices.html");

/// Artwork shown for courses without an image, cycled by course id.
const COURSE_IMAGES: [&str; 4] = [
    "https://images.unsplash.com/photo-1555066931-4365d14bab8c?w=300&h=200&fit=crop",
    "https://images.unsplash.com/photo-1558494949-ef010cbdcc31?w=300&h=200&fit=crop",
    "https://images.unsplash.com/photo-1547658719-da2b51169166?w=300&h=200&fit=crop",
    "https://images.unsplash.com/photo-1558618666-fcd25c85cd64?w=300&h=200&fit=crop",
];

/// Artwork shown for templates without a preview image.
const TEMPLATE_IMAGE: &str =
    "https://images.unsplash.com/photo-1460925895917-adfb0aad7b2f?w=300&h=200&fit=crop";

/// Renders page fragments from the embedded templates.
pub struct Renderer {
    tera: Tera,
    contact_number: String,
}

impl Renderer {
    pub fn new(content: &ContentConfig) -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template("course_cards.html", COURSE_CARDS_TEMPLATE)?;
        tera.add_raw_template("course_detail.html", COURSE_DETAIL_TEMPLATE)?;
        tera.add_raw_template("template_cards.html", TEMPLATE_CARDS_TEMPLATE)?;
        tera.add_raw_template("auth_greeting.html", AUTH_GREETING_TEMPLATE)?;
        tera.add_raw_template("notices.html", NOTICES_TEMPLATE)?;

        Ok(Self {
            tera,
            contact_number: content.contact_number.clone(),
        })
    }

    /// Course grid cards.
    pub fn course_cards(&self, courses: &[Course]) -> String {
        let rows: Vec<_> = courses.iter().map(|course| self.course_row(course)).collect();

        let mut context = TeraContext::new();
        context.insert("courses", &rows);
        self.render("course_cards.html", &context)
    }

    /// Expanded course view with its video list.
    pub fn course_detail(&self, course: &Course) -> String {
        let videos: Vec<_> = course
            .videos
            .iter()
            .map(|video| self.video_row(course, video))
            .collect();

        let mut context = TeraContext::new();
        context.insert(
            "course",
            &json!({
                "title": course.title,
                "description": course.description,
                "semester": course.semester,
                "credits": course.credits,
            }),
        );
        context.insert("videos", &videos);
        self.render("course_detail.html", &context)
    }

    /// Marketplace template cards.
    pub fn template_cards(&self, templates: &[Template]) -> String {
        let rows: Vec<_> = templates
            .iter()
            .map(|template| self.template_row(template))
            .collect();

        let mut context = TeraContext::new();
        context.insert("templates", &rows);
        self.render("template_cards.html", &context)
    }

    /// Header greeting and auth controls for the current state.
    pub fn auth_greeting(&self, state: &AuthState) -> String {
        let mut context = TeraContext::new();
        match state {
            AuthState::Anonymous => context.insert("state", "anonymous"),
            AuthState::Authenticating => context.insert("state", "authenticating"),
            AuthState::Authenticated(user) => {
                context.insert("state", "authenticated");
                context.insert("name", user.display_name());
            }
        }
        self.render("auth_greeting.html", &context)
    }

    /// Banner markup for queued notices.
    pub fn notice_banners(&self, notices: &[Notice]) -> String {
        if notices.is_empty() {
            return String::new();
        }

        let rows: Vec<_> = notices
            .iter()
            .map(|notice| {
                json!({
                    "kind": notice.kind.as_str(),
                    "message": notice.message,
                })
            })
            .collect();

        let mut context = TeraContext::new();
        context.insert("notices", &rows);
        self.render("notices.html", &context)
    }

    fn render(&self, template: &str, context: &TeraContext) -> String {
        match self.tera.render(template, context) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Failed to render template '{}': {}", template, e);
                String::new()
            }
        }
    }

    fn course_row(&self, course: &Course) -> serde_json::Value {
        json!({
            "id": course.id,
            "title": course.title,
            "description": course.description,
            "semester": course.semester,
            "credits": course.credits,
            "video_count": course.video_count(),
            "image_url": course_image(course),
            "ask_link": self.wa_link(&format!(
                "Halo, saya ingin tahu lebih lanjut tentang mata kuliah {}",
                course.title
            )),
        })
    }

    fn video_row(&self, course: &Course, video: &CourseVideo) -> serde_json::Value {
        json!({
            "title": video.title,
            "channel": video.channel.clone().unwrap_or_default(),
            "duration": video.duration.clone().unwrap_or_default(),
            "watch_url": video.youtube_url.replace("/embed/", "/watch?v="),
            "help_link": self.wa_link(&format!(
                "Halo, saya butuh bantuan dengan video {} dari mata kuliah {}",
                video.title, course.title
            )),
        })
    }

    fn template_row(&self, template: &Template) -> serde_json::Value {
        let category = template
            .category
            .as_ref()
            .map(|category| category.name.as_str())
            .unwrap_or("General");
        let price = format_rupiah(template.price);

        json!({
            "title": template.title,
            "description": template.description,
            "category": category,
            "rating": format!("{:.1}", template.display_rating()),
            "sales": template.sales,
            "price_label": format!("Rp {}", price),
            "image_url": template_image(template),
            "buy_link": self.wa_link(&format!(
                "Halo, saya tertarik dengan template {} seharga Rp {}",
                template.title, price
            )),
            "demo_url": template
                .demo_url
                .as_deref()
                .filter(|url| !url.is_empty())
                .unwrap_or("#"),
        })
    }

    /// WhatsApp deep link with the message preencoded.
    fn wa_link(&self, text: &str) -> String {
        format!(
            "https://wa.me/{}?text={}",
            self.contact_number,
            urlencoding::encode(text)
        )
    }
}

/// Group digits Indonesian style: 1500000 becomes "1.500.000".
pub fn format_rupiah(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if amount < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

fn course_image(course: &Course) -> String {
    course
        .image_url
        .as_deref()
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            let index = (course.id - 1).rem_euclid(COURSE_IMAGES.len() as i64) as usize;
            COURSE_IMAGES[index].to_string()
        })
}

fn template_image(template: &Template) -> String {
    template
        .preview_url
        .as_deref()
        .filter(|url| !url.is_empty())
        .unwrap_or(TEMPLATE_IMAGE)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, CurrentUser};
    use uuid::Uuid;

    fn renderer() -> Renderer {
        Renderer::new(&ContentConfig::default()).expect("embedded templates should parse")
    }

    fn sample_course() -> Course {
        Course {
            id: 1,
            title: "Algoritma dan Pemrograman".to_string(),
            description: "Dasar-dasar algoritma".to_string(),
            semester: 1,
            credits: 3,
            image_url: None,
            videos: vec![CourseVideo {
                id: 10,
                title: "Pengenalan".to_string(),
                youtube_url: "https://www.youtube.com/embed/zOjov-2OZ0E".to_string(),
                duration: Some("45:30".to_string()),
                channel: Some("Edureka".to_string()),
                order_index: 1,
            }],
        }
    }

    fn sample_template() -> Template {
        Template {
            id: 1,
            title: "Modern Landing Page".to_string(),
            description: "Template landing page modern".to_string(),
            price: 500_000,
            rating: Some(4.8),
            sales: 150,
            preview_url: None,
            demo_url: None,
            category: None,
        }
    }

    #[test]
    fn test_format_rupiah_grouping() {
        assert_eq!(format_rupiah(0), "0");
        assert_eq!(format_rupiah(500), "500");
        assert_eq!(format_rupiah(1_500), "1.500");
        assert_eq!(format_rupiah(500_000), "500.000");
        assert_eq!(format_rupiah(1_200_000), "1.200.000");
    }

    #[test]
    fn test_wa_link_encodes_message() {
        let link = renderer().wa_link("Halo, saya tertarik");

        assert!(link.starts_with("https://wa.me/6283119226089?text="));
        assert!(link.contains("Halo%2C%20saya%20tertarik"));
        assert!(!link.contains(' '));
    }

    #[test]
    fn test_course_cards_content() {
        let html = renderer().course_cards(&[sample_course()]);

        assert!(html.contains("Algoritma dan Pemrograman"));
        assert!(html.contains("Semester 1"));
        assert!(html.contains("3 SKS"));
        assert!(html.contains("1 Video Pembelajaran"));
        assert!(html.contains("/courses/1"));
        assert!(html.contains("photo-1555066931-4365d14bab8c"));
    }

    #[test]
    fn test_course_image_cycles_by_id() {
        let mut course = sample_course();

        course.id = 2;
        assert!(course_image(&course).contains("photo-1558494949"));
        course.id = 5;
        assert!(course_image(&course).contains("photo-1555066931"));
        course.image_url = Some("https://example.com/own.png".to_string());
        assert_eq!(course_image(&course), "https://example.com/own.png");
    }

    #[test]
    fn test_course_detail_videos() {
        let html = renderer().course_detail(&sample_course());

        assert!(html.contains("1. Pengenalan"));
        assert!(html.contains("watch?v=zOjov-2OZ0E"));
        assert!(html.contains("Tonton di YouTube"));
        assert!(html.contains("Edureka"));
        assert!(!html.contains("Belum ada video"));
    }

    #[test]
    fn test_course_detail_empty_state() {
        let mut course = sample_course();
        course.videos.clear();

        let html = renderer().course_detail(&course);

        assert!(html.contains("Belum ada video pembelajaran tersedia."));
    }

    #[test]
    fn test_template_cards_content() {
        let html = renderer().template_cards(&[sample_template()]);

        assert!(html.contains("Modern Landing Page"));
        assert!(html.contains("Rp 500.000"));
        assert!(html.contains("150 terjual"));
        assert!(html.contains("4.8"));
        // no category and no demo link on the sample
        assert!(html.contains("General"));
        assert!(html.contains("href=\"#\""));
    }

    #[test]
    fn test_template_cards_category_badge() {
        let mut template = sample_template();
        template.category = Some(Category {
            id: 3,
            name: "Landing Page".to_string(),
        });

        let html = renderer().template_cards(&[template]);

        assert!(html.contains("Landing Page"));
        assert!(!html.contains("General"));
    }

    #[test]
    fn test_auth_greeting_states() {
        let renderer = renderer();
        let user = CurrentUser {
            id: Uuid::new_v4(),
            email: "budi@kampus.ac.id".to_string(),
            full_name: Some("Budi Santoso".to_string()),
        };

        let signed_in = renderer.auth_greeting(&AuthState::Authenticated(user));
        assert!(signed_in.contains("Halo, Budi Santoso"));
        assert!(signed_in.contains("/auth/sign-out"));

        let anonymous = renderer.auth_greeting(&AuthState::Anonymous);
        assert!(anonymous.contains("Masuk"));
        assert!(anonymous.contains("/auth/sign-in"));
        assert!(anonymous.contains("/auth/sign-up"));

        let pending = renderer.auth_greeting(&AuthState::Authenticating);
        assert!(pending.contains("Memproses"));
    }

    #[test]
    fn test_notice_banners_escape_markup() {
        let renderer = renderer();
        let banners = renderer.notice_banners(&[
            Notice::info("Login berhasil!"),
            Notice::error("<script>alert(1)</script>"),
        ]);

        assert!(banners.contains("notice-info"));
        assert!(banners.contains("notice-error"));
        assert!(banners.contains("Login berhasil!"));
        assert!(!banners.contains("<script>"));
        assert!(banners.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_notice_banners_empty() {
        assert_eq!(renderer().notice_banners(&[]), "");
    }
}
