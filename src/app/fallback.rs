//! Static fallback content
//!
//! When the hosted backend cannot be reached the page still renders
//! with a small seeded dataset instead of an error wall. The seeds
//! mirror real catalog entries so the degraded page stays plausible.

use crate::models::{Course, CourseVideo, Template};

/// Seeded course catalog shown when the backend is unreachable.
pub fn courses() -> Vec<Course> {
    vec![Course {
        id: 1,
        title: "Algoritma dan Pemrograman".to_string(),
        description: "Mempelajari dasar-dasar algoritma dan konsep pemrograman \
                      menggunakan berbagai bahasa pemrograman."
            .to_string(),
        semester: 1,
        credits: 3,
        image_url: None,
        videos: vec![CourseVideo {
            id: 1,
            title: "Introduction to Programming".to_string(),
            youtube_url: "https://www.youtube.com/embed/zOjov-2OZ0E".to_string(),
            duration: Some("45:30".to_string()),
            channel: Some("Edureka".to_string()),
            order_index: 1,
        }],
    }]
}

/// Find a seeded course by id.
pub fn course_by_id(id: i64) -> Option<Course> {
    courses().into_iter().find(|course| course.id == id)
}

/// Seeded marketplace templates shown when the backend is unreachable.
pub fn templates() -> Vec<Template> {
    vec![
        Template {
            id: 1,
            title: "Modern Landing Page".to_string(),
            description: "Template landing page modern dan responsif".to_string(),
            price: 500_000,
            rating: Some(4.8),
            sales: 150,
            preview_url: None,
            demo_url: None,
            category: None,
        },
        Template {
            id: 2,
            title: "Company Profile".to_string(),
            description: "Template company profile profesional untuk bisnis".to_string(),
            price: 750_000,
            rating: Some(4.6),
            sales: 89,
            preview_url: None,
            demo_url: None,
            category: None,
        },
        Template {
            id: 3,
            title: "Toko Online".to_string(),
            description: "Template toko online lengkap dengan katalog produk".to_string(),
            price: 1_200_000,
            rating: Some(4.9),
            sales: 210,
            preview_url: None,
            demo_url: None,
            category: None,
        },
    ]
}
