//! Course model
//!
//! Courses are the curriculum entries shown on the landing page. Each
//! course carries the videos that belong to it; the resource API embeds
//! them under the `course_videos` key when the course list is fetched
//! with a join select.

use serde::{Deserialize, Serialize};

/// A curriculum course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    /// Unique identifier
    pub id: i64,
    /// Course title
    pub title: String,
    /// Short description shown on the card
    #[serde(default)]
    pub description: String,
    /// Semester the course is taught in (1-based)
    pub semester: i32,
    /// Credit weight
    pub credits: i32,
    /// Cover image, if the course has a custom one
    #[serde(default)]
    pub image_url: Option<String>,
    /// Videos belonging to the course, embedded by the join select
    #[serde(default, rename = "course_videos")]
    pub videos: Vec<CourseVideo>,
}

impl Course {
    /// Sort the embedded videos into their curriculum order.
    ///
    /// The backend does not guarantee embedded row order, so this runs
    /// right after decoding.
    pub fn sort_videos(&mut self) {
        self.videos.sort_by_key(|video| video.order_index);
    }

    /// Number of videos attached to the course
    pub fn video_count(&self) -> usize {
        self.videos.len()
    }
}

/// A single lecture video inside a course.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseVideo {
    /// Unique identifier
    pub id: i64,
    /// Video title
    pub title: String,
    /// Embeddable YouTube URL
    pub youtube_url: String,
    /// Runtime as the uploader labeled it, e.g. "45:30"
    #[serde(default)]
    pub duration: Option<String>,
    /// Channel that published the video
    #[serde(default)]
    pub channel: Option<String>,
    /// Position of the video within its course
    #[serde(default)]
    pub order_index: i32,
}
