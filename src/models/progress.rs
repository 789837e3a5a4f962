//! Learning progress model
//!
//! Progress rows record how far an account has watched each course
//! video. They are upserted, so writing the same (user, course, video)
//! combination twice updates the existing row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One account's progress on one course video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEntry {
    #[serde(default)]
    pub id: i64,
    pub user_id: Uuid,
    pub course_id: i64,
    pub video_id: i64,
    /// Whether the video was watched to the end
    #[serde(default)]
    pub completed: bool,
    /// Playback position in seconds
    #[serde(default)]
    pub watched_seconds: i32,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    /// Course summary, embedded by the join select
    #[serde(default, rename = "courses")]
    pub course: Option<CourseRef>,
    /// Video summary, embedded by the join select
    #[serde(default, rename = "course_videos")]
    pub video: Option<VideoRef>,
}

/// Course id and title carried along with a progress row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseRef {
    pub id: i64,
    pub title: String,
}

/// Video id and title carried along with a progress row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRef {
    pub id: i64,
    pub title: String,
}

/// Input for recording progress on a video.
///
/// The update timestamp is stamped by the gateway when the row is
/// upserted.
#[derive(Debug, Clone)]
pub struct ProgressUpdate {
    pub user_id: Uuid,
    pub course_id: i64,
    pub video_id: i64,
    pub completed: bool,
    pub watched_seconds: i32,
}
