//! Data models
//!
//! This module contains all data structures used throughout StudiHub.
//! Models represent:
//! - Backend resources (Course, Template, Order, Review, ProgressEntry, UserProfile)
//! - Auth types (CurrentUser, Session, SignUpOutcome)
//! - Write inputs (NewOrder, NewReview, ProgressUpdate)

mod course;
mod order;
mod progress;
mod review;
mod template;
mod user;

pub use course::{Course, CourseVideo};
pub use order::{NewOrder, Order, OrderedTemplate};
pub use progress::{CourseRef, ProgressEntry, ProgressUpdate, VideoRef};
pub use review::{NewReview, Review, ReviewAuthor};
pub use template::{Category, Template, DEFAULT_RATING};
pub use user::{CurrentUser, Session, SignUpOutcome, UserProfile};
