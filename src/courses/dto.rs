use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    courses::repo_types::{Course, CourseChanges},
    error::AppError,
    validation::{check_len, check_range},
};

/// Body of course create and update. Both replace all three fields.
#[derive(Debug, Deserialize)]
pub struct CourseRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: f64,
}

impl CourseRequest {
    pub fn validate(self) -> Result<CourseChanges, AppError> {
        check_len("title", &self.title, 6, 50)?;
        check_len("description", &self.description, 6, 50)?;
        check_range("price", self.price, 10.0, 9999.0)?;
        Ok(CourseChanges {
            title: self.title,
            description: self.description,
            price: self.price,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct EnrollRequest {
    /// Defaults to the caller when absent.
    pub user_id: Option<Uuid>,
}

/// Owner reference expanded for display.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InstructorRef {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub instructor: InstructorRef,
    pub students: Vec<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl CourseView {
    pub fn new(course: Course, instructor: InstructorRef) -> Self {
        Self {
            id: course.id,
            title: course.title,
            description: course.description,
            price: course.price,
            instructor,
            students: course.students,
            created_at: course.created_at,
        }
    }
}
