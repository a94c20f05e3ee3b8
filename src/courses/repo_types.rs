use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Course record. `instructor` is the owning user and never changes after insert.
#[derive(Debug, Clone, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub instructor: Uuid,
    pub students: Vec<Uuid>,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub instructor: Uuid,
}

/// Mutable part of a course. Ownership and enrollment are not patchable.
#[derive(Debug, Clone)]
pub struct CourseChanges {
    pub title: String,
    pub description: String,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CourseFilter {
    All,
    ByInstructor(Uuid),
    ByTitle(String),
    ByStudent(Uuid),
}

impl CourseFilter {
    pub fn matches(&self, course: &Course) -> bool {
        match self {
            CourseFilter::All => true,
            CourseFilter::ByInstructor(id) => course.instructor == *id,
            CourseFilter::ByTitle(title) => course.title == *title,
            CourseFilter::ByStudent(id) => course.students.contains(id),
        }
    }
}
