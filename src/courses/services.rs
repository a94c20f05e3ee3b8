use std::collections::HashMap;

use uuid::Uuid;

use crate::{
    courses::{
        dto::{CourseView, InstructorRef},
        repo_types::{Course, CourseFilter},
    },
    error::AppError,
    store::{CourseStore, UserStore},
};

/// Which owner fields to expose when expanding `instructor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerFields {
    UsernameAndEmail,
    EmailOnly,
}

/// Expands each course's `instructor` id into a display reference.
/// Owners are looked up once per distinct id within this call.
pub async fn populate_instructors(
    users: &dyn UserStore,
    courses: Vec<Course>,
    fields: OwnerFields,
) -> Result<Vec<CourseView>, AppError> {
    let mut owners: HashMap<Uuid, InstructorRef> = HashMap::new();
    let mut out = Vec::with_capacity(courses.len());
    for course in courses {
        let owner = match owners.get(&course.instructor) {
            Some(r) => r.clone(),
            None => {
                let user = users.find_by_id(course.instructor).await?;
                let r = InstructorRef {
                    id: course.instructor,
                    username: match fields {
                        OwnerFields::UsernameAndEmail => user.as_ref().map(|u| u.username.clone()),
                        OwnerFields::EmailOnly => None,
                    },
                    email: user.map(|u| u.email),
                };
                owners.insert(course.instructor, r.clone());
                r
            }
        };
        out.push(CourseView::new(course, owner));
    }
    Ok(out)
}

pub async fn list_populated(
    users: &dyn UserStore,
    courses: &dyn CourseStore,
    filter: CourseFilter,
) -> Result<Vec<CourseView>, AppError> {
    let rows = courses.list(filter).await?;
    populate_instructors(users, rows, OwnerFields::UsernameAndEmail).await
}

/// Fetches the snapshot that access decisions run against.
pub async fn find_course(courses: &dyn CourseStore, id: Uuid) -> Result<Course, AppError> {
    courses
        .find_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Course not found."))
}
