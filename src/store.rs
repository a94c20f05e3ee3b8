use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::repo_types::{NewUser, User};
use crate::courses::repo_types::{Course, CourseChanges, CourseFilter, NewCourse};

/// Identity records keyed by id and email.
///
/// `insert` does not enforce email uniqueness; callers check `find_by_email`
/// first and accept that two concurrent registrations may both pass the check.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn insert(&self, user: NewUser) -> anyhow::Result<User>;
}

#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn list(&self, filter: CourseFilter) -> anyhow::Result<Vec<Course>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Course>>;
    async fn insert(&self, course: NewCourse) -> anyhow::Result<Course>;
    /// Returns `None` when no course has this id.
    async fn update(&self, id: Uuid, changes: CourseChanges) -> anyhow::Result<Option<Course>>;
    /// Returns whether a course was removed.
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    /// Appends `student_id` unless it is already present.
    async fn add_student(&self, course_id: Uuid, student_id: Uuid) -> anyhow::Result<()>;
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn insert(&self, user: NewUser) -> anyhow::Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password.into_string(),
            role: user.role,
            created_at: OffsetDateTime::now_utc(),
        };
        self.users.write().await.insert(user.id, user.clone());
        Ok(user)
    }
}

impl MemoryUserStore {
    /// Places a record as-is, bypassing registration. Used to seed admins.
    pub async fn put(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }
}

#[derive(Default)]
pub struct MemoryCourseStore {
    courses: RwLock<HashMap<Uuid, Course>>,
}

#[async_trait]
impl CourseStore for MemoryCourseStore {
    async fn list(&self, filter: CourseFilter) -> anyhow::Result<Vec<Course>> {
        let courses = self.courses.read().await;
        let mut out: Vec<Course> = courses
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        out.sort_by_key(|c| c.created_at);
        Ok(out)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Course>> {
        Ok(self.courses.read().await.get(&id).cloned())
    }

    async fn insert(&self, course: NewCourse) -> anyhow::Result<Course> {
        let course = Course {
            id: Uuid::new_v4(),
            title: course.title,
            description: course.description,
            price: course.price,
            instructor: course.instructor,
            students: Vec::new(),
            created_at: OffsetDateTime::now_utc(),
        };
        self.courses.write().await.insert(course.id, course.clone());
        Ok(course)
    }

    async fn update(&self, id: Uuid, changes: CourseChanges) -> anyhow::Result<Option<Course>> {
        let mut courses = self.courses.write().await;
        Ok(courses.get_mut(&id).map(|c| {
            c.title = changes.title;
            c.description = changes.description;
            c.price = changes.price;
            c.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.courses.write().await.remove(&id).is_some())
    }

    async fn add_student(&self, course_id: Uuid, student_id: Uuid) -> anyhow::Result<()> {
        let mut courses = self.courses.write().await;
        let course = courses
            .get_mut(&course_id)
            .ok_or_else(|| anyhow::anyhow!("course {course_id} vanished"))?;
        if !course.students.contains(&student_id) {
            course.students.push(student_id);
        }
        Ok(())
    }
}
