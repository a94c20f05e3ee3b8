use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::courses::repo_types::{Course, CourseChanges, CourseFilter, NewCourse};
use crate::store::CourseStore;

const COURSE_COLUMNS: &str = "id, title, description, price, instructor, students, created_at";

#[derive(Clone)]
pub struct PgCourseStore {
    db: PgPool,
}

impl PgCourseStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CourseStore for PgCourseStore {
    async fn list(&self, filter: CourseFilter) -> anyhow::Result<Vec<Course>> {
        let base = format!("SELECT {COURSE_COLUMNS} FROM courses");
        let rows = match filter {
            CourseFilter::All => {
                sqlx::query_as::<_, Course>(&format!("{base} ORDER BY created_at"))
                    .fetch_all(&self.db)
                    .await
            }
            CourseFilter::ByInstructor(id) => {
                sqlx::query_as::<_, Course>(&format!(
                    "{base} WHERE instructor = $1 ORDER BY created_at"
                ))
                .bind(id)
                .fetch_all(&self.db)
                .await
            }
            CourseFilter::ByTitle(title) => {
                sqlx::query_as::<_, Course>(&format!("{base} WHERE title = $1 ORDER BY created_at"))
                    .bind(title)
                    .fetch_all(&self.db)
                    .await
            }
            CourseFilter::ByStudent(id) => {
                sqlx::query_as::<_, Course>(&format!(
                    "{base} WHERE $1 = ANY(students) ORDER BY created_at"
                ))
                .bind(id)
                .fetch_all(&self.db)
                .await
            }
        }
        .context("list courses")?;
        Ok(rows)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(&format!(
            "SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find course by id")?;
        Ok(course)
    }

    async fn insert(&self, course: NewCourse) -> anyhow::Result<Course> {
        let course = sqlx::query_as::<_, Course>(&format!(
            r#"
            INSERT INTO courses (title, description, price, instructor)
            VALUES ($1, $2, $3, $4)
            RETURNING {COURSE_COLUMNS}
            "#
        ))
        .bind(&course.title)
        .bind(&course.description)
        .bind(course.price)
        .bind(course.instructor)
        .fetch_one(&self.db)
        .await
        .context("insert course")?;
        Ok(course)
    }

    async fn update(&self, id: Uuid, changes: CourseChanges) -> anyhow::Result<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(&format!(
            r#"
            UPDATE courses
               SET title = $2, description = $3, price = $4
             WHERE id = $1
            RETURNING {COURSE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.price)
        .fetch_optional(&self.db)
        .await
        .context("update course")?;
        Ok(course)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete course")?;
        Ok(res.rows_affected() > 0)
    }

    async fn add_student(&self, course_id: Uuid, student_id: Uuid) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE courses
               SET students = array_append(students, $2)
             WHERE id = $1 AND NOT ($2 = ANY(students))
            "#,
        )
        .bind(course_id)
        .bind(student_id)
        .execute(&self.db)
        .await
        .context("enroll student")?;
        Ok(())
    }
}
