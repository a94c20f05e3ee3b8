use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    auth::{
        extractors::Principal,
        policy::{authorize, Action},
    },
    courses::{
        dto::{CourseRequest, CourseView, EnrollRequest},
        repo_types::{CourseFilter, NewCourse},
        services::{find_course, list_populated, populate_instructors, OwnerFields},
    },
    error::AppError,
    extract::{MaybeJson, ValidJson, ValidPath},
    state::AppState,
};

pub fn course_routes() -> Router<AppState> {
    Router::new()
        .route("/api/courses", get(list_courses).post(create_course))
        .route("/api/courses/instructor/:instructor_id", get(by_instructor))
        .route("/api/courses/findByName/:name", get(find_by_name))
        .route("/api/courses/student/:student_id", get(by_student))
        .route("/api/courses/enroll/:id", post(enroll))
        .route(
            "/api/courses/:id",
            get(get_course).patch(update_course).delete(delete_course),
        )
}

fn done(message: &str) -> Json<Value> {
    Json(json!({ "success": true, "message": message }))
}

#[instrument(skip(state, _principal))]
pub async fn list_courses(
    State(state): State<AppState>,
    _principal: Principal,
) -> Result<Json<Vec<CourseView>>, AppError> {
    let views = list_populated(
        state.users.as_ref(),
        state.courses.as_ref(),
        CourseFilter::All,
    )
    .await?;
    Ok(Json(views))
}

#[instrument(skip(state, _principal))]
pub async fn by_instructor(
    State(state): State<AppState>,
    _principal: Principal,
    ValidPath(instructor_id): ValidPath<Uuid>,
) -> Result<Json<Vec<CourseView>>, AppError> {
    let views = list_populated(
        state.users.as_ref(),
        state.courses.as_ref(),
        CourseFilter::ByInstructor(instructor_id),
    )
    .await?;
    Ok(Json(views))
}

#[instrument(skip(state, _principal))]
pub async fn find_by_name(
    State(state): State<AppState>,
    _principal: Principal,
    ValidPath(name): ValidPath<String>,
) -> Result<Json<Vec<CourseView>>, AppError> {
    let views = list_populated(
        state.users.as_ref(),
        state.courses.as_ref(),
        CourseFilter::ByTitle(name),
    )
    .await?;
    Ok(Json(views))
}

#[instrument(skip(state, _principal))]
pub async fn by_student(
    State(state): State<AppState>,
    _principal: Principal,
    ValidPath(student_id): ValidPath<Uuid>,
) -> Result<Json<Vec<CourseView>>, AppError> {
    let views = list_populated(
        state.users.as_ref(),
        state.courses.as_ref(),
        CourseFilter::ByStudent(student_id),
    )
    .await?;
    Ok(Json(views))
}

#[instrument(skip(state, _principal))]
pub async fn get_course(
    State(state): State<AppState>,
    _principal: Principal,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<Json<CourseView>, AppError> {
    let course = find_course(state.courses.as_ref(), id).await?;
    let mut views =
        populate_instructors(state.users.as_ref(), vec![course], OwnerFields::EmailOnly).await?;
    views
        .pop()
        .map(Json)
        .ok_or(AppError::NotFound("Course not found."))
}

#[instrument(skip(state, principal, body), fields(user_id = %principal.id))]
pub async fn create_course(
    State(state): State<AppState>,
    principal: Principal,
    ValidJson(body): ValidJson<CourseRequest>,
) -> Result<(StatusCode, Json<CourseView>), AppError> {
    let fields = body.validate()?;
    authorize(&principal, Action::CreateCourse)?;

    let course = state
        .courses
        .insert(NewCourse {
            title: fields.title,
            description: fields.description,
            price: fields.price,
            instructor: principal.id,
        })
        .await?;
    info!(course_id = %course.id, "course created");

    let mut views = populate_instructors(
        state.users.as_ref(),
        vec![course],
        OwnerFields::UsernameAndEmail,
    )
    .await?;
    let view = views
        .pop()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("created course not populated")))?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// Two concurrent enrollments of the same student may both pass the
/// membership check; the store append itself is idempotent.
#[instrument(skip(state, principal, body), fields(user_id = %principal.id))]
pub async fn enroll(
    State(state): State<AppState>,
    principal: Principal,
    ValidPath(id): ValidPath<Uuid>,
    MaybeJson(body): MaybeJson<EnrollRequest>,
) -> Result<Json<Value>, AppError> {
    let student_id = body.and_then(|b| b.user_id).unwrap_or(principal.id);

    let course = find_course(state.courses.as_ref(), id).await?;
    authorize(
        &principal,
        Action::Enroll {
            course: &course,
            student_id,
        },
    )?;

    state.courses.add_student(course.id, student_id).await?;
    info!(course_id = %course.id, %student_id, "student enrolled");
    Ok(done("Done Enrollment."))
}

#[instrument(skip(state, principal, body), fields(user_id = %principal.id))]
pub async fn update_course(
    State(state): State<AppState>,
    principal: Principal,
    ValidPath(id): ValidPath<Uuid>,
    ValidJson(body): ValidJson<CourseRequest>,
) -> Result<Json<Value>, AppError> {
    let changes = body.validate()?;
    let course = find_course(state.courses.as_ref(), id).await?;
    authorize(&principal, Action::UpdateCourse(&course))?;

    state
        .courses
        .update(course.id, changes)
        .await?
        .ok_or(AppError::NotFound("Course not found."))?;
    info!(course_id = %course.id, "course updated");
    Ok(done("Course updated."))
}

#[instrument(skip(state, principal), fields(user_id = %principal.id))]
pub async fn delete_course(
    State(state): State<AppState>,
    principal: Principal,
    ValidPath(id): ValidPath<Uuid>,
) -> Result<Json<Value>, AppError> {
    let course = find_course(state.courses.as_ref(), id).await?;
    authorize(&principal, Action::DeleteCourse(&course))?;

    if !state.courses.delete(course.id).await? {
        return Err(AppError::NotFound("Course not found."));
    }
    info!(course_id = %course.id, "course deleted");
    Ok(done("Course deleted."))
}
