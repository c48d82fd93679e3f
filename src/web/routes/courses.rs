use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    model::{
        CrudRepository, ResourceType, ResourceTyped,
        entity::{Course, Subtopic},
    },
    web::{
        AppState, Visitor, WebError, WebResult,
        dto::courses::{CourseCreateBody, CourseDetail, CourseProgressBody, CourseSummary},
        error::ErrorResponse,
        middlewares,
    },
};

const DEFAULT_PAGE_SIZE: i64 = 100;
const MAX_PAGE_SIZE: i64 = 500;

#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CourseListQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

impl CourseListQuery {
    fn bounds(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

pub fn routes<S>(state: AppState) -> Router<S> {
    Router::new()
        .route("/api/courses/", get(course_list_handler))
        .route("/api/courses/create/", post(course_create_handler))
        .route(
            "/api/courses/{id}/",
            get(course_detail_handler).delete(course_delete_handler),
        )
        .route("/api/courses/{id}/progress/", post(course_progress_handler))
        .route(
            "/api/courses/{id}/module/{module_index}/subtopic/{subtopic_index}/toggle/",
            post(subtopic_toggle_handler),
        )
        .layer(middleware::from_fn(middlewares::extract_visitor_fn))
        .with_state(state)
}

fn fetch_error(e: crate::model::DatabaseError) -> WebError {
    WebError::resource_fetch_error(Course::get_resource_type(), e)
}

/// Unreadable or mistyped JSON bodies are bad requests like any other
/// invalid payload.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> WebResult<T> {
    body.map(|Json(payload)| payload)
        .map_err(|e| WebError::resource_bad_request(Course::get_resource_type(), e.body_text()))
}

/// Loads a course owned by `visitor`. Unknown, foreign and malformed ids all
/// read as not found.
async fn find_owned(state: &AppState, visitor: &Visitor, id: &str) -> WebResult<Course> {
    let not_found = || WebError::resource_not_found(Course::get_resource_type());
    let id: Uuid = id.parse().map_err(|_| not_found())?;

    Course::find_by_id(state.pool(), visitor, id)
        .await
        .map_err(fetch_error)?
        .ok_or_else(not_found)
}

#[utoipa::path(
    get,
    path = "/api/courses/",
    description = "List the caller's courses, newest first",
    params(CourseListQuery),
    responses(
        (status = 200, description = "Courses collected", body = Vec<CourseSummary>),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("visitor" = [])
    )
)]
async fn course_list_handler(
    visitor: Visitor,
    State(state): State<AppState>,
    Query(query): Query<CourseListQuery>,
) -> WebResult<impl IntoResponse> {
    let (limit, offset) = query.bounds();
    let courses = Course::list(state.pool(), &visitor, limit, offset)
        .await
        .map_err(fetch_error)?;

    let body: Vec<CourseSummary> = courses.iter().map(CourseSummary::from).collect();
    Ok((StatusCode::OK, Json(body)))
}

#[utoipa::path(
    post,
    path = "/api/courses/create/",
    description = "Generate a course with the LLM, resolve its videos and store it",
    request_body = CourseCreateBody,
    responses(
        (status = 201, description = "Course generated", body = CourseDetail),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 500, description = "Generation failed", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("visitor" = [])
    )
)]
async fn course_create_handler(
    visitor: Visitor,
    State(state): State<AppState>,
    payload: Result<Json<CourseCreateBody>, JsonRejection>,
) -> WebResult<impl IntoResponse> {
    let request = json_body(payload)?.validate()?;

    let draft = state
        .pipeline()
        .generate(&request)
        .await
        .map_err(WebError::generation_failed)?;

    let course = Course::create(state.pool(), &visitor, draft)
        .await
        .map_err(fetch_error)?;

    tracing::info!("course {} created for visitor {}", course.id(), visitor.id());
    Ok((StatusCode::CREATED, Json(CourseDetail::from(&course))))
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}/",
    description = "Full course with modules and subtopics",
    params(
        ("id" = Uuid, Path, description = "ID of the course")
    ),
    responses(
        (status = 200, description = "Course found", body = CourseDetail),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("visitor" = [])
    )
)]
async fn course_detail_handler(
    visitor: Visitor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<impl IntoResponse> {
    let course = find_owned(&state, &visitor, &id).await?;
    Ok((StatusCode::OK, Json(CourseDetail::from(&course))))
}

#[utoipa::path(
    delete,
    path = "/api/courses/{id}/",
    description = "Delete a course",
    params(
        ("id" = Uuid, Path, description = "ID of the course")
    ),
    responses(
        (status = 204, description = "Course deleted"),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("visitor" = [])
    )
)]
async fn course_delete_handler(
    visitor: Visitor,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> WebResult<impl IntoResponse> {
    let course = find_owned(&state, &visitor, &id).await?;
    course
        .delete(state.pool(), &visitor)
        .await
        .map_err(fetch_error)?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/courses/{id}/progress/",
    description = "Move the course cursor. Omitted indices are left unchanged",
    params(
        ("id" = Uuid, Path, description = "ID of the course")
    ),
    request_body = CourseProgressBody,
    responses(
        (status = 200, description = "Cursor updated", body = CourseDetail),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("visitor" = [])
    )
)]
async fn course_progress_handler(
    visitor: Visitor,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<CourseProgressBody>, JsonRejection>,
) -> WebResult<impl IntoResponse> {
    let payload = json_body(payload)?;
    let mut course = find_owned(&state, &visitor, &id).await?;
    course
        .update_progress(
            state.pool(),
            &visitor,
            payload.module_index,
            payload.subtopic_index,
        )
        .await
        .map_err(fetch_error)?;

    Ok((StatusCode::OK, Json(CourseDetail::from(&course))))
}

#[utoipa::path(
    post,
    path = "/api/courses/{id}/module/{module_index}/subtopic/{subtopic_index}/toggle/",
    description = "Flip the completed flag of one subtopic",
    params(
        ("id" = Uuid, Path, description = "ID of the course"),
        ("module_index" = usize, Path, description = "Zero-based module position"),
        ("subtopic_index" = usize, Path, description = "Zero-based subtopic position"),
    ),
    responses(
        (status = 200, description = "Subtopic toggled", body = Subtopic),
        (status = 400, description = "Indices out of range", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "courses",
    security(
        ("visitor" = [])
    )
)]
async fn subtopic_toggle_handler(
    visitor: Visitor,
    State(state): State<AppState>,
    Path((id, module_index, subtopic_index)): Path<(String, usize, usize)>,
) -> WebResult<impl IntoResponse> {
    let mut course = find_owned(&state, &visitor, &id).await?;
    let subtopic = course
        .toggle_subtopic(state.pool(), &visitor, module_index, subtopic_index)
        .await
        .map_err(fetch_error)?
        .ok_or_else(|| WebError::resource_bad_request(ResourceType::Subtopic, "invalid indices"))?;

    Ok((StatusCode::OK, Json(subtopic)))
}
