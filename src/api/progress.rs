use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentTeacher, CurrentUser, UserRole};
use crate::core::state::AppState;
use crate::schemas::progress::{AssignmentProgressRow, GradeRequest, ProgressResponse};
use crate::services::progress;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/assignments/:assignment_id", get(assignment_overview))
        .route("/assignments/:assignment_id/submit", post(submit))
        .route("/assignments/:assignment_id/students/:student_id", get(get_progress))
        .route("/assignments/:assignment_id/students/:student_id/grade", post(grade))
        .route("/assignments/:assignment_id/students/:student_id/viewed", post(mark_viewed))
}

/// Students submit for themselves; the key's student side comes from the
/// forwarded identity, never from the body.
async fn submit(
    Path(assignment_id): Path<String>,
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ProgressResponse>, ApiError> {
    if user.role != UserRole::Student {
        return Err(ApiError::Forbidden("Only students submit assignments"));
    }

    let record =
        progress::submit_assignment(state.store().as_ref(), &assignment_id, &user.id).await?;
    Ok(Json(record.into()))
}

async fn grade(
    Path((assignment_id, student_id)): Path<(String, String)>,
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<GradeRequest>,
) -> Result<Json<ProgressResponse>, ApiError> {
    payload.validate().map_err(|err| ApiError::BadRequest(err.to_string()))?;

    let record = progress::grade_assignment(
        state.store().as_ref(),
        &assignment_id,
        &student_id,
        payload.marks,
        &teacher.id,
    )
    .await?;

    Ok(Json(record.into()))
}

async fn mark_viewed(
    Path((assignment_id, student_id)): Path<(String, String)>,
    CurrentTeacher(_teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    progress::mark_viewed(state.store().as_ref(), &assignment_id, &student_id).await?;
    Ok(Json(serde_json::json!({"message": "Submission marked as viewed"})))
}

async fn get_progress(
    Path((assignment_id, student_id)): Path<(String, String)>,
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ProgressResponse>, ApiError> {
    if user.role != UserRole::Teacher && user.id != student_id {
        return Err(ApiError::Forbidden("Access denied"));
    }

    let record = progress::progress(state.store().as_ref(), &assignment_id, &student_id).await?;
    Ok(Json(record.into()))
}

async fn assignment_overview(
    Path(assignment_id): Path<String>,
    CurrentTeacher(_teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<Vec<AssignmentProgressRow>>, ApiError> {
    let entries =
        progress::progress_for_assignment(state.store().as_ref(), &assignment_id).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}
