use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentTeacher, CurrentUser, UserRole};
use crate::core::state::AppState;
use crate::schemas::attendance::{
    AttendanceRecordResponse, DayEntryResponse, MarkAttendanceRequest, RangeQuery,
};
use crate::services::attendance;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(mark_attendance))
        .route("/day/:date", get(day_view))
        .route("/students/:student_id", get(student_range))
}

async fn mark_attendance(
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<MarkAttendanceRequest>,
) -> Result<Json<AttendanceRecordResponse>, ApiError> {
    payload.validate().map_err(|err| ApiError::BadRequest(err.to_string()))?;

    let record = attendance::mark_attendance(
        state.store().as_ref(),
        &payload.student_id,
        &payload.date,
        payload.status,
        &teacher.id,
    )
    .await?;

    Ok(Json(record.into()))
}

async fn day_view(
    Path(date): Path<String>,
    CurrentTeacher(_teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<Vec<DayEntryResponse>>, ApiError> {
    let entries = attendance::attendance_for_date(state.store().as_ref(), &date).await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

async fn student_range(
    Path(student_id): Path<String>,
    Query(query): Query<RangeQuery>,
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<AttendanceRecordResponse>>, ApiError> {
    if user.role != UserRole::Teacher && user.id != student_id {
        return Err(ApiError::Forbidden("Access denied"));
    }

    let records = attendance::attendance_in_range(
        state.store().as_ref(),
        &student_id,
        &query.start_date,
        &query.end_date,
    )
    .await?;

    Ok(Json(records.into_iter().map(Into::into).collect()))
}
