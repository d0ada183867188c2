use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentTeacher;
use crate::core::state::AppState;
use crate::core::time::today_utc;
use crate::schemas::report::{
    AssignmentReportResponse, AttendanceReportQuery, AttendanceReportResponse,
    DailySummaryQuery, DailySummaryResponse,
};
use crate::services::reports;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/attendance", get(attendance_report))
        .route("/assignments/:assignment_id", get(assignment_report))
        .route("/daily-summary", get(daily_summary))
}

async fn attendance_report(
    Query(query): Query<AttendanceReportQuery>,
    CurrentTeacher(_teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<AttendanceReportResponse>, ApiError> {
    let report =
        reports::build_attendance_report(state.store().as_ref(), query.period, today_utc())
            .await?;
    Ok(Json(report.into()))
}

async fn assignment_report(
    Path(assignment_id): Path<String>,
    CurrentTeacher(_teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<AssignmentReportResponse>, ApiError> {
    let report = reports::build_assignment_report(state.store().as_ref(), &assignment_id).await?;
    Ok(Json(report.into()))
}

async fn daily_summary(
    Query(query): Query<DailySummaryQuery>,
    CurrentTeacher(_teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<DailySummaryResponse>, ApiError> {
    let summary = reports::daily_summary(state.store().as_ref(), &query.date).await?;
    Ok(Json(summary.into()))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;
    use tower::ServiceExt;

    use crate::core::time::{format_date, today_utc};
    use crate::test_support;

    const TEACHER: Option<(&str, &str)> = Some(("t1", "teacher"));
    const STUDENT: Option<(&str, &str)> = Some(("s1", "student"));

    async fn mark(ctx: &test_support::TestContext, student_id: &str, date: &str, status: &str) {
        let payload = json!({"student_id": student_id, "date": date, "status": status});
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::auth_request(
                Method::POST,
                "/api/v1/attendance",
                TEACHER,
                Some(payload),
            ))
            .await
            .expect("mark");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn weekly_report_includes_unmarked_students_at_zero() {
        let ctx = test_support::setup_test_context().await;
        test_support::insert_student(&ctx.store, "s1", "Ada Lovelace").await;
        test_support::insert_student(&ctx.store, "s2", "Blaise Pascal").await;

        let today = format_date(today_utc());
        mark(&ctx, "s1", &today, "present").await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::auth_request(
                Method::GET,
                "/api/v1/reports/attendance?period=week",
                TEACHER,
                None,
            ))
            .await
            .expect("report");

        let status = response.status();
        let body = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::OK, "response: {body}");
        assert_eq!(body["period"], "week");

        let students = body["students"].as_array().expect("students");
        assert_eq!(students.len(), 2);
        assert_eq!(students[0]["student_id"], "s1");
        assert_eq!(students[0]["percentage"], 100.0);
        assert_eq!(students[1]["student_id"], "s2");
        assert_eq!(students[1]["total"], 0);
        assert_eq!(students[1]["percentage"], 0.0);
    }

    #[tokio::test]
    async fn unknown_period_returns_bad_request() {
        let ctx = test_support::setup_test_context().await;

        let response = ctx
            .app
            .oneshot(test_support::auth_request(
                Method::GET,
                "/api/v1/reports/attendance?period=decade",
                TEACHER,
                None,
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reports_require_teacher_role() {
        let ctx = test_support::setup_test_context().await;

        let response = ctx
            .app
            .oneshot(test_support::auth_request(
                Method::GET,
                "/api/v1/reports/attendance?period=week",
                STUDENT,
                None,
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn assignment_report_counts_submissions_over_roster() {
        let ctx = test_support::setup_test_context().await;
        for (id, name) in
            [("s1", "Ada Lovelace"), ("s2", "Blaise Pascal"), ("s3", "Carl Gauss"), ("s4", "Dot Host")]
        {
            test_support::insert_student(&ctx.store, id, name).await;
        }
        test_support::insert_assignment(&ctx.store, "a1", "Worksheet 1", 100).await;

        for student_id in ["s1", "s2", "s3"] {
            let response = ctx
                .app
                .clone()
                .oneshot(test_support::auth_request(
                    Method::POST,
                    "/api/v1/progress/assignments/a1/submit",
                    Some((student_id, "student")),
                    None,
                ))
                .await
                .expect("submit");
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = ctx
            .app
            .oneshot(test_support::auth_request(
                Method::GET,
                "/api/v1/reports/assignments/a1",
                TEACHER,
                None,
            ))
            .await
            .expect("report");

        let status = response.status();
        let body = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::OK, "response: {body}");
        assert_eq!(body["submitted_count"], 3);
        assert_eq!(body["total_students"], 4);
    }

    #[tokio::test]
    async fn assignment_report_for_unknown_assignment_is_not_found() {
        let ctx = test_support::setup_test_context().await;

        let response = ctx
            .app
            .oneshot(test_support::auth_request(
                Method::GET,
                "/api/v1/reports/assignments/ghost",
                TEACHER,
                None,
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn daily_summary_counts_the_day() {
        let ctx = test_support::setup_test_context().await;
        test_support::insert_student(&ctx.store, "s1", "Ada Lovelace").await;
        test_support::insert_student(&ctx.store, "s2", "Blaise Pascal").await;

        mark(&ctx, "s1", "2024-03-14", "present").await;
        mark(&ctx, "s2", "2024-03-14", "late").await;

        let response = ctx
            .app
            .oneshot(test_support::auth_request(
                Method::GET,
                "/api/v1/reports/daily-summary?date=2024-03-14",
                TEACHER,
                None,
            ))
            .await
            .expect("summary");

        let status = response.status();
        let body = test_support::read_json(response).await;
        assert_eq!(status, StatusCode::OK, "response: {body}");
        assert_eq!(body["present"], 1);
        assert_eq!(body["late"], 1);
        assert_eq!(body["absent"], 0);
        assert_eq!(body["total_marked"], 2);
        assert_eq!(body["present_rate"], 50.0);
    }
}
