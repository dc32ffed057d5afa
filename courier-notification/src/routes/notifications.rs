use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use courier_shared::errors::{AppError, AppResult};
use courier_shared::types::api::ApiResponse;

use crate::models::{CreateNotificationRequest, Notification};
use crate::AppState;

/// The original unversioned surface. Prefer `/api/v2/notifications` for
/// new clients; this one stays for backwards compatibility and supports
/// the configurable fallback recipient for identity-less dev requests.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipientQuery {
    pub user_id: Option<String>,
}

fn resolve_recipient(state: &AppState, query: RecipientQuery) -> AppResult<String> {
    query
        .user_id
        .filter(|id| !id.trim().is_empty())
        .or_else(|| state.config.fallback_recipient_id.clone())
        .ok_or_else(|| AppError::bad_request("userId is required"))
}

/// Malformed bodies (bad JSON, unknown enum variants) land on 400 with the
/// structured error envelope instead of the extractor's default rejection.
pub fn reject_bad_body(rejection: JsonRejection) -> AppError {
    AppError::bad_request(rejection.body_text())
}

/// GET /notifications
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecipientQuery>,
) -> AppResult<Json<ApiResponse<Vec<Notification>>>> {
    let recipient_id = resolve_recipient(&state, query)?;
    let items = state.service.list_for_recipient(&recipient_id)?;
    Ok(Json(ApiResponse::ok(items)))
}

#[derive(Debug, serde::Serialize)]
pub struct UnreadCountResponse {
    pub count: u64,
}

/// GET /notifications/unread/count
pub async fn unread_count(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecipientQuery>,
) -> AppResult<Json<ApiResponse<UnreadCountResponse>>> {
    let recipient_id = resolve_recipient(&state, query)?;
    let count = state.service.unread_count(&recipient_id)?;
    Ok(Json(ApiResponse::ok(UnreadCountResponse { count })))
}

/// POST /notifications
pub async fn create_notification(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateNotificationRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Notification>>> {
    let Json(request) = body.map_err(reject_bad_body)?;
    let notification = state.service.create(request)?;
    Ok(Json(ApiResponse::ok(notification)))
}

/// PUT /notifications/:id/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Notification>>> {
    let notification = state.service.mark_as_read(id)?;
    Ok(Json(ApiResponse::ok(notification)))
}

/// DELETE /notifications/:id
pub async fn delete_notification(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.service.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}
