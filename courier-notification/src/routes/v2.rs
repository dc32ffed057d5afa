use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use courier_shared::errors::{AppError, AppResult};
use courier_shared::types::api::ApiResponse;
use courier_shared::types::{PageParams, Paginated};

use crate::models::{CreateNotificationRequest, Notification};
use crate::routes::notifications::{reject_bad_body, UnreadCountResponse};
use crate::AppState;

/// Versioned surface: explicit recipient identity required, paginated
/// listing, no-body mark-as-read. Semantics are the engine's; only the
/// request/response shapes differ from the flat surface.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedListQuery {
    pub user_id: Option<String>,
    pub page: Option<u64>,
    pub size: Option<u64>,
}

impl PagedListQuery {
    fn page_params(&self) -> PageParams {
        let defaults = PageParams::default();
        PageParams {
            page: self.page.unwrap_or(defaults.page),
            size: self.size.unwrap_or(defaults.size),
        }
    }
}

fn require_user_id(user_id: Option<String>) -> AppResult<String> {
    user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("userId is required"))
}

/// GET /api/v2/notifications?userId=&page=&size=
pub async fn list_notifications(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PagedListQuery>,
) -> AppResult<Json<ApiResponse<Paginated<Notification>>>> {
    let params = query.page_params();
    let recipient_id = require_user_id(query.user_id)?;
    let page = state
        .service
        .list_for_recipient_paged(&recipient_id, &params)?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/v2/notifications/:id
pub async fn get_notification(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Notification>>> {
    let notification = state.service.get_by_id(id)?;
    Ok(Json(ApiResponse::ok(notification)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Option<String>,
}

/// GET /api/v2/notifications/unread/count?userId=
pub async fn unread_count(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<ApiResponse<UnreadCountResponse>>> {
    let recipient_id = require_user_id(query.user_id)?;
    let count = state.service.unread_count(&recipient_id)?;
    Ok(Json(ApiResponse::ok(UnreadCountResponse { count })))
}

/// POST /api/v2/notifications
pub async fn create_notification(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateNotificationRequest>, JsonRejection>,
) -> AppResult<Json<ApiResponse<Notification>>> {
    let Json(request) = body.map_err(reject_bad_body)?;
    let notification = state.service.create(request)?;
    Ok(Json(ApiResponse::ok(notification)))
}

/// PATCH /api/v2/notifications/:id/read
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.service.mark_as_read(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v2/notifications/:id
pub async fn delete_notification(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.service.delete(id)?;
    Ok(StatusCode::NO_CONTENT)
}
