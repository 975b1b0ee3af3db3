use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use traincast_shared::errors::{AppError, AppResult};
use traincast_shared::middleware::AdminUser;
use traincast_shared::types::api::ApiResponse;
use traincast_shared::types::pagination::{Paginated, PaginationParams};

use crate::events::publisher;
use crate::models::{ContentItem, Group, GroupMember, User};
use crate::services::content_service::TargetingSelection;
use crate::services::{content_service, directory_service};
use crate::AppState;

// --- GET /review-queue ---

/// Pending education submissions, newest first. No audience filtering:
/// admins must see every pending item to adjudicate it.
pub async fn review_queue(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<ApiResponse<Paginated<ContentItem>>>> {
    let limit = params.limit() as i64;
    let offset = params.offset() as i64;

    let (items, total) = content_service::list_pending(&state.db, limit, offset)?;

    let paginated = Paginated::new(items, total as u64, &params);
    Ok(Json(ApiResponse::ok(paginated)))
}

// --- POST /content/:id/approve ---

pub async fn approve_content(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(content_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ContentItem>>> {
    let item = content_service::approve_content(&state.db, content_id)?;

    publisher::publish_content_approved(&state.rabbitmq, item.id, admin.0.id, &item.kind).await;

    Ok(Json(ApiResponse::ok(item)))
}

// --- DELETE /content/:id ---

#[derive(Debug, Serialize)]
pub struct ContentDeletedResponse {
    pub deleted: bool,
}

/// Removes the item and cascades its target rows and read states.
pub async fn delete_content(
    State(state): State<Arc<AppState>>,
    admin: AdminUser,
    Path(content_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ContentDeletedResponse>>> {
    content_service::delete_content(&state.db, content_id)?;

    publisher::publish_content_deleted(&state.rabbitmq, content_id, admin.0.id).await;

    Ok(Json(ApiResponse::ok(ContentDeletedResponse { deleted: true })))
}

// --- PUT /content/:id/targeting ---

#[derive(Debug, Deserialize)]
pub struct RetargetRequest {
    pub targeting_type: String,
    #[serde(default)]
    pub target_groups: Vec<String>,
    #[serde(default)]
    pub target_users: Vec<Uuid>,
}

pub async fn replace_targeting(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(content_id): Path<Uuid>,
    Json(body): Json<RetargetRequest>,
) -> AppResult<Json<ApiResponse<ContentItem>>> {
    let targeting =
        TargetingSelection::from_request(&body.targeting_type, body.target_groups, body.target_users)?;

    let item = content_service::replace_targeting(&state.db, content_id, &targeting)?;
    Ok(Json(ApiResponse::ok(item)))
}

// --- Directory ---

pub async fn list_users(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> AppResult<Json<ApiResponse<Vec<User>>>> {
    let users = directory_service::list_users(&state.db)?;
    Ok(Json(ApiResponse::ok(users)))
}

pub async fn get_user(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<User>>> {
    let user = directory_service::get_user(&state.db, user_id)?;
    Ok(Json(ApiResponse::ok(user)))
}

pub async fn list_groups(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
) -> AppResult<Json<ApiResponse<Vec<Group>>>> {
    let groups = directory_service::list_groups(&state.db)?;
    Ok(Json(ApiResponse::ok(groups)))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
}

pub async fn create_group(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Json(body): Json<CreateGroupRequest>,
) -> AppResult<Json<ApiResponse<Group>>> {
    body.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let group = directory_service::create_group(&state.db, &body.name)?;
    Ok(Json(ApiResponse::ok(group)))
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: Uuid,
}

pub async fn add_member(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path(group_id): Path<Uuid>,
    Json(body): Json<AddMemberRequest>,
) -> AppResult<Json<ApiResponse<GroupMember>>> {
    let member = directory_service::add_member(&state.db, group_id, body.user_id)?;
    Ok(Json(ApiResponse::ok(member)))
}

#[derive(Debug, Serialize)]
pub struct MemberRemovedResponse {
    pub removed: bool,
}

pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    _admin: AdminUser,
    Path((group_id, user_id)): Path<(Uuid, Uuid)>,
) -> AppResult<Json<ApiResponse<MemberRemovedResponse>>> {
    directory_service::remove_member(&state.db, group_id, user_id)?;
    Ok(Json(ApiResponse::ok(MemberRemovedResponse { removed: true })))
}
