use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use traincast_audience::{ApprovalState, ContentKind, ProgressReport};
use traincast_shared::errors::{AppError, AppResult, ErrorCode};
use traincast_shared::types::api::ApiResponse;
use traincast_shared::types::auth::AuthUser;

use crate::events::publisher;
use crate::models::{ContentItem, ReadState};
use crate::services::content_service::{ContentDraft, TargetingSelection};
use crate::services::{content_service, directory_service, read_service};
use crate::AppState;

// --- GET /content ---

#[derive(Debug, Deserialize)]
pub struct ListContentParams {
    pub kind: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ContentListEntry {
    #[serde(flatten)]
    pub item: ContentItem,
    pub is_read: bool,
    pub read_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// The general listing: approval- and targeting-filtered for the caller,
/// newest first, each entry joined with the caller's read state.
pub async fn list_content(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(params): Query<ListContentParams>,
) -> AppResult<Json<ApiResponse<Vec<ContentListEntry>>>> {
    let kind = parse_kind(params.kind.as_deref())?;
    let items = content_service::resolve_visible(&state.db, user.id, kind).await?;

    let ids: Vec<Uuid> = items.iter().map(|item| item.id).collect();
    let reads = read_service::get_read_map(&state.db, user.id, &ids)?;

    let entries = items
        .into_iter()
        .map(|item| {
            let entry = reads.get(item.id).copied();
            ContentListEntry {
                is_read: entry.map(|e| e.is_read).unwrap_or(false),
                read_at: entry.map(|e| e.read_at),
                item,
            }
        })
        .collect();

    Ok(Json(ApiResponse::ok(entries)))
}

fn parse_kind(kind: Option<&str>) -> AppResult<Option<ContentKind>> {
    kind.map(str::parse::<ContentKind>)
        .transpose()
        .map_err(|e| AppError::new(ErrorCode::UnknownContentKind, e))
}

// --- GET /content/unread-count ---

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: usize,
}

pub async fn unread_count(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<UnreadCountResponse>>> {
    let count = content_service::count_unread(&state.db, user.id).await?;
    Ok(Json(ApiResponse::ok(UnreadCountResponse { count })))
}

// --- GET /content/:id ---

/// Detail view. Opening a visible item records the read; hidden items read
/// as not-found.
pub async fn get_content(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(content_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ContentItem>>> {
    let item = content_service::open_content(&state.db, user.id, user.role, content_id)?;
    Ok(Json(ApiResponse::ok(item)))
}

// --- POST /content/:id/read ---

pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(content_id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ReadState>>> {
    let read_state = read_service::mark_read(&state.db, user.id, content_id)?;
    Ok(Json(ApiResponse::ok(read_state)))
}

// --- GET /progress ---

pub async fn get_progress(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<ProgressReport>>> {
    let report = content_service::compute_progress(&state.db, user.id).await?;
    Ok(Json(ApiResponse::ok(report)))
}

// --- GET /memberships ---

pub async fn my_memberships(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Vec<String>>>> {
    let names = directory_service::group_names_for(&state.db, user.id)?;
    Ok(Json(ApiResponse::ok(names)))
}

// --- POST /content ---

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitContentRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1))]
    pub body: String,
    #[validate(length(max = 100))]
    pub category: Option<String>,
    pub kind: String,
    pub targeting_type: String,
    #[serde(default)]
    pub target_groups: Vec<String>,
    #[serde(default)]
    pub target_users: Vec<Uuid>,
}

/// Authoring for both roles: admins publish immediately, manager education
/// submissions land in the review queue.
pub async fn submit_content(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(body): Json<SubmitContentRequest>,
) -> AppResult<Json<ApiResponse<ContentItem>>> {
    body.validate().map_err(|e| AppError::Validation(e.to_string()))?;

    let kind: ContentKind = body
        .kind
        .parse()
        .map_err(|e: String| AppError::new(ErrorCode::UnknownContentKind, e))?;
    let targeting =
        TargetingSelection::from_request(&body.targeting_type, body.target_groups, body.target_users)?;

    let draft = ContentDraft {
        kind,
        title: body.title,
        body: body.body,
        category: body.category,
        targeting,
    };

    let item = content_service::create_content(&state.db, user.id, user.role, &draft)?;

    if item.approval_status == ApprovalState::Pending.to_string() {
        publisher::publish_content_submitted(
            &state.rabbitmq,
            item.id,
            user.id,
            &item.kind,
            &item.title,
        )
        .await;
    }

    Ok(Json(ApiResponse::ok(item)))
}
