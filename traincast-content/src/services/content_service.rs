use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use traincast_audience::{
    aggregate, filter_visible, is_visible, ApprovalState, ContentKind, MembershipIndex,
    ProgressReport, ReadMap, TargetGroupRow, TargetIndex, TargetUserRow, TargetingKind,
};
use traincast_shared::clients::db::DbPool;
use traincast_shared::errors::{AppError, AppResult, ErrorCode};
use traincast_shared::types::auth::StaffRole;

use crate::models::{
    ContentItem, NewContentItem, NewContentTargetGroup, NewContentTargetUser,
};
use crate::schema::{content_items, content_target_groups, content_target_users, read_states};
use crate::services::{directory_service, read_service};

// --- Authoring input ---

/// The audience selection attached to an authoring or retargeting request.
#[derive(Debug, Clone)]
pub enum TargetingSelection {
    Groups(Vec<String>),
    Users(Vec<Uuid>),
}

impl TargetingSelection {
    /// Build a selection from a request body's targeting fields. The rows
    /// for the non-selected mode are ignored rather than rejected.
    pub fn from_request(
        targeting_type: &str,
        groups: Vec<String>,
        users: Vec<Uuid>,
    ) -> AppResult<Self> {
        let kind: TargetingKind = targeting_type
            .parse()
            .map_err(|e: String| AppError::new(ErrorCode::UnknownTargetingType, e))?;

        Ok(match kind {
            TargetingKind::Group => TargetingSelection::Groups(groups),
            TargetingKind::Individual => TargetingSelection::Users(users),
        })
    }

    pub fn kind(&self) -> TargetingKind {
        match self {
            TargetingSelection::Groups(_) => TargetingKind::Group,
            TargetingSelection::Users(_) => TargetingKind::Individual,
        }
    }

    /// An empty selection is rejected here, at the authoring boundary. The
    /// resolver cannot tell "deliberately open to all" (legacy rows) apart
    /// from "forgot to select", so the distinction has to be enforced
    /// before rows are written.
    pub fn validate(&self) -> AppResult<()> {
        let empty = match self {
            TargetingSelection::Groups(names) => names.is_empty(),
            TargetingSelection::Users(ids) => ids.is_empty(),
        };
        if empty {
            return Err(AppError::new(
                ErrorCode::EmptyTargetSelection,
                "at least one target group or user must be selected",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ContentDraft {
    pub kind: ContentKind,
    pub title: String,
    pub body: String,
    pub category: Option<String>,
    pub targeting: TargetingSelection,
}

/// Admins publish directly; manager submissions to the education collection
/// wait in the review queue. Best-practice posts have no review stage.
pub fn initial_approval_state(kind: ContentKind, role: StaffRole) -> ApprovalState {
    match (kind, role) {
        (ContentKind::BestPractice, _) => ApprovalState::Approved,
        (ContentKind::Education, StaffRole::Admin) => ApprovalState::Approved,
        (ContentKind::Education, StaffRole::Manager) => ApprovalState::Pending,
    }
}

fn get_conn(pool: &DbPool) -> AppResult<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>> {
    pool.get().map_err(|e| {
        tracing::error!(error = %e, "failed to get db connection");
        AppError::internal("database connection error")
    })
}

fn insert_target_rows(
    conn: &mut PgConnection,
    content_id: Uuid,
    targeting: &TargetingSelection,
) -> Result<(), diesel::result::Error> {
    match targeting {
        TargetingSelection::Groups(names) => {
            let rows: Vec<NewContentTargetGroup> = names
                .iter()
                .map(|name| NewContentTargetGroup {
                    content_id,
                    group_name: name.clone(),
                })
                .collect();
            diesel::insert_into(content_target_groups::table)
                .values(&rows)
                .execute(conn)?;
        }
        TargetingSelection::Users(ids) => {
            let rows: Vec<NewContentTargetUser> = ids
                .iter()
                .map(|user_id| NewContentTargetUser {
                    content_id,
                    user_id: *user_id,
                })
                .collect();
            diesel::insert_into(content_target_users::table)
                .values(&rows)
                .execute(conn)?;
        }
    }
    Ok(())
}

// --- Authoring / lifecycle ---

/// Create a content item together with its target rows in one transaction.
pub fn create_content(
    pool: &DbPool,
    author_id: Uuid,
    role: StaffRole,
    draft: &ContentDraft,
) -> AppResult<ContentItem> {
    draft.targeting.validate()?;

    let mut conn = get_conn(pool)?;
    let approval = initial_approval_state(draft.kind, role);

    let new_item = NewContentItem {
        kind: draft.kind.to_string(),
        title: draft.title.clone(),
        body: draft.body.clone(),
        category: draft.category.clone(),
        targeting_type: draft.targeting.kind().to_string(),
        approval_status: approval.to_string(),
        author_id,
    };

    let item = conn.transaction::<ContentItem, diesel::result::Error, _>(|conn| {
        let item = diesel::insert_into(content_items::table)
            .values(&new_item)
            .get_result::<ContentItem>(conn)?;
        insert_target_rows(conn, item.id, &draft.targeting)?;
        Ok(item)
    })?;

    tracing::info!(
        content_id = %item.id,
        kind = %item.kind,
        approval_status = %item.approval_status,
        "content item created"
    );

    Ok(item)
}

/// Replace an item's audience wholesale: both target tables are cleared and
/// the new selection inserted in the same transaction. Target rows are
/// never patched in place.
pub fn replace_targeting(
    pool: &DbPool,
    content_id: Uuid,
    targeting: &TargetingSelection,
) -> AppResult<ContentItem> {
    targeting.validate()?;

    let mut conn = get_conn(pool)?;

    let item = conn.transaction::<ContentItem, AppError, _>(|conn| {
        let exists: i64 = content_items::table
            .filter(content_items::id.eq(content_id))
            .count()
            .get_result(conn)?;
        if exists == 0 {
            return Err(AppError::new(ErrorCode::ContentNotFound, "content item not found"));
        }

        diesel::delete(
            content_target_groups::table.filter(content_target_groups::content_id.eq(content_id)),
        )
        .execute(conn)?;
        diesel::delete(
            content_target_users::table.filter(content_target_users::content_id.eq(content_id)),
        )
        .execute(conn)?;

        insert_target_rows(conn, content_id, targeting)?;

        let item = diesel::update(content_items::table.find(content_id))
            .set(content_items::targeting_type.eq(targeting.kind().to_string()))
            .get_result::<ContentItem>(conn)?;

        Ok(item)
    })?;

    Ok(item)
}

/// `pending -> approved`, terminal. Approving twice is a conflict.
pub fn approve_content(pool: &DbPool, content_id: Uuid) -> AppResult<ContentItem> {
    let mut conn = get_conn(pool)?;

    let item = content_items::table
        .find(content_id)
        .first::<ContentItem>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ContentNotFound, "content item not found"))?;

    if item.approval_status == ApprovalState::Approved.to_string() {
        return Err(AppError::new(
            ErrorCode::ContentAlreadyApproved,
            "this item has already been approved",
        ));
    }

    let updated = diesel::update(content_items::table.find(content_id))
        .set(content_items::approval_status.eq(ApprovalState::Approved.to_string()))
        .get_result::<ContentItem>(&mut conn)?;

    Ok(updated)
}

/// Delete an item and everything hanging off it. Orphaned target or read
/// rows would corrupt aggregate counts, so the cascade runs in one
/// transaction.
pub fn delete_content(pool: &DbPool, content_id: Uuid) -> AppResult<()> {
    let mut conn = get_conn(pool)?;

    conn.transaction::<(), AppError, _>(|conn| {
        let exists: i64 = content_items::table
            .filter(content_items::id.eq(content_id))
            .count()
            .get_result(conn)?;
        if exists == 0 {
            return Err(AppError::new(ErrorCode::ContentNotFound, "content item not found"));
        }

        diesel::delete(
            content_target_groups::table.filter(content_target_groups::content_id.eq(content_id)),
        )
        .execute(conn)?;
        diesel::delete(
            content_target_users::table.filter(content_target_users::content_id.eq(content_id)),
        )
        .execute(conn)?;
        diesel::delete(read_states::table.filter(read_states::content_id.eq(content_id)))
            .execute(conn)?;
        diesel::delete(content_items::table.find(content_id)).execute(conn)?;

        Ok(())
    })?;

    tracing::info!(content_id = %content_id, "content item deleted");
    Ok(())
}

/// Pending education items for the admin review queue, newest first. The
/// queue deliberately skips audience filtering: admins must see every
/// pending item to adjudicate it.
pub fn list_pending(pool: &DbPool, limit: i64, offset: i64) -> AppResult<(Vec<ContentItem>, i64)> {
    let mut conn = get_conn(pool)?;

    let total: i64 = content_items::table
        .filter(content_items::kind.eq(ContentKind::Education.to_string()))
        .filter(content_items::approval_status.eq(ApprovalState::Pending.to_string()))
        .count()
        .get_result(&mut conn)?;

    let items = content_items::table
        .filter(content_items::kind.eq(ContentKind::Education.to_string()))
        .filter(content_items::approval_status.eq(ApprovalState::Pending.to_string()))
        .order(content_items::created_at.desc())
        .limit(limit)
        .offset(offset)
        .load::<ContentItem>(&mut conn)?;

    Ok((items, total))
}

// --- Resolution ---

/// Everything the engine needs to answer one user's listing, fetched as a
/// unit.
pub struct ResolutionInputs {
    pub items: Vec<ContentItem>,
    pub memberships: MembershipIndex,
    pub targets: TargetIndex,
    pub reads: ReadMap,
}

async fn blocking<T, F>(pool: &DbPool, f: F) -> AppResult<T>
where
    F: FnOnce(&mut PgConnection) -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let mut conn = pool.get().map_err(|e| {
            tracing::error!(error = %e, "failed to get db connection");
            AppError::internal("database connection error")
        })?;
        f(&mut conn)
    })
    .await
    .map_err(|e| AppError::internal(format!("input fetch task failed: {e}")))?
}

fn load_approved_items(
    conn: &mut PgConnection,
    kind: Option<ContentKind>,
) -> AppResult<Vec<ContentItem>> {
    let mut query = content_items::table
        .filter(content_items::approval_status.eq(ApprovalState::Approved.to_string()))
        .order(content_items::created_at.desc())
        .into_boxed();

    if let Some(kind) = kind {
        query = query.filter(content_items::kind.eq(kind.to_string()));
    }

    Ok(query.load::<ContentItem>(conn)?)
}

fn load_target_group_rows(
    conn: &mut PgConnection,
    content_id: Option<Uuid>,
) -> AppResult<Vec<TargetGroupRow>> {
    let mut query = content_target_groups::table
        .select((content_target_groups::content_id, content_target_groups::group_name))
        .into_boxed();

    if let Some(content_id) = content_id {
        query = query.filter(content_target_groups::content_id.eq(content_id));
    }

    let rows = query.load::<(Uuid, String)>(conn)?;

    Ok(rows
        .into_iter()
        .map(|(content_id, group_name)| TargetGroupRow { content_id, group_name })
        .collect())
}

fn load_target_user_rows(
    conn: &mut PgConnection,
    content_id: Option<Uuid>,
) -> AppResult<Vec<TargetUserRow>> {
    let mut query = content_target_users::table
        .select((content_target_users::content_id, content_target_users::user_id))
        .into_boxed();

    if let Some(content_id) = content_id {
        query = query.filter(content_target_users::content_id.eq(content_id));
    }

    let rows = query.load::<(Uuid, Uuid)>(conn)?;

    Ok(rows
        .into_iter()
        .map(|(content_id, user_id)| TargetUserRow { content_id, user_id })
        .collect())
}

/// Fetch the five independent inputs concurrently and join in memory.
///
/// If any single fetch fails the whole resolution fails. Rendering with a
/// missing target fetch would make gated items look ungated, so a partial
/// picture is never used.
pub async fn gather_inputs(
    pool: &DbPool,
    viewer_id: Uuid,
    kind: Option<ContentKind>,
) -> AppResult<ResolutionInputs> {
    let (items, membership_rows, group_rows, user_rows, read_rows) = tokio::try_join!(
        blocking(pool, move |conn| load_approved_items(conn, kind)),
        blocking(pool, |conn| directory_service::load_membership_rows(conn, None)),
        blocking(pool, |conn| load_target_group_rows(conn, None)),
        blocking(pool, |conn| load_target_user_rows(conn, None)),
        blocking(pool, move |conn| read_service::load_read_rows(conn, viewer_id)),
    )?;

    Ok(ResolutionInputs {
        items,
        memberships: MembershipIndex::build(membership_rows),
        targets: TargetIndex::build(group_rows, user_rows),
        reads: ReadMap::from_rows(read_rows),
    })
}

/// The general listing: approval- and audience-filtered, newest first,
/// deduplicated. Admins go through the same audience rules as everyone
/// else; the review queue is the only unfiltered surface.
pub async fn resolve_visible(
    pool: &DbPool,
    viewer_id: Uuid,
    kind: Option<ContentKind>,
) -> AppResult<Vec<ContentItem>> {
    let inputs = gather_inputs(pool, viewer_id, kind).await?;
    Ok(filter_visible(
        inputs.items,
        viewer_id,
        &inputs.memberships,
        &inputs.targets,
    ))
}

/// Visible-but-unread count for the badge.
pub async fn count_unread(pool: &DbPool, viewer_id: Uuid) -> AppResult<usize> {
    let inputs = gather_inputs(pool, viewer_id, None).await?;
    let visible = filter_visible(
        inputs.items,
        viewer_id,
        &inputs.memberships,
        &inputs.targets,
    );

    Ok(visible
        .iter()
        .filter(|item| !inputs.reads.is_read(item.id))
        .count())
}

/// Overall and per-category completion over the education collection.
pub async fn compute_progress(pool: &DbPool, viewer_id: Uuid) -> AppResult<ProgressReport> {
    let inputs = gather_inputs(pool, viewer_id, Some(ContentKind::Education)).await?;
    let visible = filter_visible(
        inputs.items,
        viewer_id,
        &inputs.memberships,
        &inputs.targets,
    );

    Ok(aggregate(&visible, &inputs.reads))
}

/// Detail view. Admins may open any item (they adjudicate pending
/// submissions); everyone else only sees what resolution allows, and a
/// hidden item reads as not-found rather than forbidden. Opening a visible
/// item records the read; a failed write is logged and swallowed, so read
/// state simply does not advance.
pub fn open_content(
    pool: &DbPool,
    viewer_id: Uuid,
    role: StaffRole,
    content_id: Uuid,
) -> AppResult<ContentItem> {
    let mut conn = get_conn(pool)?;

    let item = content_items::table
        .find(content_id)
        .first::<ContentItem>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::ContentNotFound, "content item not found"))?;

    let membership_rows = directory_service::load_membership_rows(&mut conn, Some(viewer_id))?;
    let group_rows = load_target_group_rows(&mut conn, Some(content_id))?;
    let user_rows = load_target_user_rows(&mut conn, Some(content_id))?;

    let memberships = MembershipIndex::build(membership_rows);
    let targets = TargetIndex::build(group_rows, user_rows);

    let visible = is_visible(&item, viewer_id, &memberships, &targets);
    if !visible && role != StaffRole::Admin {
        return Err(AppError::new(ErrorCode::ContentNotFound, "content item not found"));
    }

    if visible {
        if let Err(e) = read_service::mark_read_with_conn(&mut conn, viewer_id, content_id) {
            tracing::warn!(error = %e, content_id = %content_id, "failed to record read state");
        }
    }

    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selections_are_rejected() {
        assert!(TargetingSelection::Groups(Vec::new()).validate().is_err());
        assert!(TargetingSelection::Users(Vec::new()).validate().is_err());
        assert!(TargetingSelection::Groups(vec!["a".into()]).validate().is_ok());
        assert!(TargetingSelection::Users(vec![Uuid::new_v4()]).validate().is_ok());
    }

    #[test]
    fn selection_maps_to_targeting_kind() {
        assert_eq!(
            TargetingSelection::Groups(vec!["a".into()]).kind(),
            TargetingKind::Group
        );
        assert_eq!(
            TargetingSelection::Users(vec![Uuid::new_v4()]).kind(),
            TargetingKind::Individual
        );
    }

    #[test]
    fn manager_education_submissions_wait_for_review() {
        assert_eq!(
            initial_approval_state(ContentKind::Education, StaffRole::Manager),
            ApprovalState::Pending
        );
        assert_eq!(
            initial_approval_state(ContentKind::Education, StaffRole::Admin),
            ApprovalState::Approved
        );
    }

    #[test]
    fn best_practice_posts_skip_review() {
        for role in [StaffRole::Manager, StaffRole::Admin] {
            assert_eq!(
                initial_approval_state(ContentKind::BestPractice, role),
                ApprovalState::Approved
            );
        }
    }
}
