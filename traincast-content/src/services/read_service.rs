use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use traincast_audience::{ReadMap, ReadRow};
use traincast_shared::clients::db::DbPool;
use traincast_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{NewReadState, ReadState};
use crate::schema::{content_items, read_states};

fn get_conn(pool: &DbPool) -> AppResult<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>> {
    pool.get().map_err(|e| {
        tracing::error!(error = %e, "failed to get db connection");
        AppError::internal("database connection error")
    })
}

/// Record that a user has acknowledged a content item.
///
/// Upsert keyed on the `(user_id, content_id)` uniqueness constraint: the
/// first call creates the row, every later call re-asserts `is_read` and
/// refreshes `read_at`. Nothing ever writes `is_read = false`, so the state
/// is monotonic; concurrent duplicate calls commute and last-write-wins on
/// the timestamp.
pub fn mark_read(pool: &DbPool, user_id: Uuid, content_id: Uuid) -> AppResult<ReadState> {
    let mut conn = get_conn(pool)?;
    mark_read_with_conn(&mut conn, user_id, content_id)
}

pub fn mark_read_with_conn(
    conn: &mut PgConnection,
    user_id: Uuid,
    content_id: Uuid,
) -> AppResult<ReadState> {
    let exists: i64 = content_items::table
        .filter(content_items::id.eq(content_id))
        .count()
        .get_result(conn)?;
    if exists == 0 {
        return Err(AppError::new(ErrorCode::ContentNotFound, "content item not found"));
    }

    let now = Utc::now();
    let state = diesel::insert_into(read_states::table)
        .values(&NewReadState {
            user_id,
            content_id,
            is_read: true,
            read_at: now,
        })
        .on_conflict((read_states::user_id, read_states::content_id))
        .do_update()
        .set((
            read_states::is_read.eq(true),
            read_states::read_at.eq(now),
        ))
        .get_result::<ReadState>(conn)?;

    tracing::debug!(
        user_id = %user_id,
        content_id = %content_id,
        "read state recorded"
    );

    Ok(state)
}

/// All read rows for one user, as engine input. Only rows that exist are
/// returned; callers treat absence as unread.
pub fn load_read_rows(conn: &mut PgConnection, user_id: Uuid) -> AppResult<Vec<ReadRow>> {
    let rows = read_states::table
        .filter(read_states::user_id.eq(user_id))
        .load::<ReadState>(conn)?;

    Ok(rows
        .into_iter()
        .map(|row| ReadRow {
            content_id: row.content_id,
            is_read: row.is_read,
            read_at: row.read_at,
        })
        .collect())
}

/// Read map for one user restricted to a set of content ids.
pub fn get_read_map(pool: &DbPool, user_id: Uuid, content_ids: &[Uuid]) -> AppResult<ReadMap> {
    let mut conn = get_conn(pool)?;

    let rows = read_states::table
        .filter(read_states::user_id.eq(user_id))
        .filter(read_states::content_id.eq_any(content_ids))
        .load::<ReadState>(&mut conn)?;

    Ok(ReadMap::from_rows(rows.into_iter().map(|row| ReadRow {
        content_id: row.content_id,
        is_read: row.is_read,
        read_at: row.read_at,
    })))
}
