use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use traincast_audience::MembershipRow;
use traincast_shared::clients::db::DbPool;
use traincast_shared::errors::{AppError, AppResult, ErrorCode};

use crate::models::{Group, GroupMember, NewGroup, NewGroupMember, User};
use crate::schema::{group_members, groups, users};

fn get_conn(pool: &DbPool) -> AppResult<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<PgConnection>>> {
    pool.get().map_err(|e| {
        tracing::error!(error = %e, "failed to get db connection");
        AppError::internal("database connection error")
    })
}

pub fn list_users(pool: &DbPool) -> AppResult<Vec<User>> {
    let mut conn = get_conn(pool)?;

    let items = users::table
        .order(users::display_name.asc())
        .load::<User>(&mut conn)?;

    Ok(items)
}

pub fn get_user(pool: &DbPool, user_id: Uuid) -> AppResult<User> {
    let mut conn = get_conn(pool)?;

    users::table
        .find(user_id)
        .first::<User>(&mut conn)
        .optional()?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound, "user not found"))
}

pub fn list_groups(pool: &DbPool) -> AppResult<Vec<Group>> {
    let mut conn = get_conn(pool)?;

    let items = groups::table
        .order(groups::name.asc())
        .load::<Group>(&mut conn)?;

    Ok(items)
}

pub fn create_group(pool: &DbPool, name: &str) -> AppResult<Group> {
    let mut conn = get_conn(pool)?;

    let taken: i64 = groups::table
        .filter(groups::name.eq(name))
        .count()
        .get_result(&mut conn)?;
    if taken > 0 {
        return Err(AppError::new(ErrorCode::GroupNameTaken, "a group with this name already exists"));
    }

    let group = diesel::insert_into(groups::table)
        .values(&NewGroup { name: name.to_string() })
        .get_result::<Group>(&mut conn)?;

    tracing::debug!(group_id = %group.id, name = %group.name, "group created");
    Ok(group)
}

pub fn add_member(pool: &DbPool, group_id: Uuid, user_id: Uuid) -> AppResult<GroupMember> {
    let mut conn = get_conn(pool)?;

    let group_exists: i64 = groups::table
        .filter(groups::id.eq(group_id))
        .count()
        .get_result(&mut conn)?;
    if group_exists == 0 {
        return Err(AppError::new(ErrorCode::GroupNotFound, "group not found"));
    }

    let user_exists: i64 = users::table
        .filter(users::id.eq(user_id))
        .count()
        .get_result(&mut conn)?;
    if user_exists == 0 {
        return Err(AppError::new(ErrorCode::UserNotFound, "user not found"));
    }

    let already: i64 = group_members::table
        .filter(group_members::group_id.eq(group_id))
        .filter(group_members::user_id.eq(user_id))
        .count()
        .get_result(&mut conn)?;
    if already > 0 {
        return Err(AppError::new(ErrorCode::MemberAlreadyExists, "user is already a member of this group"));
    }

    let member = diesel::insert_into(group_members::table)
        .values(&NewGroupMember { group_id, user_id })
        .get_result::<GroupMember>(&mut conn)?;

    Ok(member)
}

pub fn remove_member(pool: &DbPool, group_id: Uuid, user_id: Uuid) -> AppResult<()> {
    let mut conn = get_conn(pool)?;

    let removed = diesel::delete(
        group_members::table
            .filter(group_members::group_id.eq(group_id))
            .filter(group_members::user_id.eq(user_id)),
    )
    .execute(&mut conn)?;

    if removed == 0 {
        return Err(AppError::new(ErrorCode::MemberNotFound, "membership not found"));
    }

    Ok(())
}

/// Group names for one user, for the self-service membership listing.
pub fn group_names_for(pool: &DbPool, user_id: Uuid) -> AppResult<Vec<String>> {
    let mut conn = get_conn(pool)?;
    let names = group_members::table
        .inner_join(groups::table)
        .filter(group_members::user_id.eq(user_id))
        .order(groups::name.asc())
        .select(groups::name)
        .load::<String>(&mut conn)?;
    Ok(names)
}

/// Membership join resolved to group names, as the resolution engine
/// consumes it, optionally restricted to one user. Targeting rows reference
/// names, not group ids.
pub fn load_membership_rows(
    conn: &mut PgConnection,
    user_id: Option<Uuid>,
) -> AppResult<Vec<MembershipRow>> {
    let mut query = group_members::table
        .inner_join(groups::table)
        .select((group_members::user_id, groups::name))
        .into_boxed();

    if let Some(user_id) = user_id {
        query = query.filter(group_members::user_id.eq(user_id));
    }

    let rows = query.load::<(Uuid, String)>(conn)?;

    Ok(rows
        .into_iter()
        .map(|(user_id, group_name)| MembershipRow { user_id, group_name })
        .collect())
}
