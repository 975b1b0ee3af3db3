use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use traincast_audience::{ApprovalState, AudienceItem, TargetingKind};

use crate::schema::{
    content_items, content_target_groups, content_target_users, group_members, groups,
    read_states, users,
};

// --- User ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = users)]
pub struct User {
    pub id: Uuid,
    pub display_name: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

// --- Group ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = groups)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = groups)]
pub struct NewGroup {
    pub name: String,
}

// --- GroupMember ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = group_members)]
pub struct GroupMember {
    pub id: Uuid,
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = group_members)]
pub struct NewGroupMember {
    pub group_id: Uuid,
    pub user_id: Uuid,
}

// --- ContentItem ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = content_items)]
pub struct ContentItem {
    pub id: Uuid,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub category: Option<String>,
    pub targeting_type: String,
    pub approval_status: String,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = content_items)]
pub struct NewContentItem {
    pub kind: String,
    pub title: String,
    pub body: String,
    pub category: Option<String>,
    pub targeting_type: String,
    pub approval_status: String,
    pub author_id: Uuid,
}

impl AudienceItem for ContentItem {
    fn content_id(&self) -> Uuid {
        self.id
    }

    // Unknown column values fail closed: an unparseable targeting type
    // resolves like an individual item with no rows (visible to nobody).
    fn targeting_kind(&self) -> TargetingKind {
        self.targeting_type.parse().unwrap_or(TargetingKind::Individual)
    }

    // Same fail-closed stance: an unknown status is treated as pending.
    fn approval_state(&self) -> ApprovalState {
        self.approval_status.parse().unwrap_or(ApprovalState::Pending)
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

// --- ContentTargetGroup ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = content_target_groups)]
pub struct ContentTargetGroup {
    pub id: Uuid,
    pub content_id: Uuid,
    pub group_name: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = content_target_groups)]
pub struct NewContentTargetGroup {
    pub content_id: Uuid,
    pub group_name: String,
}

// --- ContentTargetUser ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = content_target_users)]
pub struct ContentTargetUser {
    pub id: Uuid,
    pub content_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = content_target_users)]
pub struct NewContentTargetUser {
    pub content_id: Uuid,
    pub user_id: Uuid,
}

// --- ReadState ---

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = read_states)]
pub struct ReadState {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content_id: Uuid,
    pub is_read: bool,
    pub read_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = read_states)]
pub struct NewReadState {
    pub user_id: Uuid,
    pub content_id: Uuid,
    pub is_read: bool,
    pub read_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(targeting_type: &str, approval_status: &str) -> ContentItem {
        ContentItem {
            id: Uuid::new_v4(),
            kind: "education".into(),
            title: "t".into(),
            body: "b".into(),
            category: None,
            targeting_type: targeting_type.into(),
            approval_status: approval_status.into(),
            author_id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn known_column_values_map_to_engine_enums() {
        let row = item("group", "approved");
        assert_eq!(row.targeting_kind(), TargetingKind::Group);
        assert_eq!(row.approval_state(), ApprovalState::Approved);
    }

    #[test]
    fn corrupt_column_values_fail_closed() {
        let row = item("broadcast", "published");
        assert_eq!(row.targeting_kind(), TargetingKind::Individual);
        assert_eq!(row.approval_state(), ApprovalState::Pending);
    }
}
