use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two parallel content collections. They share the same targeting and
/// read-state shape; only the education collection passes through review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Education,
    BestPractice,
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentKind::Education => write!(f, "education"),
            ContentKind::BestPractice => write!(f, "best_practice"),
        }
    }
}

impl std::str::FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "education" => Ok(ContentKind::Education),
            "best_practice" => Ok(ContentKind::BestPractice),
            _ => Err(format!("unknown content kind: {s}")),
        }
    }
}

/// Audience-selection mode of a content item. Exclusive: an item targeted
/// by group ignores any per-user rows and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetingKind {
    Group,
    Individual,
}

impl std::fmt::Display for TargetingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetingKind::Group => write!(f, "group"),
            TargetingKind::Individual => write!(f, "individual"),
        }
    }
}

impl std::str::FromStr for TargetingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "group" => Ok(TargetingKind::Group),
            "individual" => Ok(TargetingKind::Individual),
            _ => Err(format!("unknown targeting type: {s}")),
        }
    }
}

/// Review state for staff-authored items. `Pending` items are reachable
/// only through the admin review queue, never through audience resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalState {
    Pending,
    Approved,
}

impl std::fmt::Display for ApprovalState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApprovalState::Pending => write!(f, "pending"),
            ApprovalState::Approved => write!(f, "approved"),
        }
    }
}

impl std::str::FromStr for ApprovalState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ApprovalState::Pending),
            "approved" => Ok(ApprovalState::Approved),
            _ => Err(format!("unknown approval status: {s}")),
        }
    }
}

/// The slice of a content item the engine reads. Storage models implement
/// this so resolution never sees untyped rows.
pub trait AudienceItem {
    fn content_id(&self) -> Uuid;
    fn targeting_kind(&self) -> TargetingKind;
    fn approval_state(&self) -> ApprovalState;
    fn category(&self) -> Option<&str>;
}

/// A detached, engine-owned view of a content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRef {
    pub id: Uuid,
    pub kind: ContentKind,
    pub category: Option<String>,
    pub targeting: TargetingKind,
    pub approval: ApprovalState,
}

impl AudienceItem for ContentRef {
    fn content_id(&self) -> Uuid {
        self.id
    }

    fn targeting_kind(&self) -> TargetingKind {
        self.targeting
    }

    fn approval_state(&self) -> ApprovalState {
        self.approval
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }
}

/// One user-to-group edge, already resolved to the group *name*. Targeting
/// rows join on names, not ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembershipRow {
    pub user_id: Uuid,
    pub group_name: String,
}

/// One item-to-group-name targeting edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetGroupRow {
    pub content_id: Uuid,
    pub group_name: String,
}

/// One item-to-user targeting edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetUserRow {
    pub content_id: Uuid,
    pub user_id: Uuid,
}

/// One acknowledgment row for a single user. Rows exist only once a user
/// has opened the item; absence means unread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRow {
    pub content_id: Uuid,
    pub is_read: bool,
    pub read_at: DateTime<Utc>,
}
