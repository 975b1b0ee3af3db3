//! Audience and read-state resolution for training content.
//!
//! Everything in this crate is a pure function over already-fetched rows:
//! build a [`MembershipIndex`] and a [`TargetIndex`] from directory and
//! targeting rows, run [`filter_visible`] to get the subset of items a user
//! may see, then join with a [`ReadMap`] and fold into a
//! [`ProgressReport`]. No stage touches storage or retains state across
//! calls, so every rule here is testable without a database.

pub mod membership;
pub mod progress;
pub mod read_state;
pub mod targeting;
pub mod types;
pub mod visibility;

pub use membership::MembershipIndex;
pub use progress::{aggregate, CategoryProgress, ProgressReport, ProgressStat, UNCATEGORIZED_BUCKET};
pub use read_state::{ReadEntry, ReadMap};
pub use targeting::{AudienceRule, TargetIndex};
pub use types::{
    ApprovalState, AudienceItem, ContentKind, ContentRef, MembershipRow, ReadRow, TargetGroupRow,
    TargetUserRow, TargetingKind,
};
pub use visibility::{filter_visible, is_visible};
