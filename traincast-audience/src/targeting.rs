use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::membership::MembershipIndex;
use crate::types::{AudienceItem, TargetGroupRow, TargetUserRow, TargetingKind};

/// Per-item targeting rows, indexed by content id.
#[derive(Debug, Clone, Default)]
pub struct TargetIndex {
    groups: HashMap<Uuid, HashSet<String>>,
    users: HashMap<Uuid, HashSet<Uuid>>,
}

impl TargetIndex {
    pub fn build<G, U>(group_rows: G, user_rows: U) -> Self
    where
        G: IntoIterator<Item = TargetGroupRow>,
        U: IntoIterator<Item = TargetUserRow>,
    {
        let mut groups: HashMap<Uuid, HashSet<String>> = HashMap::new();
        for row in group_rows {
            groups.entry(row.content_id).or_default().insert(row.group_name);
        }

        let mut users: HashMap<Uuid, HashSet<Uuid>> = HashMap::new();
        for row in user_rows {
            users.entry(row.content_id).or_default().insert(row.user_id);
        }

        Self { groups, users }
    }

    /// Resolve the audience rule for one item.
    ///
    /// Targeting is exclusive: a group-targeted item only consults group
    /// rows, an individually-targeted item only user rows. A group-targeted
    /// item with no rows falls back to `Everyone`: legacy content created
    /// before per-item targeting existed carries no rows and stays open. An
    /// individually-targeted item with no rows is visible to nobody.
    pub fn rule_for(&self, item: &impl AudienceItem) -> AudienceRule<'_> {
        match item.targeting_kind() {
            TargetingKind::Individual => match self.users.get(&item.content_id()) {
                Some(user_ids) => AudienceRule::Users(user_ids),
                None => AudienceRule::Nobody,
            },
            TargetingKind::Group => match self.groups.get(&item.content_id()) {
                Some(group_names) if !group_names.is_empty() => {
                    AudienceRule::Groups(group_names)
                }
                _ => AudienceRule::Everyone,
            },
        }
    }
}

/// The audience predicate for a single content item. Role never enters
/// here; any bypass belongs to the caller, not the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudienceRule<'a> {
    /// Group-targeted with no rows: the legacy-open fallback.
    Everyone,
    /// Group-targeted: qualifies iff membership intersects the set.
    Groups(&'a HashSet<String>),
    /// Individually-targeted: qualifies iff the user is listed.
    Users(&'a HashSet<Uuid>),
    /// Individually-targeted with no rows: fail closed.
    Nobody,
}

impl AudienceRule<'_> {
    pub fn allows(&self, user_id: Uuid, memberships: &MembershipIndex) -> bool {
        match self {
            AudienceRule::Everyone => true,
            AudienceRule::Nobody => false,
            AudienceRule::Users(user_ids) => user_ids.contains(&user_id),
            AudienceRule::Groups(group_names) => memberships.shares_any(user_id, group_names),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ApprovalState, ContentKind, ContentRef, MembershipRow};

    fn item(targeting: TargetingKind) -> ContentRef {
        ContentRef {
            id: Uuid::new_v4(),
            kind: ContentKind::Education,
            category: None,
            targeting,
            approval: ApprovalState::Approved,
        }
    }

    fn index_of(user_id: Uuid, groups: &[&str]) -> MembershipIndex {
        MembershipIndex::build(groups.iter().map(|g| MembershipRow {
            user_id,
            group_name: g.to_string(),
        }))
    }

    #[test]
    fn group_item_without_rows_is_open_to_everyone() {
        let item = item(TargetingKind::Group);
        let targets = TargetIndex::build(Vec::new(), Vec::new());

        let rule = targets.rule_for(&item);
        assert_eq!(rule, AudienceRule::Everyone);

        // Even a user with no memberships at all qualifies.
        let outsider = Uuid::new_v4();
        assert!(rule.allows(outsider, &MembershipIndex::default()));
    }

    #[test]
    fn group_item_requires_overlap() {
        let item = item(TargetingKind::Group);
        let targets = TargetIndex::build(
            vec![
                TargetGroupRow { content_id: item.id, group_name: "b".into() },
                TargetGroupRow { content_id: item.id, group_name: "c".into() },
            ],
            Vec::new(),
        );

        let member = Uuid::new_v4();
        let rule = targets.rule_for(&item);

        assert!(!rule.allows(member, &index_of(member, &["a"])));
        assert!(rule.allows(member, &index_of(member, &["a", "c"])));
    }

    #[test]
    fn individual_item_matches_listed_users_only() {
        let item = item(TargetingKind::Individual);
        let invited = Uuid::new_v4();
        let targets = TargetIndex::build(
            Vec::new(),
            vec![TargetUserRow { content_id: item.id, user_id: invited }],
        );

        let rule = targets.rule_for(&item);
        assert!(rule.allows(invited, &MembershipIndex::default()));

        // Group membership is irrelevant for individually-targeted items.
        let bystander = Uuid::new_v4();
        assert!(!rule.allows(bystander, &index_of(bystander, &["a", "b"])));
    }

    #[test]
    fn individual_item_without_rows_matches_nobody() {
        let item = item(TargetingKind::Individual);
        let targets = TargetIndex::build(Vec::new(), Vec::new());

        let rule = targets.rule_for(&item);
        assert_eq!(rule, AudienceRule::Nobody);
        assert!(!rule.allows(Uuid::new_v4(), &MembershipIndex::default()));
    }

    #[test]
    fn targeting_kinds_do_not_cross_contaminate() {
        // An individually-targeted item with stray group rows still resolves
        // through its user list, and vice versa.
        let indiv = item(TargetingKind::Individual);
        let grouped = item(TargetingKind::Group);
        let user = Uuid::new_v4();

        let targets = TargetIndex::build(
            vec![TargetGroupRow { content_id: indiv.id, group_name: "a".into() }],
            vec![TargetUserRow { content_id: grouped.id, user_id: user }],
        );

        assert_eq!(targets.rule_for(&indiv), AudienceRule::Nobody);
        assert_eq!(targets.rule_for(&grouped), AudienceRule::Everyone);
    }
}
