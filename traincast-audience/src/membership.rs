use std::collections::{HashMap, HashSet};

use uuid::Uuid;

use crate::types::MembershipRow;

/// Mapping from user id to the set of group names they belong to.
///
/// A user absent from the index simply has no groups; lookups never fail.
#[derive(Debug, Clone, Default)]
pub struct MembershipIndex {
    by_user: HashMap<Uuid, HashSet<String>>,
}

impl MembershipIndex {
    /// Build the index from membership rows resolved to group names.
    /// O(n) in the number of rows.
    pub fn build<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = MembershipRow>,
    {
        let mut by_user: HashMap<Uuid, HashSet<String>> = HashMap::new();
        for row in rows {
            by_user.entry(row.user_id).or_default().insert(row.group_name);
        }
        Self { by_user }
    }

    pub fn groups_for(&self, user_id: Uuid) -> Option<&HashSet<String>> {
        self.by_user.get(&user_id)
    }

    pub fn is_member(&self, user_id: Uuid, group_name: &str) -> bool {
        self.by_user
            .get(&user_id)
            .map(|groups| groups.contains(group_name))
            .unwrap_or(false)
    }

    /// Whether the user belongs to at least one of `group_names`.
    /// A user with no memberships shares nothing.
    pub fn shares_any(&self, user_id: Uuid, group_names: &HashSet<String>) -> bool {
        match self.by_user.get(&user_id) {
            Some(groups) => !groups.is_disjoint(group_names),
            None => false,
        }
    }

    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(user_id: Uuid, group: &str) -> MembershipRow {
        MembershipRow {
            user_id,
            group_name: group.to_string(),
        }
    }

    #[test]
    fn builds_one_entry_per_user() {
        let u1 = Uuid::new_v4();
        let u2 = Uuid::new_v4();
        let index = MembershipIndex::build(vec![
            row(u1, "seoul"),
            row(u1, "leads"),
            row(u2, "seoul"),
        ]);

        assert_eq!(index.user_count(), 2);
        assert_eq!(index.groups_for(u1).unwrap().len(), 2);
        assert!(index.is_member(u2, "seoul"));
        assert!(!index.is_member(u2, "leads"));
    }

    #[test]
    fn duplicate_rows_collapse() {
        let u1 = Uuid::new_v4();
        let index = MembershipIndex::build(vec![row(u1, "seoul"), row(u1, "seoul")]);
        assert_eq!(index.groups_for(u1).unwrap().len(), 1);
    }

    #[test]
    fn absent_user_is_not_an_error() {
        let index = MembershipIndex::build(Vec::new());
        let stranger = Uuid::new_v4();

        assert!(index.groups_for(stranger).is_none());
        assert!(!index.is_member(stranger, "seoul"));

        let wanted: HashSet<String> = ["seoul".to_string()].into_iter().collect();
        assert!(!index.shares_any(stranger, &wanted));
    }

    #[test]
    fn shares_any_intersects() {
        let u1 = Uuid::new_v4();
        let index = MembershipIndex::build(vec![row(u1, "a"), row(u1, "b")]);

        let overlapping: HashSet<String> = ["b".to_string(), "c".to_string()].into_iter().collect();
        let disjoint: HashSet<String> = ["c".to_string(), "d".to_string()].into_iter().collect();

        assert!(index.shares_any(u1, &overlapping));
        assert!(!index.shares_any(u1, &disjoint));
    }
}
