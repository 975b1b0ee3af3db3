use std::collections::HashSet;

use uuid::Uuid;

use crate::membership::MembershipIndex;
use crate::targeting::TargetIndex;
use crate::types::{ApprovalState, AudienceItem};

/// Filter a list of content items down to what `viewer_id` may see.
///
/// Pending items are dropped unconditionally; the admin review queue is a
/// separate entry point that does not pass through this filter. The input
/// ordering (typically reverse-chronological) is preserved, the output is a
/// subset of the input, and no item appears twice.
pub fn filter_visible<T: AudienceItem>(
    items: Vec<T>,
    viewer_id: Uuid,
    memberships: &MembershipIndex,
    targets: &TargetIndex,
) -> Vec<T> {
    let mut seen: HashSet<Uuid> = HashSet::with_capacity(items.len());

    items
        .into_iter()
        .filter(|item| {
            if item.approval_state() == ApprovalState::Pending {
                return false;
            }
            if !seen.insert(item.content_id()) {
                return false;
            }
            targets.rule_for(item).allows(viewer_id, memberships)
        })
        .collect()
}

/// Single-item visibility check, used by the detail view. Same rules as
/// [`filter_visible`]: pending items are not visible here.
pub fn is_visible<T: AudienceItem>(
    item: &T,
    viewer_id: Uuid,
    memberships: &MembershipIndex,
    targets: &TargetIndex,
) -> bool {
    item.approval_state() == ApprovalState::Approved
        && targets.rule_for(item).allows(viewer_id, memberships)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentKind, ContentRef, MembershipRow, TargetGroupRow, TargetingKind};

    fn approved_group_item(category: Option<&str>) -> ContentRef {
        ContentRef {
            id: Uuid::new_v4(),
            kind: ContentKind::Education,
            category: category.map(str::to_string),
            targeting: TargetingKind::Group,
            approval: ApprovalState::Approved,
        }
    }

    #[test]
    fn pending_items_never_resolve_visible() {
        let viewer = Uuid::new_v4();
        let mut pending = approved_group_item(None);
        pending.approval = ApprovalState::Pending;
        let open = approved_group_item(None);

        let visible = filter_visible(
            vec![pending.clone(), open.clone()],
            viewer,
            &MembershipIndex::default(),
            &TargetIndex::default(),
        );

        assert_eq!(visible, vec![open]);
        assert!(!is_visible(&pending, viewer, &MembershipIndex::default(), &TargetIndex::default()));
    }

    #[test]
    fn ordering_is_preserved() {
        let viewer = Uuid::new_v4();
        let items: Vec<ContentRef> = (0..5).map(|_| approved_group_item(None)).collect();
        let expected_ids: Vec<Uuid> = items.iter().map(|i| i.id).collect();

        let visible = filter_visible(
            items,
            viewer,
            &MembershipIndex::default(),
            &TargetIndex::default(),
        );

        let got_ids: Vec<Uuid> = visible.iter().map(|i| i.id).collect();
        assert_eq!(got_ids, expected_ids);
    }

    #[test]
    fn duplicate_ids_appear_once() {
        let viewer = Uuid::new_v4();
        let item = approved_group_item(None);

        let visible = filter_visible(
            vec![item.clone(), item.clone()],
            viewer,
            &MembershipIndex::default(),
            &TargetIndex::default(),
        );

        assert_eq!(visible.len(), 1);
    }

    #[test]
    fn audience_rules_apply_per_item() {
        let viewer = Uuid::new_v4();
        let memberships = MembershipIndex::build(vec![MembershipRow {
            user_id: viewer,
            group_name: "a".into(),
        }]);

        let mine = approved_group_item(None);
        let theirs = approved_group_item(None);
        let targets = TargetIndex::build(
            vec![
                TargetGroupRow { content_id: mine.id, group_name: "a".into() },
                TargetGroupRow { content_id: theirs.id, group_name: "b".into() },
            ],
            Vec::new(),
        );

        let visible = filter_visible(
            vec![mine.clone(), theirs],
            viewer,
            &memberships,
            &targets,
        );

        assert_eq!(visible, vec![mine]);
    }
}
