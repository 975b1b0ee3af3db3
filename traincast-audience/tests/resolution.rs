//! End-to-end resolution: directory rows in, visible items and progress out.

use chrono::Utc;
use uuid::Uuid;

use traincast_audience::{
    aggregate, filter_visible, ApprovalState, ContentKind, ContentRef, MembershipIndex,
    MembershipRow, ReadMap, ReadRow, TargetGroupRow, TargetIndex, TargetUserRow, TargetingKind,
    UNCATEGORIZED_BUCKET,
};

fn education_item(category: Option<&str>, targeting: TargetingKind) -> ContentRef {
    ContentRef {
        id: Uuid::new_v4(),
        kind: ContentKind::Education,
        category: category.map(str::to_string),
        targeting,
        approval: ApprovalState::Approved,
    }
}

fn memberships(pairs: &[(Uuid, &str)]) -> MembershipIndex {
    MembershipIndex::build(pairs.iter().map(|(user_id, group)| MembershipRow {
        user_id: *user_id,
        group_name: group.to_string(),
    }))
}

#[test]
fn user_outside_all_target_groups_sees_nothing_of_the_item() {
    // User in group A; item targeted at groups B and C.
    let user = Uuid::new_v4();
    let index = memberships(&[(user, "A")]);

    let item = education_item(Some("sales"), TargetingKind::Group);
    let targets = TargetIndex::build(
        vec![
            TargetGroupRow { content_id: item.id, group_name: "B".into() },
            TargetGroupRow { content_id: item.id, group_name: "C".into() },
        ],
        Vec::new(),
    );

    let visible = filter_visible(vec![item], user, &index, &targets);
    assert!(visible.is_empty());
}

#[test]
fn group_membership_does_not_open_individually_targeted_items() {
    // Item targeted at u1 and u2; u3's group memberships are irrelevant.
    let u1 = Uuid::new_v4();
    let u2 = Uuid::new_v4();
    let u3 = Uuid::new_v4();
    let index = memberships(&[(u3, "A")]);

    let invite_only = education_item(None, TargetingKind::Individual);
    let group_open = education_item(None, TargetingKind::Group);
    let targets = TargetIndex::build(
        vec![TargetGroupRow { content_id: group_open.id, group_name: "A".into() }],
        vec![
            TargetUserRow { content_id: invite_only.id, user_id: u1 },
            TargetUserRow { content_id: invite_only.id, user_id: u2 },
        ],
    );

    let items = vec![invite_only.clone(), group_open.clone()];

    let u3_sees = filter_visible(items.clone(), u3, &index, &targets);
    assert_eq!(u3_sees, vec![group_open]);

    let u1_sees = filter_visible(items, u1, &index, &targets);
    assert_eq!(u1_sees, vec![invite_only]);
}

#[test]
fn untargeted_group_item_is_visible_to_groupless_users() {
    let loner = Uuid::new_v4();
    let item = education_item(None, TargetingKind::Group);

    let visible = filter_visible(
        vec![item.clone()],
        loner,
        &MembershipIndex::default(),
        &TargetIndex::default(),
    );

    assert_eq!(visible, vec![item]);
}

#[test]
fn pending_items_are_invisible_to_every_viewer() {
    let author = Uuid::new_v4();
    let mut submission = education_item(None, TargetingKind::Group);
    submission.approval = ApprovalState::Pending;

    // Not even the author, and not via direct individual targeting.
    let targets = TargetIndex::build(
        Vec::new(),
        vec![TargetUserRow { content_id: submission.id, user_id: author }],
    );

    let visible = filter_visible(vec![submission], author, &MembershipIndex::default(), &targets);
    assert!(visible.is_empty());
}

#[test]
fn progress_counts_only_resolved_items() {
    let user = Uuid::new_v4();
    let index = memberships(&[(user, "floor-managers")]);

    // Four visible items in one category, one of them read, plus an item
    // the user cannot see that must not leak into the totals.
    let mut items: Vec<ContentRef> = (0..4)
        .map(|_| education_item(Some("store-intro"), TargetingKind::Group))
        .collect();
    let hidden = education_item(Some("store-intro"), TargetingKind::Group);
    let mut target_rows: Vec<TargetGroupRow> = items
        .iter()
        .map(|i| TargetGroupRow { content_id: i.id, group_name: "floor-managers".into() })
        .collect();
    target_rows.push(TargetGroupRow { content_id: hidden.id, group_name: "executives".into() });
    items.push(hidden);

    let targets = TargetIndex::build(target_rows, Vec::new());
    let visible = filter_visible(items, user, &index, &targets);
    assert_eq!(visible.len(), 4);

    let reads = ReadMap::from_rows(vec![ReadRow {
        content_id: visible[0].id,
        is_read: true,
        read_at: Utc::now(),
    }]);

    let report = aggregate(&visible, &reads);
    assert_eq!(report.overall.total, 4);
    assert_eq!(report.overall.read, 1);
    assert_eq!(report.overall.percentage, 25);

    let bucket = &report.per_category[0];
    assert_eq!(bucket.category, "store-intro");
    assert_eq!((bucket.read, bucket.total, bucket.percentage), (1, 4, 25));
}

#[test]
fn mixed_listing_resolves_per_item_and_keeps_order() {
    let user = Uuid::new_v4();
    let index = memberships(&[(user, "seoul"), (user, "leads")]);

    let open = education_item(Some("welcome"), TargetingKind::Group);
    let for_seoul = education_item(Some("welcome"), TargetingKind::Group);
    let for_busan = education_item(Some("welcome"), TargetingKind::Group);
    let direct = education_item(None, TargetingKind::Individual);
    let closed = education_item(None, TargetingKind::Individual);

    let targets = TargetIndex::build(
        vec![
            TargetGroupRow { content_id: for_seoul.id, group_name: "seoul".into() },
            TargetGroupRow { content_id: for_busan.id, group_name: "busan".into() },
        ],
        vec![TargetUserRow { content_id: direct.id, user_id: user }],
    );

    let listing = vec![
        open.clone(),
        for_seoul.clone(),
        for_busan,
        direct.clone(),
        closed,
    ];

    let visible = filter_visible(listing, user, &index, &targets);
    let ids: Vec<Uuid> = visible.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![open.id, for_seoul.id, direct.id]);
}

#[test]
fn unread_and_uncategorized_feed_the_badge_and_sentinel_bucket() {
    let user = Uuid::new_v4();
    let tagged = education_item(Some("safety"), TargetingKind::Group);
    let untagged = education_item(None, TargetingKind::Group);

    let visible = filter_visible(
        vec![tagged.clone(), untagged.clone()],
        user,
        &MembershipIndex::default(),
        &TargetIndex::default(),
    );

    let reads = ReadMap::from_rows(vec![ReadRow {
        content_id: tagged.id,
        is_read: true,
        read_at: Utc::now(),
    }]);

    let unread: Vec<Uuid> = visible
        .iter()
        .filter(|i| !reads.is_read(i.id))
        .map(|i| i.id)
        .collect();
    assert_eq!(unread, vec![untagged.id]);

    let report = aggregate(&visible, &reads);
    assert_eq!(report.per_category.len(), 2);
    assert_eq!(report.per_category[1].category, UNCATEGORIZED_BUCKET);
    assert_eq!(report.overall.percentage, 50);
}
