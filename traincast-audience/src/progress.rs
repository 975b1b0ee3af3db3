use serde::{Deserialize, Serialize};

use crate::read_state::ReadMap;
use crate::types::AudienceItem;

/// Bucket for items carrying no category tag. They count toward progress
/// like any other item instead of being dropped.
pub const UNCATEGORIZED_BUCKET: &str = "individual feedback";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressStat {
    pub read: usize,
    pub total: usize,
    pub percentage: u8,
}

impl ProgressStat {
    fn new(read: usize, total: usize) -> Self {
        Self {
            read,
            total,
            percentage: percentage(read, total),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryProgress {
    pub category: String,
    pub read: usize,
    pub total: usize,
    pub percentage: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub overall: ProgressStat,
    pub per_category: Vec<CategoryProgress>,
}

fn percentage(read: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((read as f64 / total as f64) * 100.0).round() as u8
}

/// Fold visible items and the viewer's read map into overall and
/// per-category completion stats.
///
/// The items must already have passed the visibility filter; this function
/// never re-derives visibility, so the two computations cannot drift.
/// Category buckets appear in first-encounter order over the input.
pub fn aggregate<T: AudienceItem>(visible: &[T], reads: &ReadMap) -> ProgressReport {
    let mut total_read = 0usize;
    let mut order: Vec<String> = Vec::new();
    let mut buckets: std::collections::HashMap<String, (usize, usize)> =
        std::collections::HashMap::new();

    for item in visible {
        let is_read = reads.is_read(item.content_id());
        if is_read {
            total_read += 1;
        }

        let category = item
            .category()
            .filter(|c| !c.is_empty())
            .unwrap_or(UNCATEGORIZED_BUCKET)
            .to_string();

        let entry = buckets.entry(category.clone()).or_insert_with(|| {
            order.push(category);
            (0, 0)
        });
        entry.1 += 1;
        if is_read {
            entry.0 += 1;
        }
    }

    let per_category = order
        .into_iter()
        .map(|category| {
            let (read, total) = buckets[&category];
            CategoryProgress {
                read,
                total,
                percentage: percentage(read, total),
                category,
            }
        })
        .collect();

    ProgressReport {
        overall: ProgressStat::new(total_read, visible.len()),
        per_category,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ApprovalState, ContentKind, ContentRef, ReadRow, TargetingKind};
    use chrono::Utc;
    use uuid::Uuid;

    fn item(category: Option<&str>) -> ContentRef {
        ContentRef {
            id: Uuid::new_v4(),
            kind: ContentKind::Education,
            category: category.map(str::to_string),
            targeting: TargetingKind::Group,
            approval: ApprovalState::Approved,
        }
    }

    fn read_row(content_id: Uuid) -> ReadRow {
        ReadRow {
            content_id,
            is_read: true,
            read_at: Utc::now(),
        }
    }

    #[test]
    fn empty_input_yields_zero_percentage() {
        let report = aggregate::<ContentRef>(&[], &ReadMap::default());
        assert_eq!(report.overall, ProgressStat { read: 0, total: 0, percentage: 0 });
        assert!(report.per_category.is_empty());
    }

    #[test]
    fn overall_percentage_rounds() {
        let items: Vec<ContentRef> = (0..5).map(|_| item(Some("safety"))).collect();
        let reads = ReadMap::from_rows(items.iter().take(3).map(|i| read_row(i.id)));

        let report = aggregate(&items, &reads);
        assert_eq!(report.overall.read, 3);
        assert_eq!(report.overall.total, 5);
        assert_eq!(report.overall.percentage, 60);
    }

    #[test]
    fn one_of_four_in_a_category_is_twenty_five() {
        let items: Vec<ContentRef> = (0..4).map(|_| item(Some("onboarding"))).collect();
        let reads = ReadMap::from_rows(vec![read_row(items[0].id)]);

        let report = aggregate(&items, &reads);
        let bucket = &report.per_category[0];
        assert_eq!(bucket.category, "onboarding");
        assert_eq!((bucket.read, bucket.total, bucket.percentage), (1, 4, 25));
    }

    #[test]
    fn uncategorized_items_land_in_the_sentinel_bucket() {
        let tagged = item(Some("safety"));
        let untagged = item(None);
        let blank = item(Some(""));

        let report = aggregate(&[tagged, untagged, blank], &ReadMap::default());

        let names: Vec<&str> = report
            .per_category
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        assert_eq!(names, vec!["safety", UNCATEGORIZED_BUCKET]);

        let sentinel = &report.per_category[1];
        assert_eq!(sentinel.total, 2);
        assert_eq!(report.overall.total, 3);
    }

    #[test]
    fn buckets_keep_first_encounter_order() {
        let items = vec![
            item(Some("b")),
            item(Some("a")),
            item(Some("b")),
            item(Some("c")),
        ];
        let report = aggregate(&items, &ReadMap::default());

        let names: Vec<&str> = report
            .per_category
            .iter()
            .map(|c| c.category.as_str())
            .collect();
        assert_eq!(names, vec!["b", "a", "c"]);
    }

    #[test]
    fn category_totals_sum_to_overall_total() {
        let items = vec![item(Some("a")), item(None), item(Some("a")), item(Some("b"))];
        let reads = ReadMap::from_rows(vec![read_row(items[0].id), read_row(items[3].id)]);

        let report = aggregate(&items, &reads);
        let summed: usize = report.per_category.iter().map(|c| c.total).sum();
        let summed_read: usize = report.per_category.iter().map(|c| c.read).sum();

        assert_eq!(summed, report.overall.total);
        assert_eq!(summed_read, report.overall.read);
    }
}
