//! Sorting and windowing of the filtered result set.

use std::cmp::Ordering;

use mwb_core::{SortKey, SortOrder};

use crate::multi_search::UnifiedResultSet;
use crate::types::ResultItem;

/// Stable sort by `key`; equal items keep their current relative order.
pub fn sort_items(items: &mut [ResultItem], key: SortKey, order: SortOrder) {
    items.sort_by(|a, b| {
        let ordering = compare(a, b, key);
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
}

/// Sorts the set, skips `offset` items and keeps at most `size`.
pub fn arrange(
    results: UnifiedResultSet,
    key: SortKey,
    order: SortOrder,
    offset: usize,
    size: usize,
) -> Vec<ResultItem> {
    let mut items = results.into_items();
    sort_items(&mut items, key, order);
    items.into_iter().skip(offset).take(size).collect()
}

fn compare(a: &ResultItem, b: &ResultItem, key: SortKey) -> Ordering {
    match key {
        SortKey::Timestamp => a.timestamp.cmp(&b.timestamp),
        SortKey::Duration => a.duration.cmp(&b.duration),
        SortKey::Channel => a
            .channel
            .chars()
            .flat_map(char::to_lowercase)
            .cmp(b.channel.chars().flat_map(char::to_lowercase)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::mock::item;

    fn dated(title: &str, url: &str, timestamp: i64, duration: u64, channel: &str) -> ResultItem {
        let mut item = item(channel, "Topic", title, url);
        item.timestamp = timestamp;
        item.duration = duration;
        item
    }

    fn sample() -> UnifiedResultSet {
        UnifiedResultSet::unify(vec![vec![
            dated("a", "1", 300, 600, "ZDF"),
            dated("b", "2", 100, 5400, "ard"),
            dated("c", "3", 300, 600, "ARTE"),
            dated("d", "4", 200, 1800, "ARD"),
        ]])
    }

    fn titles(items: &[ResultItem]) -> Vec<&str> {
        items.iter().map(|i| i.title.as_str()).collect()
    }

    #[test]
    fn test_timestamp_descending_is_stable() {
        let items = arrange(sample(), SortKey::Timestamp, SortOrder::Descending, 0, 10);
        assert_eq!(titles(&items), vec!["a", "c", "d", "b"]);
    }

    #[test]
    fn test_duration_ascending() {
        let items = arrange(sample(), SortKey::Duration, SortOrder::Ascending, 0, 10);
        assert_eq!(titles(&items), vec!["a", "c", "d", "b"]);
    }

    #[test]
    fn test_channel_ignores_case_and_keeps_ties() {
        let items = arrange(sample(), SortKey::Channel, SortOrder::Ascending, 0, 10);
        assert_eq!(titles(&items), vec!["b", "d", "c", "a"]);
    }

    #[test]
    fn test_window_applies_after_sort() {
        let items = arrange(sample(), SortKey::Timestamp, SortOrder::Ascending, 1, 2);
        assert_eq!(titles(&items), vec!["d", "a"]);

        let past_end = arrange(sample(), SortKey::Timestamp, SortOrder::Ascending, 10, 5);
        assert!(past_end.is_empty());
    }
}
