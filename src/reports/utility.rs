use std::collections::{BTreeMap, HashMap};

use crate::reports::types::CategoryCount;

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Returns the most frequent value, comparing values by `key`.
///
/// When several keys share the highest count the smallest key wins, so the
/// result does not depend on input order. Returns `None` for empty input.
pub fn mode_by<T, K: Ord>(
    values: impl IntoIterator<Item = T>,
    key: impl Fn(&T) -> K,
) -> Option<T> {
    let mut counts: BTreeMap<K, (T, usize)> = BTreeMap::new();
    for value in values {
        counts.entry(key(&value)).or_insert((value, 0)).1 += 1;
    }

    let mut best: Option<(T, usize)> = None;
    // keys ascend, so only a strictly higher count displaces the current pick
    for (value, count) in counts.into_values() {
        if best.as_ref().is_none_or(|(_, top)| count > *top) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value)
}

/// [`mode_by`] keyed on the value itself.
pub fn mode<T: Ord + Clone>(values: impl IntoIterator<Item = T>) -> Option<T> {
    mode_by(values, T::clone)
}

/// Frequency table ordered by descending count, ties broken by category name.
pub fn value_counts<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<CategoryCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }

    let mut table: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect();
    table.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    table
}
