use crate::models::domain::Category;

/// Decides whether a submitted category selection matches an item's
/// correct set. Correctness is all-or-nothing: the selection must have
/// the same cardinality as the correct set and contain exactly the same
/// categories, in any order. An empty selection is always wrong, and an
/// item with an empty correct set (malformed catalog data) grades as
/// wrong rather than panicking.
pub fn is_correct_answer(correct: &[Category], selected: &[Category]) -> bool {
    if selected.is_empty() || correct.is_empty() {
        return false;
    }

    if selected.len() != correct.len() {
        return false;
    }

    selected.iter().all(|c| correct.contains(c)) && correct.iter().all(|c| selected.contains(c))
}

/// Rounded percentage of correct uses, 0 when the item was never used.
pub fn correct_rate(correct_count: u32, usage_count: u32) -> u32 {
    if usage_count == 0 {
        return 0;
    }
    ((correct_count as f64 / usage_count as f64) * 100.0).round() as u32
}
