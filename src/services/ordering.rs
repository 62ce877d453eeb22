//! Position arithmetic for ordered sibling collections.
//!
//! Lists within a board and cards within a list carry a contiguous,
//! zero-based integer `position`. Mutations shift targeted ranges instead of
//! rewriting the whole collection; the helpers here compute the ranges and
//! the store layer applies them inside a transaction.

/// Position for a row appended to a collection whose current maximum is
/// `max`, or 0 when the collection is empty.
pub fn append_position(max: Option<i32>) -> i32 {
    max.map_or(0, |m| m + 1)
}

/// Inclusive range of sibling positions (excluding the moved row) to shift by
/// `delta` when a row moves from `old` to `new` within the same collection.
/// `None` when the move is a no-op.
pub fn reorder_window(old: i32, new: i32) -> Option<(i32, i32, i32)> {
    use std::cmp::Ordering;
    match new.cmp(&old) {
        Ordering::Greater => Some((old + 1, new, -1)),
        Ordering::Less => Some((new, old - 1, 1)),
        Ordering::Equal => None,
    }
}
