//! Kernel order merging.

/// Reorders `items` so that those named in `order` come first.
///
/// Every item whose id matches an entry of `order` is placed at that
/// entry's position, keeping the relative order of items sharing an id.
/// Items not named anywhere follow in their input order. Ids in `order`
/// that match nothing are ignored, and a repeated id has no further effect.
pub fn apply_explicit_order<T, F>(order: &[String], items: Vec<T>, id_of: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut remaining: Vec<Option<T>> = items.into_iter().map(Some).collect();
    let mut ordered = Vec::with_capacity(remaining.len());

    for id in order {
        for slot in remaining.iter_mut() {
            if slot.as_ref().is_some_and(|item| id_of(item) == id) {
                ordered.extend(slot.take());
            }
        }
    }

    ordered.extend(remaining.into_iter().flatten());
    ordered
}
