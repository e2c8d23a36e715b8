//! Cross-row check for competitors entered more than once.

use std::collections::{BTreeSet, HashMap};

use tally_model::CompetitorId;

/// Ids held by more than one of `ids`, in sorted order.
pub fn duplicated_ids<'a, I>(ids: I) -> BTreeSet<CompetitorId>
where
    I: IntoIterator<Item = &'a CompetitorId>,
{
    let mut counts: HashMap<&CompetitorId, usize> = HashMap::new();
    for id in ids {
        *counts.entry(id).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, _)| id.clone())
        .collect()
}
