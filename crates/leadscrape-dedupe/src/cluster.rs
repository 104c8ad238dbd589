use std::collections::HashMap;

use leadscrape_core::Dataset;
use petgraph::unionfind::UnionFind;

pub(crate) type Pair = (usize, usize);

/// Order a pair so `(a, b)` and `(b, a)` compare equal.
pub(crate) fn ordered(a: usize, b: usize) -> Pair {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Connected components of the duplicate graph, each sorted ascending and
/// listed in order of their smallest member.
pub(crate) fn components(len: usize, pairs: impl IntoIterator<Item = Pair>) -> Vec<Vec<usize>> {
    let mut sets = UnionFind::<usize>::new(len);
    for (a, b) in pairs {
        sets.union(a, b);
    }

    let labels = sets.into_labeling();
    let mut slot_by_label: HashMap<usize, usize> = HashMap::new();
    let mut groups: Vec<Vec<usize>> = Vec::new();
    for (index, label) in labels.into_iter().enumerate() {
        let slot = *slot_by_label.entry(label).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(index);
    }
    groups
}

/// One surviving index per cluster, returned in dataset order.
///
/// The survivor is the first member, or with `keep_most_complete` the member
/// with the most non-null fields (ties go to the earliest).
pub(crate) fn survivors(
    data: &Dataset,
    clusters: &[Vec<usize>],
    keep_most_complete: bool,
) -> Vec<usize> {
    let mut keep: Vec<usize> = clusters
        .iter()
        .filter_map(|members| {
            if keep_most_complete {
                members.iter().copied().min_by_key(|&i| {
                    let filled = data.get(i).map_or(0, leadscrape_core::Record::non_null_count);
                    (std::cmp::Reverse(filled), i)
                })
            } else {
                members.first().copied()
            }
        })
        .collect();
    keep.sort_unstable();
    keep
}
