//! Fixed-point coalescing of groups that share a member.
//!
//! Greedy and incremental grouping are order-sensitive; merging any two
//! groups that overlap until nothing changes is the backstop that keeps
//! the "one open group per id" invariant.

use crate::core::model::Group;
use std::collections::HashSet;
use std::hash::Hash;

/// Coalesce overlapping member lists until no two share an element.
///
/// The surviving list of each merge is the earlier one; members keep
/// first-seen order. Idempotent, and the resulting partition does not
/// depend on input order.
pub fn merge_overlapping<T>(mut groups: Vec<Vec<T>>) -> Vec<Vec<T>>
where
    T: Eq + Hash + Clone,
{
    loop {
        let mut changed = false;
        let mut i = 0;
        while i < groups.len() {
            let mut seen: HashSet<T> = groups[i].iter().cloned().collect();
            let mut j = i + 1;
            while j < groups.len() {
                if groups[j].iter().any(|member| seen.contains(member)) {
                    let absorbed = groups.remove(j);
                    for member in absorbed {
                        if seen.insert(member.clone()) {
                            groups[i].push(member);
                        }
                    }
                    changed = true;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
        if !changed {
            return groups;
        }
    }
}

/// [`merge_overlapping`] over [`Group`]s.
///
/// Only groups of the same kind are merged. The surviving group keeps its
/// id and selection.
pub fn merge_overlapping_groups(mut groups: Vec<Group>) -> Vec<Group> {
    loop {
        let mut changed = false;
        let mut i = 0;
        while i < groups.len() {
            let mut j = i + 1;
            while j < groups.len() {
                let overlaps = groups[i].kind == groups[j].kind
                    && groups[j].members().iter().any(|m| groups[i].contains(m));
                if overlaps {
                    let absorbed = groups.remove(j);
                    groups[i].absorb(absorbed);
                    changed = true;
                } else {
                    j += 1;
                }
            }
            i += 1;
        }
        if !changed {
            return groups;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{GroupKind, PhotoId};

    fn normalized(groups: &[Vec<&'static str>]) -> Vec<Vec<&'static str>> {
        let mut sorted: Vec<Vec<&str>> = groups
            .iter()
            .map(|g| {
                let mut g = g.clone();
                g.sort_unstable();
                g
            })
            .collect();
        sorted.sort();
        sorted
    }

    #[test]
    fn chain_collapses_into_one_group() {
        let merged = merge_overlapping(vec![
            vec!["A", "B"],
            vec!["B", "C"],
            vec!["C", "D"],
            vec!["E", "F"],
        ]);
        assert_eq!(merged, vec![vec!["A", "B", "C", "D"], vec!["E", "F"]]);
    }

    #[test]
    fn result_is_independent_of_input_order() {
        let groups = vec![
            vec!["A", "B"],
            vec!["B", "C"],
            vec!["C", "D"],
            vec!["E", "F"],
        ];
        let expected = normalized(&merge_overlapping(groups.clone()));

        // Every rotation and the reversal
        for shift in 0..groups.len() {
            let mut rotated = groups.clone();
            rotated.rotate_left(shift);
            assert_eq!(normalized(&merge_overlapping(rotated.clone())), expected);
            rotated.reverse();
            assert_eq!(normalized(&merge_overlapping(rotated)), expected);
        }
    }

    #[test]
    fn late_bridge_is_picked_up_by_another_pass() {
        // [A,B] and [C,D] only connect after [D,E] joins [E,A]
        let merged = merge_overlapping(vec![
            vec!["A", "B"],
            vec!["C", "D"],
            vec!["D", "E"],
            vec!["E", "A"],
        ]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].len(), 5);
    }

    #[test]
    fn merging_is_idempotent() {
        let once = merge_overlapping(vec![vec![1, 2], vec![2, 3], vec![7, 8]]);
        let twice = merge_overlapping(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(merge_overlapping::<u32>(Vec::new()).is_empty());
        assert!(merge_overlapping_groups(Vec::new()).is_empty());
    }

    #[test]
    fn groups_of_different_kind_are_not_merged() {
        let ids = |a: &str, b: &str| (PhotoId::from(a), PhotoId::from(b));
        let (a, b) = ids("a", "b");
        let (c, d) = ids("b", "c");
        let duplicate = Group::seed(GroupKind::Duplicate, a, b);
        let similar = Group::seed(GroupKind::Similar, c, d);

        let merged = merge_overlapping_groups(vec![duplicate, similar]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn surviving_group_keeps_its_id() {
        let first = Group::seed(GroupKind::Duplicate, "a".into(), "b".into());
        let second = Group::seed(GroupKind::Duplicate, "b".into(), "c".into());
        let first_id = first.id;

        let merged = merge_overlapping_groups(vec![first, second]);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].id, first_id);
        assert_eq!(merged[0].members(), &["a", "b", "c"].map(PhotoId::from));
    }
}
