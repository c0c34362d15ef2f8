#![forbid(unsafe_code)]

//! Reorder analysis: which retained records actually changed relative order?
//!
//! The `moves` list of a pass contains every retained record whose index
//! changed, including records that merely shifted because something was
//! inserted or removed ahead of them. A view patcher that physically moves
//! all of them does needless work. The minimal set to move is the
//! complement of a longest increasing subsequence of previous indices taken
//! in current order: records on that subsequence keep their relative order
//! and can stay where they are.
//!
//! Callers can weight elements so that some records are kept on the run in
//! preference to others; the differ weights records that kept their index
//! above records that moved.
//!
//! Maximum-weight increasing subsequence over a Fenwick tree of value
//! ranks, with predecessor links, O(n log n).

use smallvec::SmallVec;

/// Marks the members of one longest strictly increasing subsequence of
/// `values`.
///
/// `result[i]` is `true` when `values[i]` is on the subsequence.
#[must_use]
pub fn longest_increasing_run(values: &[usize]) -> Vec<bool> {
    longest_weighted_run(values, &vec![1; values.len()])
}

/// Marks the members of a strictly increasing subsequence of `values` with
/// the largest total weight.
///
/// `weights[i]` is the weight of `values[i]`; missing weights count as 1.
/// Among runs of equal weight the one ending latest wins, and each element
/// links to the latest predecessor of best weight, so the result is
/// deterministic.
#[must_use]
pub fn longest_weighted_run(values: &[usize], weights: &[u64]) -> Vec<bool> {
    let mut on_run = vec![false; values.len()];
    if values.is_empty() {
        return on_run;
    }

    let mut ranks: SmallVec<[usize; 32]> = values.iter().copied().collect();
    ranks.sort_unstable();
    ranks.dedup();

    // tree[k] = best (total weight, end index) over a Fenwick range of ranks.
    let mut tree: Vec<Option<(u64, usize)>> = vec![None; ranks.len() + 1];
    let mut predecessor: Vec<Option<usize>> = vec![None; values.len()];
    let mut end: Option<(u64, usize)> = None;

    for (i, &value) in values.iter().enumerate() {
        let rank = ranks.partition_point(|&r| r < value);

        // Best run over strictly smaller ranks.
        let mut best: Option<(u64, usize)> = None;
        let mut k = rank;
        while k > 0 {
            best = best.max(tree[k]);
            k &= k - 1;
        }
        predecessor[i] = best.map(|(_, j)| j);

        let weight = weights.get(i).copied().unwrap_or(1);
        let entry = Some((best.map_or(0, |(w, _)| w).saturating_add(weight), i));
        let mut k = rank + 1;
        while k < tree.len() {
            tree[k] = tree[k].max(entry);
            k += k & k.wrapping_neg();
        }
        end = end.max(entry);
    }

    let mut cursor = end.map(|(_, i)| i);
    while let Some(i) = cursor {
        on_run[i] = true;
        cursor = predecessor[i];
    }
    on_run
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn run_len(values: &[usize]) -> usize {
        longest_increasing_run(values).iter().filter(|&&b| b).count()
    }

    #[test]
    fn empty_input() {
        assert!(longest_increasing_run(&[]).is_empty());
    }

    #[test]
    fn sorted_input_is_entirely_on_run() {
        assert_eq!(longest_increasing_run(&[0, 2, 5, 9]), vec![true; 4]);
    }

    #[test]
    fn swap_keeps_one_of_two() {
        assert_eq!(run_len(&[1, 0]), 1);
        assert_eq!(longest_increasing_run(&[1, 0, 2]), vec![false, true, true]);
    }

    #[test]
    fn single_item_moved_to_front() {
        // c moved before a and b.
        assert_eq!(longest_increasing_run(&[2, 0, 1]), vec![false, true, true]);
    }

    #[test]
    fn reversed_input_keeps_one() {
        assert_eq!(run_len(&[4, 3, 2, 1, 0]), 1);
    }

    #[test]
    fn equal_values_are_not_both_kept() {
        assert_eq!(run_len(&[1, 1, 1]), 1);
        assert_eq!(run_len(&[0, 2, 2, 3]), 3);
    }

    #[test]
    fn heavy_element_wins_a_tie() {
        // Runs [2] and [1] tie on length; the weighted one is kept.
        assert_eq!(longest_increasing_run(&[2, 1]), vec![false, true]);
        assert_eq!(longest_weighted_run(&[2, 1], &[3, 1]), vec![true, false]);
    }

    #[test]
    fn heavy_element_beats_a_longer_run() {
        // [0, 1, 2] is longer but skips the heavy 3.
        let marks = longest_weighted_run(&[3, 0, 1, 2], &[5, 1, 1, 1]);
        assert_eq!(marks, vec![true, false, false, false]);
    }

    #[test]
    fn missing_weights_count_as_one() {
        assert_eq!(
            longest_weighted_run(&[1, 0, 2], &[]),
            longest_increasing_run(&[1, 0, 2])
        );
    }

    proptest! {
        #[test]
        fn run_is_strictly_increasing(values in prop::collection::vec(0usize..50, 0..40)) {
            let marks = longest_increasing_run(&values);
            let picked: Vec<usize> = values
                .iter()
                .zip(&marks)
                .filter_map(|(&v, &m)| m.then_some(v))
                .collect();
            prop_assert!(picked.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn run_is_at_least_as_long_as_any_sorted_prefix(
            values in prop::collection::vec(0usize..50, 1..40),
        ) {
            // Quadratic reference length.
            let mut best = vec![1usize; values.len()];
            for i in 0..values.len() {
                for j in 0..i {
                    if values[j] < values[i] {
                        best[i] = best[i].max(best[j] + 1);
                    }
                }
            }
            let expected = best.into_iter().max().unwrap_or(0);
            prop_assert_eq!(run_len(&values), expected);
        }

        #[test]
        fn heavy_increasing_elements_are_all_kept(
            values in prop::collection::vec(0usize..50, 0..40),
            heavy in prop::collection::vec(any::<bool>(), 40),
        ) {
            // Mark a strictly increasing selection as heavy, outweighing
            // every light element together.
            let mut last = None;
            let mut chosen = vec![false; values.len()];
            for (i, &v) in values.iter().enumerate() {
                if heavy[i] && last.is_none_or(|l| l < v) {
                    chosen[i] = true;
                    last = Some(v);
                }
            }
            let big = values.len() as u64 + 1;
            let weights: Vec<u64> = chosen.iter().map(|&c| if c { big } else { 1 }).collect();

            let marks = longest_weighted_run(&values, &weights);
            for (i, &c) in chosen.iter().enumerate() {
                prop_assert!(!c || marks[i], "heavy element {} dropped", i);
            }
            let picked: Vec<usize> = values
                .iter()
                .zip(&marks)
                .filter_map(|(&v, &m)| m.then_some(v))
                .collect();
            prop_assert!(picked.windows(2).all(|w| w[0] < w[1]));
        }
    }
}
