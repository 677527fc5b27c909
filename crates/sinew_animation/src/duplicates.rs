use std::ops::Range;

/// Finds the removable interior of every run of identical keys.
///
/// A run is a maximal sequence of consecutive keys for which `same` holds
/// against the run's first key. Runs of three or more keys yield the range
/// between their first and last key; shorter runs yield nothing. Ranges are
/// ascending and disjoint.
pub(crate) fn interior_runs(
    key_count: usize,
    same: impl Fn(usize, usize) -> bool,
) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    if key_count < 3 {
        return runs;
    }

    let mut run_start = 0;
    for i in 1..=key_count {
        let run_continues = i < key_count && same(run_start, i);
        if !run_continues {
            if i - run_start >= 3 {
                runs.push(run_start + 1..i - 1);
            }
            run_start = i;
        }
    }
    runs
}
