/*!
Frame-interval run compression.

Copyright 2025 Neuraville Inc.
Licensed under the Apache License, Version 2.0
*/

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::{json, Value};

/// One inclusive run of consecutive frame ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FrameInterval {
    pub frame_start: u64,
    pub frame_end: u64,
}

impl FrameInterval {
    pub fn to_target(&self) -> Value {
        json!(self)
    }
}

/// Compress a set of frame ids into the minimal sequence of maximal runs.
///
/// Every id lies in exactly one run and no two runs are mergeable (adjacent
/// runs are separated by a gap of at least one absent id).
pub fn compress_intervals(frame_ids: &BTreeSet<u64>) -> Vec<FrameInterval> {
    let mut runs = Vec::new();
    let mut current: Option<FrameInterval> = None;

    for &id in frame_ids {
        match current.as_mut() {
            Some(run) if id == run.frame_end + 1 => run.frame_end = id,
            Some(run) => {
                runs.push(*run);
                current = Some(FrameInterval { frame_start: id, frame_end: id });
            }
            None => current = Some(FrameInterval { frame_start: id, frame_end: id }),
        }
    }
    if let Some(run) = current {
        runs.push(run);
    }
    runs
}

/// Emit a sequence of runs as the `frame_intervals` fragment.
pub fn intervals_to_target(intervals: &[FrameInterval]) -> Value {
    Value::Array(intervals.iter().map(FrameInterval::to_target).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn set(ids: &[u64]) -> BTreeSet<u64> {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_empty_set_yields_no_runs() {
        assert!(compress_intervals(&BTreeSet::new()).is_empty());
    }

    #[test]
    fn test_single_id() {
        assert_eq!(
            compress_intervals(&set(&[4])),
            vec![FrameInterval { frame_start: 4, frame_end: 4 }]
        );
    }

    #[test]
    fn test_gapped_runs() {
        let runs = compress_intervals(&set(&[0, 1, 2, 5, 7, 8, 9]));
        assert_eq!(
            runs,
            vec![
                FrameInterval { frame_start: 0, frame_end: 2 },
                FrameInterval { frame_start: 5, frame_end: 5 },
                FrameInterval { frame_start: 7, frame_end: 9 },
            ]
        );
    }

    #[test]
    fn test_runs_cover_exactly_and_never_touch() {
        let ids = set(&[1, 2, 3, 10, 11, 40, 42, 44, 45, 100]);
        let runs = compress_intervals(&ids);

        let mut covered = BTreeSet::new();
        for run in &runs {
            for id in run.frame_start..=run.frame_end {
                assert!(covered.insert(id), "id {} covered twice", id);
            }
        }
        assert_eq!(covered, ids);

        for pair in runs.windows(2) {
            assert!(pair[0].frame_end + 1 < pair[1].frame_start);
        }
    }

    #[test]
    fn test_fragment_shape() {
        let runs = compress_intervals(&set(&[0]));
        assert_eq!(
            intervals_to_target(&runs),
            json!([{"frame_start": 0, "frame_end": 0}])
        );
    }
}
