//! Pick-path ordering for a whole load.
//!
//! One global sort across every order and line item of the load: tasks from
//! different orders interleave when their locations are close. Ties keep
//! generation order (line-item order, then FEFO order within a line item).

use crate::proximity::ProximityScorer;
use crate::task::{PickTask, TaskDraft};

/// Order `drafts` by proximity score and number them `1..=N`.
pub fn sequence<S>(drafts: Vec<TaskDraft>, scorer: &S) -> Vec<PickTask>
where
    S: ProximityScorer + ?Sized,
{
    let mut keyed: Vec<(i64, usize, TaskDraft)> = drafts
        .into_iter()
        .enumerate()
        .map(|(idx, draft)| (scorer.score(&draft.location), idx, draft))
        .collect();

    // Generation index breaks ties explicitly.
    keyed.sort_by_key(|(score, idx, _)| (*score, *idx));

    keyed
        .into_iter()
        .zip(1u32..)
        .map(|((_, _, draft), seq)| draft.into_task(seq))
        .collect()
}
