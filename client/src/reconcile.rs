//! Most-recent-mutation selection.
//!
//! The three mutation kinds resolve independently; the view shows whichever
//! completed last. `select_latest` folds their recorded outcomes into that
//! single view model: start from the sentinel and replace the candidate
//! only on a strictly greater completion stamp.
//!
//! Because the comparison replaces on strict increase only, two outcomes
//! with an identical stamp resolve in favor of the one evaluated first —
//! add, then delete, then update. The evaluation order is a fixed policy;
//! tests depend on it.

use crate::outcome::MutationOutcome;

/// Pick the most recently completed of the three mutation outcomes.
///
/// Pure and side-effect free: inputs are immutable snapshots and the result
/// is recomputed from scratch on every call, so there is no intermediate
/// state between an input changing and the derived output changing.
pub fn select_latest(
    add: Option<&MutationOutcome>,
    delete: Option<&MutationOutcome>,
    update: Option<&MutationOutcome>,
) -> MutationOutcome {
    let mut current = MutationOutcome::none();
    for candidate in [add, delete, update].into_iter().flatten() {
        if candidate.completed_at > current.completed_at {
            current = candidate.clone();
        }
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcome::ActionKind;
    use crate::types::Todo;

    fn todo(id: i64, title: &str) -> Todo {
        Todo {
            id,
            title: title.to_string(),
            is_completed: false,
        }
    }

    fn outcome(action: ActionKind, completed_at: u64) -> MutationOutcome {
        MutationOutcome::new(action, vec![todo(1, "x")], completed_at)
    }

    #[test]
    fn all_absent_yields_sentinel() {
        let result = select_latest(None, None, None);
        assert_eq!(result, MutationOutcome::none());
    }

    #[test]
    fn single_present_outcome_wins() {
        let update = outcome(ActionKind::Update, 5);
        let result = select_latest(None, None, Some(&update));
        assert_eq!(result.action, ActionKind::Update);
        assert_eq!(result.completed_at, 5);
    }

    #[test]
    fn greatest_stamp_wins_for_every_ordering() {
        let cases: [(u64, u64, u64, ActionKind); 6] = [
            (3, 2, 1, ActionKind::Add),
            (3, 1, 2, ActionKind::Add),
            (2, 3, 1, ActionKind::Delete),
            (1, 3, 2, ActionKind::Delete),
            (2, 1, 3, ActionKind::Update),
            (1, 2, 3, ActionKind::Update),
        ];
        for (ta, td, tu, expected) in cases {
            let add = outcome(ActionKind::Add, ta);
            let delete = outcome(ActionKind::Delete, td);
            let update = outcome(ActionKind::Update, tu);
            let result = select_latest(Some(&add), Some(&delete), Some(&update));
            assert_eq!(result.action, expected, "stamps ({ta},{td},{tu})");
            assert_eq!(result.completed_at, ta.max(td).max(tu));
        }
    }

    #[test]
    fn tie_resolves_to_earlier_evaluated_kind() {
        let add = outcome(ActionKind::Add, 4);
        let delete = outcome(ActionKind::Delete, 4);
        let update = outcome(ActionKind::Update, 4);

        let result = select_latest(Some(&add), Some(&delete), Some(&update));
        assert_eq!(result.action, ActionKind::Add);

        let result = select_latest(None, Some(&delete), Some(&update));
        assert_eq!(result.action, ActionKind::Delete);
    }

    #[test]
    fn absent_outcomes_are_skipped() {
        let delete = outcome(ActionKind::Delete, 2);
        let result = select_latest(None, Some(&delete), None);
        assert_eq!(result.action, ActionKind::Delete);
        assert_eq!(result.result_data.len(), 1);
    }

    #[test]
    fn result_carries_the_winning_payload() {
        let add = MutationOutcome::new(ActionKind::Add, vec![todo(9, "latest")], 7);
        let update = outcome(ActionKind::Update, 3);
        let result = select_latest(Some(&add), None, Some(&update));
        assert_eq!(result.result_data, vec![todo(9, "latest")]);
    }
}
