//! Invariants of the board reducer over generated boards and intent sequences.

use std::collections::HashSet;

use chrono::NaiveDate;
use proptest::prelude::*;
use proptest::sample::Index;
use taskboard_lib::plugins::board::reducer::{Board, Intent};
use taskboard_lib::plugins::board::types::{Task, TaskId, TaskStatus};

fn task(id: TaskId, status: TaskStatus) -> Task {
    Task {
        id,
        title: format!("task {}", id),
        description: None,
        due_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        status,
        categories: vec![],
        created_at: None,
        updated_at: None,
    }
}

fn status_strategy() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![
        Just(TaskStatus::Todo),
        Just(TaskStatus::InProgress),
        Just(TaskStatus::Done),
    ]
}

/// Boards with ids `0..n`, so ids `n..20` are novel.
fn board_strategy() -> impl Strategy<Value = Board> {
    prop::collection::vec(status_strategy(), 0..12).prop_map(|statuses| {
        let tasks = statuses
            .into_iter()
            .enumerate()
            .map(|(i, status)| task(i as TaskId, status))
            .collect();
        Board::load(tasks).board
    })
}

fn intent_strategy() -> impl Strategy<Value = Intent> {
    prop_oneof![
        (status_strategy(), 0usize..8, 0usize..8).prop_map(|(status, from_index, to_index)| {
            Intent::ReorderWithinColumn {
                status,
                from_index,
                to_index,
            }
        }),
        (status_strategy(), 0usize..8, status_strategy(), 0usize..8).prop_map(
            |(from_status, from_index, to_status, to_index)| Intent::MoveAcrossColumn {
                from_status,
                from_index,
                to_status,
                to_index,
            }
        ),
        (0..20 as TaskId, status_strategy()).prop_map(|(id, status)| Intent::Upsert(task(id, status))),
        (0..20 as TaskId).prop_map(Intent::Remove),
    ]
}

fn assert_partitioned(board: &Board) -> Result<(), TestCaseError> {
    let mut seen = HashSet::new();
    for (status, column) in board.columns() {
        for task in column {
            prop_assert_eq!(task.status, status);
            prop_assert!(seen.insert(task.id), "task {} appears twice", task.id);
        }
    }
    prop_assert_eq!(seen.len(), board.len());
    Ok(())
}

proptest! {
    #[test]
    fn test_every_reachable_board_is_partitioned(
        board in board_strategy(),
        intents in prop::collection::vec(intent_strategy(), 0..24),
    ) {
        let mut board = board;
        for intent in intents {
            board = board.apply(intent).board;
            assert_partitioned(&board)?;
        }
    }

    #[test]
    fn test_reorder_to_same_index_is_identity(
        board in board_strategy(),
        status in status_strategy(),
        index in any::<Index>(),
    ) {
        let len = board.column(status).len();
        prop_assume!(len > 0);

        let transition = board.reorder(status, index.index(len), index.index(len));
        prop_assert_eq!(transition.board, board);
        prop_assert!(transition.diagnostic.is_none());
    }

    #[test]
    fn test_reorder_then_inverse_restores_order(
        board in board_strategy(),
        status in status_strategy(),
        from in any::<Index>(),
        to in any::<Index>(),
    ) {
        let len = board.column(status).len();
        prop_assume!(len > 0);
        let (from, to) = (from.index(len), to.index(len));

        let there = board.reorder(status, from, to).board;
        let back = there.reorder(status, to, from).board;
        prop_assert_eq!(back, board);
    }

    #[test]
    fn test_move_preserves_total_count(
        board in board_strategy(),
        from_status in status_strategy(),
        from_index in 0usize..8,
        to_status in status_strategy(),
        to_index in 0usize..16,
    ) {
        let next = board.move_across(from_status, from_index, to_status, to_index).board;
        prop_assert_eq!(next.len(), board.len());
    }

    #[test]
    fn test_upsert_grows_only_for_novel_ids(
        board in board_strategy(),
        id in 0..20 as TaskId,
        status in status_strategy(),
    ) {
        let existed = board.contains(id);
        let next = board.upsert(task(id, status)).board;

        if existed {
            prop_assert_eq!(next.len(), board.len());
        } else {
            prop_assert_eq!(next.len(), board.len() + 1);
            prop_assert_eq!(next.column(status)[0].id, id);
        }
    }

    #[test]
    fn test_remove_shrinks_by_one_or_not_at_all(
        board in board_strategy(),
        id in 0..20 as TaskId,
    ) {
        let existed = board.contains(id);
        let next = board.remove(id).board;

        if existed {
            prop_assert_eq!(next.len(), board.len() - 1);
            prop_assert!(!next.contains(id));
        } else {
            prop_assert_eq!(next, board);
        }
    }

    #[test]
    fn test_compensation_restores_previous_board(
        board in board_strategy(),
        intent in intent_strategy(),
    ) {
        if let Some(compensation) = board.compensation_for(&intent) {
            let applied = board.apply(intent).board;
            prop_assert_eq!(applied.revert(&compensation), board);
        }
    }
}
