//! Board state: three ordered columns and the pure transitions between them.
//!
//! Every transition borrows the current [`Board`] and returns a new one. The
//! input is never mutated, so a caller can keep the previous board around for
//! rendering or for computing a [`Compensation`].

use super::errors::Diagnostic;
use super::types::{Task, TaskId, TaskStatus};

/// A named request to transition the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Replace every column with server-fetched tasks, keeping server order.
    Load(Vec<Task>),
    ReorderWithinColumn {
        status: TaskStatus,
        from_index: usize,
        to_index: usize,
    },
    MoveAcrossColumn {
        from_status: TaskStatus,
        from_index: usize,
        to_status: TaskStatus,
        to_index: usize,
    },
    Upsert(Task),
    Remove(TaskId),
}

/// Result of applying an intent: the next board and, if the intent was rejected
/// or only partly applied, the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub board: Board,
    pub diagnostic: Option<Diagnostic>,
}

impl Transition {
    fn ok(board: Board) -> Self {
        Self {
            board,
            diagnostic: None,
        }
    }

    fn rejected(board: Board, diagnostic: Diagnostic) -> Self {
        Self {
            board,
            diagnostic: Some(diagnostic),
        }
    }
}

/// The inverse of a mutating intent, computed from the board it was applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compensation {
    /// Put `task` back at `index` of its status column, dropping whatever entry
    /// currently carries its id.
    Restore { task: Task, index: usize },
    /// Drop an entry that did not exist before the intent.
    Discard(TaskId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    columns: [Vec<Task>; 3],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(&self, status: TaskStatus) -> &[Task] {
        &self.columns[status.index()]
    }

    /// Columns in display order, paired with their status.
    pub fn columns(&self) -> impl Iterator<Item = (TaskStatus, &[Task])> {
        TaskStatus::ALL
            .into_iter()
            .map(move |status| (status, self.column(status)))
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.columns.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Where a task currently sits, as (column, index).
    pub fn position(&self, id: TaskId) -> Option<(TaskStatus, usize)> {
        self.columns().find_map(|(status, column)| {
            column
                .iter()
                .position(|task| task.id == id)
                .map(|index| (status, index))
        })
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.position(id)
            .map(|(status, index)| &self.columns[status.index()][index])
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.position(id).is_some()
    }

    pub fn apply(&self, intent: Intent) -> Transition {
        match intent {
            Intent::Load(tasks) => Board::load(tasks),
            Intent::ReorderWithinColumn {
                status,
                from_index,
                to_index,
            } => self.reorder(status, from_index, to_index),
            Intent::MoveAcrossColumn {
                from_status,
                from_index,
                to_status,
                to_index,
            } => self.move_across(from_status, from_index, to_status, to_index),
            Intent::Upsert(task) => self.upsert(task),
            Intent::Remove(id) => self.remove(id),
        }
    }

    /// Partitions `tasks` by status. A repeated id keeps its first occurrence.
    pub fn load(tasks: Vec<Task>) -> Transition {
        let mut board = Board::new();
        let mut duplicate = None;

        for task in tasks {
            if board.contains(task.id) {
                duplicate.get_or_insert(task.id);
                continue;
            }
            board.columns[task.status.index()].push(task);
        }

        match duplicate {
            Some(id) => Transition::rejected(board, Diagnostic::DuplicateTask(id)),
            None => Transition::ok(board),
        }
    }

    pub fn reorder(&self, status: TaskStatus, from_index: usize, to_index: usize) -> Transition {
        let len = self.column(status).len();
        if from_index >= len {
            return Transition::rejected(
                self.clone(),
                Diagnostic::IndexOutOfRange {
                    status,
                    index: from_index,
                    len,
                },
            );
        }
        if from_index == to_index {
            return Transition::ok(self.clone());
        }

        let mut next = self.clone();
        let column = &mut next.columns[status.index()];
        let task = column.remove(from_index);
        insert_clamped(column, to_index, task);
        Transition::ok(next)
    }

    pub fn move_across(
        &self,
        from_status: TaskStatus,
        from_index: usize,
        to_status: TaskStatus,
        to_index: usize,
    ) -> Transition {
        if from_status == to_status {
            return self.reorder(from_status, from_index, to_index);
        }

        let len = self.column(from_status).len();
        if from_index >= len {
            return Transition::rejected(
                self.clone(),
                Diagnostic::IndexOutOfRange {
                    status: from_status,
                    index: from_index,
                    len,
                },
            );
        }

        let mut next = self.clone();
        let mut task = next.columns[from_status.index()].remove(from_index);
        task.status = to_status;
        insert_clamped(&mut next.columns[to_status.index()], to_index, task);
        Transition::ok(next)
    }

    /// Inserts a new task at the top of its column, or replaces an existing one:
    /// in place when the status is unchanged, at the top of the new column otherwise.
    pub fn upsert(&self, task: Task) -> Transition {
        let mut next = self.clone();

        match self.position(task.id) {
            Some((status, index)) if status == task.status => {
                next.columns[status.index()][index] = task;
            }
            Some((status, index)) => {
                next.columns[status.index()].remove(index);
                next.columns[task.status.index()].insert(0, task);
            }
            None => {
                next.columns[task.status.index()].insert(0, task);
            }
        }

        Transition::ok(next)
    }

    pub fn remove(&self, id: TaskId) -> Transition {
        let mut next = self.clone();
        if let Some((status, index)) = self.position(id) {
            next.columns[status.index()].remove(index);
        }
        Transition::ok(next)
    }

    /// Computes how to undo `intent` once it has been applied to this board.
    /// Returns `None` for loads and for intents that would not change anything.
    pub fn compensation_for(&self, intent: &Intent) -> Option<Compensation> {
        let restore_at = |status: TaskStatus, index: usize| {
            self.column(status)
                .get(index)
                .map(|task| Compensation::Restore {
                    task: task.clone(),
                    index,
                })
        };

        match intent {
            Intent::Load(_) => None,
            Intent::ReorderWithinColumn {
                status,
                from_index,
                to_index,
            } if from_index != to_index => restore_at(*status, *from_index),
            Intent::ReorderWithinColumn { .. } => None,
            Intent::MoveAcrossColumn {
                from_status,
                from_index,
                ..
            } => restore_at(*from_status, *from_index),
            Intent::Upsert(task) => match self.position(task.id) {
                Some((status, index)) => restore_at(status, index),
                None => Some(Compensation::Discard(task.id)),
            },
            Intent::Remove(id) => self
                .position(*id)
                .and_then(|(status, index)| restore_at(status, index)),
        }
    }

    pub fn revert(&self, compensation: &Compensation) -> Board {
        match compensation {
            Compensation::Restore { task, index } => {
                let mut next = self.remove(task.id).board;
                insert_clamped(&mut next.columns[task.status.index()], *index, task.clone());
                next
            }
            Compensation::Discard(id) => self.remove(*id).board,
        }
    }
}

/// Inserts at `index`, or appends when `index` is past the end.
fn insert_clamped(column: &mut Vec<Task>, index: usize, task: Task) {
    let index = index.min(column.len());
    column.insert(index, task);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

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

    fn ids(board: &Board, status: TaskStatus) -> Vec<TaskId> {
        board.column(status).iter().map(|t| t.id).collect()
    }

    fn board_of(tasks: Vec<Task>) -> Board {
        let transition = Board::load(tasks);
        assert!(transition.diagnostic.is_none());
        transition.board
    }

    #[test]
    fn test_load_partitions_by_status_in_server_order() {
        let board = board_of(vec![
            task(4, TaskStatus::Done),
            task(3, TaskStatus::Todo),
            task(2, TaskStatus::InProgress),
            task(1, TaskStatus::Todo),
        ]);

        assert_eq!(ids(&board, TaskStatus::Todo), vec![3, 1]);
        assert_eq!(ids(&board, TaskStatus::InProgress), vec![2]);
        assert_eq!(ids(&board, TaskStatus::Done), vec![4]);
        assert_eq!(board.len(), 4);
    }

    #[test]
    fn test_load_drops_repeated_ids() {
        let transition = Board::load(vec![
            task(1, TaskStatus::Todo),
            task(1, TaskStatus::Done),
            task(2, TaskStatus::Done),
        ]);

        assert_eq!(transition.diagnostic, Some(Diagnostic::DuplicateTask(1)));
        assert_eq!(ids(&transition.board, TaskStatus::Todo), vec![1]);
        assert_eq!(ids(&transition.board, TaskStatus::Done), vec![2]);
    }

    #[test]
    fn test_load_replaces_previous_columns() {
        let board = board_of(vec![task(1, TaskStatus::Todo)]);
        let next = board.apply(Intent::Load(vec![task(9, TaskStatus::Done)])).board;

        assert!(!next.contains(1));
        assert_eq!(ids(&next, TaskStatus::Done), vec![9]);
    }

    #[test]
    fn test_reorder_swaps_two_tasks() {
        let board = board_of(vec![task(1, TaskStatus::Todo), task(2, TaskStatus::Todo)]);
        let next = board.reorder(TaskStatus::Todo, 0, 1).board;

        assert_eq!(ids(&next, TaskStatus::Todo), vec![2, 1]);
        assert!(next.column(TaskStatus::InProgress).is_empty());
        assert!(next.column(TaskStatus::Done).is_empty());
        // input untouched
        assert_eq!(ids(&board, TaskStatus::Todo), vec![1, 2]);
    }

    #[test]
    fn test_reorder_same_index_is_noop() {
        let board = board_of(vec![task(1, TaskStatus::Todo), task(2, TaskStatus::Todo)]);
        let transition = board.reorder(TaskStatus::Todo, 1, 1);

        assert_eq!(transition.board, board);
        assert!(transition.diagnostic.is_none());
    }

    #[test]
    fn test_reorder_clamps_destination() {
        let board = board_of(vec![
            task(1, TaskStatus::Todo),
            task(2, TaskStatus::Todo),
            task(3, TaskStatus::Todo),
        ]);
        let next = board.reorder(TaskStatus::Todo, 0, 50).board;

        assert_eq!(ids(&next, TaskStatus::Todo), vec![2, 3, 1]);
    }

    #[test]
    fn test_reorder_rejects_missing_source() {
        let board = board_of(vec![task(1, TaskStatus::Todo)]);
        let transition = board.reorder(TaskStatus::Todo, 3, 0);

        assert_eq!(transition.board, board);
        assert_eq!(
            transition.diagnostic,
            Some(Diagnostic::IndexOutOfRange {
                status: TaskStatus::Todo,
                index: 3,
                len: 1
            })
        );
    }

    #[test]
    fn test_move_across_sets_status() {
        let board = board_of(vec![task(1, TaskStatus::Todo), task(2, TaskStatus::Todo)]);
        let next = board
            .move_across(TaskStatus::Todo, 0, TaskStatus::Done, 0)
            .board;

        assert_eq!(ids(&next, TaskStatus::Todo), vec![2]);
        assert_eq!(ids(&next, TaskStatus::Done), vec![1]);
        assert_eq!(next.get(1).unwrap().status, TaskStatus::Done);
    }

    #[test]
    fn test_move_across_appends_when_destination_is_past_end() {
        let board = board_of(vec![
            task(1, TaskStatus::Todo),
            task(2, TaskStatus::InProgress),
        ]);
        let next = board
            .move_across(TaskStatus::Todo, 0, TaskStatus::InProgress, 9)
            .board;

        assert_eq!(ids(&next, TaskStatus::InProgress), vec![2, 1]);
    }

    #[test]
    fn test_move_across_same_column_reorders() {
        let board = board_of(vec![task(1, TaskStatus::Done), task(2, TaskStatus::Done)]);
        let next = board.move_across(TaskStatus::Done, 1, TaskStatus::Done, 0).board;

        assert_eq!(ids(&next, TaskStatus::Done), vec![2, 1]);
    }

    #[test]
    fn test_move_across_rejects_missing_source() {
        let board = board_of(vec![task(1, TaskStatus::Todo)]);
        let transition = board.move_across(TaskStatus::InProgress, 0, TaskStatus::Done, 0);

        assert_eq!(transition.board, board);
        assert!(matches!(
            transition.diagnostic,
            Some(Diagnostic::IndexOutOfRange { status: TaskStatus::InProgress, .. })
        ));
    }

    #[test]
    fn test_upsert_new_task_goes_to_top() {
        let board = board_of(vec![task(1, TaskStatus::InProgress)]);
        let next = board.upsert(task(2, TaskStatus::InProgress)).board;

        assert_eq!(ids(&next, TaskStatus::InProgress), vec![2, 1]);
    }

    #[test]
    fn test_upsert_same_status_replaces_in_place() {
        let board = board_of(vec![
            task(1, TaskStatus::Todo),
            task(2, TaskStatus::Todo),
            task(3, TaskStatus::Todo),
        ]);
        let mut edited = task(2, TaskStatus::Todo);
        edited.title = "renamed".to_string();
        let next = board.upsert(edited).board;

        assert_eq!(ids(&next, TaskStatus::Todo), vec![1, 2, 3]);
        assert_eq!(next.get(2).unwrap().title, "renamed");
    }

    #[test]
    fn test_upsert_status_change_moves_to_top_of_new_column() {
        let board = board_of(vec![
            task(1, TaskStatus::Done),
            task(2, TaskStatus::Done),
            task(5, TaskStatus::Done),
            task(7, TaskStatus::InProgress),
        ]);
        let next = board.upsert(task(5, TaskStatus::InProgress)).board;

        assert_eq!(ids(&next, TaskStatus::Done), vec![1, 2]);
        assert_eq!(ids(&next, TaskStatus::InProgress), vec![5, 7]);
    }

    #[test]
    fn test_remove_present_and_absent() {
        let board = board_of(vec![task(1, TaskStatus::Todo), task(2, TaskStatus::Done)]);

        let next = board.remove(2).board;
        assert_eq!(next.len(), 1);
        assert!(!next.contains(2));

        let unchanged = board.remove(99);
        assert_eq!(unchanged.board, board);
        assert!(unchanged.diagnostic.is_none());
    }

    #[test]
    fn test_compensation_undoes_each_mutation() {
        let board = board_of(vec![
            task(1, TaskStatus::Todo),
            task(2, TaskStatus::Todo),
            task(3, TaskStatus::InProgress),
            task(4, TaskStatus::Done),
        ]);

        let mut edited = task(3, TaskStatus::Done);
        edited.title = "edited".to_string();

        let intents = vec![
            Intent::ReorderWithinColumn {
                status: TaskStatus::Todo,
                from_index: 0,
                to_index: 1,
            },
            Intent::MoveAcrossColumn {
                from_status: TaskStatus::Todo,
                from_index: 1,
                to_status: TaskStatus::Done,
                to_index: 1,
            },
            Intent::Upsert(edited),
            Intent::Upsert(task(10, TaskStatus::Todo)),
            Intent::Remove(4),
        ];

        for intent in intents {
            let compensation = board
                .compensation_for(&intent)
                .unwrap_or_else(|| panic!("no compensation for {:?}", intent));
            let applied = board.apply(intent).board;
            assert_ne!(applied, board);
            assert_eq!(applied.revert(&compensation), board);
        }
    }

    #[test]
    fn test_no_compensation_for_noops() {
        let board = board_of(vec![task(1, TaskStatus::Todo)]);

        assert_eq!(board.compensation_for(&Intent::Remove(99)), None);
        assert_eq!(
            board.compensation_for(&Intent::ReorderWithinColumn {
                status: TaskStatus::Todo,
                from_index: 0,
                to_index: 0
            }),
            None
        );
        assert_eq!(board.compensation_for(&Intent::Load(vec![])), None);
    }
}
