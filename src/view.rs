//! The published view value and the three-bucket display partition.

use crate::task;

/// The single value a [`TaskPresenter`](crate::TaskPresenter) publishes.
///
/// Starts as `Loading`; every reload replaces it with either the corrected
/// task list or a user-visible error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskView {
    Loading,
    Success(Vec<task::Model>),
    Error(String),
}

impl TaskView {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskView::Success(_))
    }
}

/// A [`TaskView::Success`] list split into the three display sections.
///
/// With the overdue invariant maintained by the presenter
/// (`overdue == !completed && due < today`), the buckets are pairwise
/// disjoint and together cover the whole list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskBuckets {
    /// Not completed, not overdue.
    pub pending: Vec<task::Model>,
    pub overdue: Vec<task::Model>,
    pub completed: Vec<task::Model>,
}

impl TaskBuckets {
    pub fn partition(tasks: &[task::Model]) -> Self {
        let mut buckets = Self::default();
        for task in tasks {
            if task.completed {
                buckets.completed.push(task.clone());
            } else if task.overdue {
                buckets.overdue.push(task.clone());
            } else {
                buckets.pending.push(task.clone());
            }
        }
        buckets
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty() && self.overdue.is_empty() && self.completed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(id: i32, completed: bool, overdue: bool) -> task::Model {
        task::Model {
            id,
            title: format!("task {id}"),
            description: None,
            due_date: "2025-06-01".into(),
            completed,
            overdue,
        }
    }

    #[test]
    fn test_partition_covers_list_disjointly() {
        let tasks = vec![
            task(1, false, false),
            task(2, false, true),
            task(3, true, false),
            task(4, false, false),
        ];
        let buckets = TaskBuckets::partition(&tasks);

        assert_eq!(buckets.pending.iter().map(|t| t.id).collect::<Vec<_>>(), [1, 4]);
        assert_eq!(buckets.overdue.iter().map(|t| t.id).collect::<Vec<_>>(), [2]);
        assert_eq!(buckets.completed.iter().map(|t| t.id).collect::<Vec<_>>(), [3]);

        let total = buckets.pending.len() + buckets.overdue.len() + buckets.completed.len();
        assert_eq!(total, tasks.len());
    }

    #[test]
    fn test_partition_empty() {
        assert!(TaskBuckets::partition(&[]).is_empty());
    }
}
