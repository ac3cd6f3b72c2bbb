//! The task presenter: mediates between the store and a rendering layer.
//!
//! The presenter owns a background loop that follows the store's change feed.
//! Each notification triggers a full re-read of the task list; the list is
//! corrected against the overdue invariant (`overdue == !completed && due <
//! today`, corrections written back to the store) and published as a
//! [`TaskView`] on a watch channel. A notification arriving while a reload is
//! still in flight cancels it and starts over, so only the newest list ever
//! reaches publication.
//!
//! Store read failures publish [`TaskView::Error`] and detach the loop from
//! the change feed until an explicit [`refresh()`](TaskPresenter::refresh).

use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;

use crate::store::TaskStore;
use crate::task;
use crate::view::TaskView;

/// Where the presenter gets "today" from. Injectable so date-sensitive
/// behavior is testable against a pinned calendar date.
type TodaySource = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Builder for [`TaskPresenter`].
pub struct TaskPresenterBuilder {
    store: Arc<dyn TaskStore>,
    today: TodaySource,
}

impl TaskPresenterBuilder {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self {
            store,
            today: Arc::new(|| Local::now().date_naive()),
        }
    }

    /// Replace the default today-source (the local calendar date).
    pub fn with_today_source<F>(mut self, today: F) -> Self
    where
        F: Fn() -> NaiveDate + Send + Sync + 'static,
    {
        self.today = Arc::new(today);
        self
    }

    /// Build the presenter and spawn its subscription loop. The loop performs
    /// an initial load immediately; until it completes the published view is
    /// [`TaskView::Loading`].
    pub fn build(self) -> TaskPresenter {
        let (view_tx, _) = watch::channel(TaskView::Loading);
        let refresh = Arc::new(Notify::new());
        let worker = tokio::spawn(run(
            self.store.clone(),
            self.today,
            view_tx.clone(),
            refresh.clone(),
        ));
        TaskPresenter {
            store: self.store,
            view_tx,
            refresh,
            worker,
        }
    }
}

/// Holds the published view and exposes the task commands.
///
/// Dropping the presenter aborts its background loop; in-flight store writes
/// are single atomic point operations, so no rollback is attempted.
pub struct TaskPresenter {
    store: Arc<dyn TaskStore>,
    view_tx: watch::Sender<TaskView>,
    refresh: Arc<Notify>,
    worker: JoinHandle<()>,
}

impl TaskPresenter {
    /// Presenter over `store` with the default today-source.
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        TaskPresenterBuilder::new(store).build()
    }

    pub fn builder(store: Arc<dyn TaskStore>) -> TaskPresenterBuilder {
        TaskPresenterBuilder::new(store)
    }

    /// Subscribe to the published view.
    pub fn view_rx(&self) -> watch::Receiver<TaskView> {
        self.view_tx.subscribe()
    }

    /// Trigger a reload. Also resumes the change-feed subscription after an
    /// [`TaskView::Error`] publication.
    pub fn refresh(&self) {
        self.refresh.notify_one();
    }

    /// Insert a task (the store assigns its id), then refresh.
    pub async fn add(&self, task: task::Model) {
        if let Err(e) = self.store.insert(task).await {
            log::error!("Failed to insert task: {e}");
        }
        self.refresh();
    }

    /// Delete a task, then refresh.
    pub async fn delete(&self, task: &task::Model) {
        if let Err(e) = self.store.delete(task).await {
            log::error!("Failed to delete task {}: {e}", task.id);
        }
        self.refresh();
    }

    /// Persist a copy of `task` with `completed` set, then refresh. The
    /// refresh recomputes the overdue flag for the new completion state.
    pub async fn set_completed(&self, task: &task::Model, completed: bool) {
        let updated = task::Model {
            completed,
            ..task.clone()
        };
        if let Err(e) = self.store.update(updated).await {
            log::error!("Failed to update task {}: {e}", task.id);
        }
        self.refresh();
    }

    /// Replace a stored task with the given snapshot, then refresh.
    pub async fn update(&self, task: task::Model) {
        let id = task.id;
        if let Err(e) = self.store.update(task).await {
            log::error!("Failed to update task {id}: {e}");
        }
        self.refresh();
    }

    /// Point lookup by id, bypassing the published view. `None` when the task
    /// does not exist (lookup failures are logged and also yield `None`).
    pub async fn get_by_id(&self, id: i32) -> Option<task::Model> {
        match self.store.get_by_id(id).await {
            Ok(found) => found,
            Err(e) => {
                log::error!("Failed to look up task {id}: {e}");
                None
            }
        }
    }
}

impl Drop for TaskPresenter {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

/// The subscription loop.
async fn run(
    store: Arc<dyn TaskStore>,
    today: TodaySource,
    view_tx: watch::Sender<TaskView>,
    refresh: Arc<Notify>,
) {
    let mut changes = store.change_rx();
    // While following, change notifications trigger reloads. Cleared after an
    // Error publication (and when the feed closes); an explicit refresh sets
    // it again with a fresh subscription.
    let mut following = true;
    loop {
        // Reload, starting over whenever a newer trigger arrives mid-flight.
        let view = loop {
            tokio::select! {
                biased;
                _ = refresh.notified() => {
                    // Fresh subscription: the reload below covers anything
                    // already queued.
                    changes = store.change_rx();
                    following = true;
                }
                result = changes.recv(), if following => {
                    match result {
                        // A lagged receiver only means missed intermediate
                        // states; the re-read below gets the current one.
                        Ok(_) | Err(RecvError::Lagged(_)) => {}
                        Err(RecvError::Closed) => following = false,
                    }
                }
                view = reload(store.as_ref(), &*today) => break view,
            }
        };
        if !view.is_success() {
            following = false;
        }
        view_tx.send_replace(view);

        // Idle until the next trigger.
        tokio::select! {
            biased;
            _ = refresh.notified() => {
                changes = store.change_rx();
                following = true;
            }
            result = changes.recv(), if following => {
                if matches!(result, Err(RecvError::Closed)) {
                    following = false;
                }
            }
        }
    }
}

/// Read the full list, enforce the overdue invariant, and produce the view to
/// publish.
async fn reload(
    store: &dyn TaskStore,
    today: &(dyn Fn() -> NaiveDate + Send + Sync),
) -> TaskView {
    let tasks = match store.all().await {
        Ok(tasks) => tasks,
        Err(e) => return TaskView::Error(format!("Failed to load tasks: {e}")),
    };

    let today = today();
    let mut corrected = Vec::with_capacity(tasks.len());
    for task in tasks {
        match recomputed(&task, today) {
            Some(fixed) => {
                // Write-back is fire-and-forget: the corrected list is
                // published whether or not the flag could be persisted.
                if let Err(e) = store.update(fixed.clone()).await {
                    log::warn!("Failed to persist overdue flag for task {}: {e}", fixed.id);
                }
                corrected.push(fixed);
            }
            None => corrected.push(task),
        }
    }
    TaskView::Success(corrected)
}

/// The corrected snapshot of `task` if its stored overdue flag disagrees with
/// the invariant, `None` if it is already consistent or the due date does not
/// parse.
fn recomputed(task: &task::Model, today: NaiveDate) -> Option<task::Model> {
    let due = task.due_on()?;
    let overdue = !task.completed && due < today;
    (overdue != task.overdue).then(|| task::Model {
        overdue,
        ..task.clone()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(due: &str, completed: bool, overdue: bool) -> task::Model {
        task::Model {
            id: 7,
            title: "Renew passport".into(),
            description: Some("Bring photos".into()),
            due_date: due.into(),
            completed,
            overdue,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[test]
    fn test_past_due_uncompleted_becomes_overdue() {
        let fixed = recomputed(&task("2020-01-01", false, false), today()).unwrap();
        assert!(fixed.overdue);
        // Everything else is untouched.
        assert_eq!(fixed.title, "Renew passport");
        assert!(!fixed.completed);
    }

    #[test]
    fn test_stale_overdue_flag_is_cleared() {
        let fixed = recomputed(&task("2099-01-01", false, true), today()).unwrap();
        assert!(!fixed.overdue);
    }

    #[test]
    fn test_completed_task_is_never_marked_overdue() {
        assert!(recomputed(&task("2020-01-01", true, false), today()).is_none());
    }

    #[test]
    fn test_completed_task_with_stale_flag_is_cleared() {
        let fixed = recomputed(&task("2020-01-01", true, true), today()).unwrap();
        assert!(!fixed.overdue);
    }

    #[test]
    fn test_consistent_task_is_untouched() {
        assert!(recomputed(&task("2020-01-01", false, true), today()).is_none());
        assert!(recomputed(&task("2099-01-01", false, false), today()).is_none());
    }

    #[test]
    fn test_due_today_is_not_overdue() {
        assert!(recomputed(&task("2025-01-01", false, false), today()).is_none());
        let fixed = recomputed(&task("2025-01-01", false, true), today()).unwrap();
        assert!(!fixed.overdue);
    }

    #[test]
    fn test_unparseable_date_is_left_alone() {
        assert!(recomputed(&task("not-a-date", false, false), today()).is_none());
        assert!(recomputed(&task("not-a-date", false, true), today()).is_none());
    }
}
