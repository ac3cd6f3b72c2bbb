//! # duetrack
//!
//! Reactive task-tracking core: a SQLite task store with a live change feed,
//! and a presenter that derives per-task overdue status and publishes a
//! renderable view.
//!
//! [`SqliteTaskStore`] persists tasks via SeaORM and broadcasts a
//! [`ChangeNotification`] after every write. [`TaskPresenter`] follows that
//! feed: each notification triggers a re-read of the list, the overdue flag
//! of every task is recomputed against the current date (`overdue ==
//! !completed && due < today`, corrections written back), and the result is
//! published as a [`TaskView`] on a watch channel. A rendering layer splits a
//! `Success` list into pending / overdue / completed sections with
//! [`TaskBuckets::partition`].
//!
//! ## Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use duetrack::{SqliteTaskStore, TaskPresenter, TaskView, task};
//!
//! let store = Arc::new(SqliteTaskStore::open("sqlite://tasks.db?mode=rwc").await?);
//! let presenter = TaskPresenter::new(store);
//! let mut view = presenter.view_rx();
//!
//! presenter.add(task::Model {
//!     id: 0, // assigned by the store
//!     title: "Buy milk".into(),
//!     description: None,
//!     due_date: "2025-06-01".into(),
//!     completed: false,
//!     overdue: false,
//! }).await;
//!
//! view.changed().await?;
//! if let TaskView::Success(tasks) = &*view.borrow() {
//!     println!("{} tasks", tasks.len());
//! }
//! ```
//!
//! ## Key types
//!
//! - [`TaskStore`] — persistence contract: point CRUD plus the change feed
//! - [`SqliteTaskStore`] — the bundled SeaORM/SQLite implementation
//! - [`TaskPresenter`] — subscription loop, overdue correction, commands
//! - [`TaskView`] — the published Loading / Success / Error value
//! - [`TaskBuckets`] — three-way display partition of a `Success` list

pub mod error;
pub mod presenter;
pub mod store;
pub mod task;
pub mod view;

pub use error::StoreError;
pub use presenter::{TaskPresenter, TaskPresenterBuilder};
pub use store::{ChangeNotification, SqliteTaskStore, TaskStore, WriteKind};
pub use view::{TaskBuckets, TaskView};

// Re-export for users of the library
pub use sea_orm;
