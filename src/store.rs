//! The task store: point CRUD operations plus a live change feed.
//!
//! [`TaskStore`] is the contract the presenter consumes. Every successful
//! write emits a [`ChangeNotification`] on a broadcast channel, so a consumer
//! holding a [`change_rx()`](TaskStore::change_rx) receiver can re-query the
//! table after each mutation. The feed plus a fresh `all()` per notification
//! is the live "all current tasks" sequence.
//!
//! [`SqliteTaskStore`] is the bundled implementation: a SeaORM SQLite
//! connection that creates the `tasks` table on open.

use async_trait::async_trait;
use sea_orm::sea_query::SqliteQueryBuilder;
use sea_orm::{
    ActiveModelTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr,
    EntityTrait, QueryOrder, Schema,
    ActiveValue::{NotSet, Set},
};
use tokio::sync::broadcast;

use crate::error::StoreError;
use crate::task;

/// What kind of write a [`ChangeNotification`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Insert,
    Update,
    Delete,
}

/// Lightweight event emitted after every successful write.
///
/// Carries no row data; consumers re-query the store for the current state.
#[derive(Debug, Clone)]
pub struct ChangeNotification {
    pub kind: WriteKind,
    pub task_id: i32,
}

/// Persistence contract for tasks.
///
/// All write operations are single atomic point operations, and each one is
/// followed by a [`ChangeNotification`] on the channel behind
/// [`change_rx()`](TaskStore::change_rx): a write is always followed by a
/// fresh emission.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// All current tasks, ordered by id.
    async fn all(&self) -> Result<Vec<task::Model>, StoreError>;

    /// Point lookup by id.
    async fn get_by_id(&self, id: i32) -> Result<Option<task::Model>, StoreError>;

    /// Insert a task. The `id` field of the argument is ignored; the store
    /// assigns one and returns the stored snapshot.
    async fn insert(&self, task: task::Model) -> Result<task::Model, StoreError>;

    /// Replace the stored record with the given snapshot.
    ///
    /// Returns [`StoreError::NotFound`] if no record with that id exists.
    async fn update(&self, task: task::Model) -> Result<task::Model, StoreError>;

    /// Remove a task. Deleting an already-absent task is not an error.
    async fn delete(&self, task: &task::Model) -> Result<(), StoreError>;

    /// Subscribe to the change feed.
    fn change_rx(&self) -> broadcast::Receiver<ChangeNotification>;
}

/// SQLite-backed [`TaskStore`] over a SeaORM connection.
pub struct SqliteTaskStore {
    db: DatabaseConnection,
    change_tx: broadcast::Sender<ChangeNotification>,
}

impl SqliteTaskStore {
    /// Connect to `url` (e.g. `sqlite://tasks.db?mode=rwc` or
    /// `sqlite::memory:`) and create the `tasks` table if it does not exist.
    pub async fn open(url: &str) -> Result<Self, StoreError> {
        let opts = ConnectOptions::new(url);
        let db = Database::connect(opts).await?;

        let backend = db.get_database_backend();
        let schema = Schema::new(backend);
        let create_stmt = schema
            .create_table_from_entity(task::Entity)
            .if_not_exists()
            .to_owned();
        db.execute_unprepared(&create_stmt.to_string(SqliteQueryBuilder))
            .await?;

        let (change_tx, _) = broadcast::channel(256);
        Ok(Self { db, change_tx })
    }

    fn notify(&self, kind: WriteKind, task_id: i32) {
        // Send fails only when nobody is subscribed, which is fine.
        let _ = self.change_tx.send(ChangeNotification { kind, task_id });
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn all(&self) -> Result<Vec<task::Model>, StoreError> {
        let tasks = task::Entity::find()
            .order_by_asc(task::Column::Id)
            .all(&self.db)
            .await?;
        Ok(tasks)
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<task::Model>, StoreError> {
        let found = task::Entity::find_by_id(id).one(&self.db).await?;
        Ok(found)
    }

    async fn insert(&self, task: task::Model) -> Result<task::Model, StoreError> {
        let active = task::ActiveModel {
            id: NotSet,
            title: Set(task.title),
            description: Set(task.description),
            due_date: Set(task.due_date),
            completed: Set(task.completed),
            overdue: Set(task.overdue),
        };
        let stored = active.insert(&self.db).await?;
        self.notify(WriteKind::Insert, stored.id);
        Ok(stored)
    }

    async fn update(&self, task: task::Model) -> Result<task::Model, StoreError> {
        let id = task.id;
        let active = task::ActiveModel {
            id: Set(task.id),
            title: Set(task.title),
            description: Set(task.description),
            due_date: Set(task.due_date),
            completed: Set(task.completed),
            overdue: Set(task.overdue),
        };
        let stored = active.update(&self.db).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => StoreError::NotFound(id),
            other => StoreError::Db(other),
        })?;
        self.notify(WriteKind::Update, id);
        Ok(stored)
    }

    async fn delete(&self, task: &task::Model) -> Result<(), StoreError> {
        let result = task::Entity::delete_by_id(task.id).exec(&self.db).await?;
        if result.rows_affected > 0 {
            self.notify(WriteKind::Delete, task.id);
        }
        Ok(())
    }

    fn change_rx(&self) -> broadcast::Receiver<ChangeNotification> {
        self.change_tx.subscribe()
    }
}
