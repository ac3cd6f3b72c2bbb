use thiserror::Error;

/// Errors surfaced by a [`TaskStore`](crate::TaskStore) implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Db(#[from] sea_orm::DbErr),

    #[error("Task with id {0} not found")]
    NotFound(i32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StoreError::NotFound(42);
        assert_eq!(err.to_string(), "Task with id 42 not found");
    }
}
