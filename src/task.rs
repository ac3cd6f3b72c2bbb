//! The `tasks` entity and its date boundary.
//!
//! Due dates cross the store boundary as plain `yyyy-MM-dd` text, compared
//! with calendar-date semantics (no time of day). Parsing is fallible by
//! design: a task whose due-date text does not parse is left exactly as
//! stored — see [`Model::due_on`].

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Boundary format for due dates (`yyyy-MM-dd`).
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A task record. Immutable value snapshot; "mutation" means replacing the
/// stored record with a new snapshot via [`TaskStore::update`](crate::TaskStore::update).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    /// Store-assigned, unique. Ignored on insert.
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    /// Calendar date in [`DATE_FORMAT`].
    pub due_date: String,
    pub completed: bool,
    /// Derived from `completed` and `due_date`, but persisted. The presenter
    /// recomputes and writes it back on every reload.
    pub overdue: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Parse the due date, or `None` if the stored text is not a valid
    /// `yyyy-MM-dd` date.
    pub fn due_on(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.due_date, DATE_FORMAT).ok()
    }
}

/// Format a `yyyy-MM-dd` due date as `dd/MM/yyyy` for display.
///
/// Unparseable input is returned verbatim rather than erroring; the raw text
/// is still more useful to a reader than nothing.
pub fn display_date(iso: &str) -> String {
    match NaiveDate::parse_from_str(iso, DATE_FORMAT) {
        Ok(date) => date.format("%d/%m/%Y").to_string(),
        Err(_) => iso.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(due: &str) -> Model {
        Model {
            id: 1,
            title: "Buy milk".into(),
            description: None,
            due_date: due.into(),
            completed: false,
            overdue: false,
        }
    }

    #[test]
    fn test_due_on_parses_iso_date() {
        let due = task("2025-01-31").due_on();
        assert_eq!(due, NaiveDate::from_ymd_opt(2025, 1, 31));
    }

    #[test]
    fn test_due_on_rejects_garbage() {
        assert!(task("not-a-date").due_on().is_none());
        assert!(task("2025-13-01").due_on().is_none());
        assert!(task("").due_on().is_none());
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date("2025-01-31"), "31/01/2025");
        assert_eq!(display_date("not-a-date"), "not-a-date");
    }
}
