use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
        }
    }

    /// Parse a backend status label. Older backend revisions used
    /// "To Do" for Pending and one rendered labels lowercase, so the
    /// match is lenient; wire code maps unknown labels to Pending.
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "to do" | "todo" => Some(Self::Pending),
            "in progress" | "inprogress" => Some(Self::InProgress),
            "completed" | "done" => Some(Self::Completed),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Canonical backend identity (see `core::identity`). The only key
    /// store operations compare on.
    pub identity: String,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub reminder: Option<NaiveDateTime>,
    pub shared_with: Vec<String>,
    pub created: Option<NaiveDateTime>,
}

impl Task {
    pub fn new(identity: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            title: title.into(),
            description: None,
            due_date: None,
            status: TaskStatus::Pending,
            priority: Priority::Medium,
            reminder: None,
            shared_with: Vec::new(),
            created: None,
        }
    }

    /// Derived, never stored: due date set, strictly before today,
    /// and the task isn't completed.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        if self.status.is_completed() {
            return false;
        }
        self.due_date.is_some_and(|due| due < today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_roundtrip() {
        for status in [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed] {
            assert_eq!(TaskStatus::from_label(status.as_label()), Some(status));
        }
    }

    #[test]
    fn legacy_status_labels() {
        assert_eq!(TaskStatus::from_label("To Do"), Some(TaskStatus::Pending));
        assert_eq!(TaskStatus::from_label("ToDo"), Some(TaskStatus::Pending));
        assert_eq!(TaskStatus::from_label("completed"), Some(TaskStatus::Completed));
        assert_eq!(TaskStatus::from_label("Done"), Some(TaskStatus::Completed));
        assert_eq!(TaskStatus::from_label("nonsense"), None);
    }

    #[test]
    fn priority_defaults_to_medium() {
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(Priority::from_label("high"), Some(Priority::High));
        assert_eq!(Priority::from_label(""), None);
    }

    #[test]
    fn overdue_requires_past_due_and_not_completed() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let mut task = Task::new("a", "Pay rent");

        assert!(!task.is_overdue(today)); // no due date

        task.due_date = Some(NaiveDate::from_ymd_opt(2026, 3, 14).unwrap());
        assert!(task.is_overdue(today));

        task.due_date = Some(today);
        assert!(!task.is_overdue(today)); // due today is not overdue

        task.due_date = Some(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        task.status = TaskStatus::Completed;
        assert!(!task.is_overdue(today));
    }
}
