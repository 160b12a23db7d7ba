use chrono::NaiveDate;

use super::task::{Task, TaskStatus};

/// Aggregate counts over the task list. `pending` here means "not
/// completed", matching the dashboard cards, so pending + completed
/// always equals total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub overdue: usize,
}

/// Tasks partitioned by status, relative order preserved per group.
#[derive(Debug, Clone, Default)]
pub struct StatusGroups {
    pub pending: Vec<Task>,
    pub in_progress: Vec<Task>,
    pub completed: Vec<Task>,
}

/// In-memory ordered collection of the signed-in user's tasks.
///
/// A cache of the backend, not a source of truth: callers feed it the
/// server's returned representations after every round trip. All
/// derived views are recomputed on demand from the list. Lookups are
/// linear; the list is small.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, identity: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.identity == identity)
    }

    /// Replace the whole list, e.g. after a fresh fetch.
    pub fn replace_all(&mut self, tasks: Vec<Task>) {
        self.tasks = tasks;
    }

    /// Add a task. If a task with the same identity is already present
    /// it is replaced in place instead of appended, so the store never
    /// holds two tasks under one identity.
    pub fn add(&mut self, task: Task) {
        if !self.replace_by_identity(task.clone()) {
            self.tasks.push(task);
        }
    }

    /// Replace the task with the same identity in place, preserving
    /// list order. Returns false (silent no-op) if no task matches.
    pub fn replace_by_identity(&mut self, updated: Task) -> bool {
        match self.tasks.iter_mut().find(|t| t.identity == updated.identity) {
            Some(slot) => {
                *slot = updated;
                true
            }
            None => false,
        }
    }

    /// Remove the task with the given identity. Returns false if
    /// absent, so a repeated remove is a harmless no-op.
    pub fn remove_by_identity(&mut self, identity: &str) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.identity != identity);
        self.tasks.len() != before
    }

    pub fn group_by_status(&self) -> StatusGroups {
        let mut groups = StatusGroups::default();
        for task in &self.tasks {
            match task.status {
                TaskStatus::Pending => groups.pending.push(task.clone()),
                TaskStatus::InProgress => groups.in_progress.push(task.clone()),
                TaskStatus::Completed => groups.completed.push(task.clone()),
            }
        }
        groups
    }

    pub fn overdue(&self, today: NaiveDate) -> Vec<&Task> {
        self.tasks.iter().filter(|t| t.is_overdue(today)).collect()
    }

    pub fn stats(&self, today: NaiveDate) -> TaskStats {
        let total = self.tasks.len();
        let completed = self.tasks.iter().filter(|t| t.status.is_completed()).count();
        let overdue = self.tasks.iter().filter(|t| t.is_overdue(today)).count();
        TaskStats {
            total,
            pending: total - completed,
            completed,
            overdue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::task::Priority;

    fn task(id: &str, title: &str) -> Task {
        Task::new(id, title)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 15).unwrap()
    }

    #[test]
    fn add_replaces_on_duplicate_identity() {
        let mut store = TaskStore::new();
        store.add(task("a", "First"));
        store.add(task("b", "Second"));

        let mut dup = task("a", "First, renamed");
        dup.priority = Priority::High;
        store.add(dup);

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a").unwrap().title, "First, renamed");
        // Order preserved: "a" still first
        assert_eq!(store.tasks()[0].identity, "a");
    }

    #[test]
    fn replace_preserves_length_and_order() {
        let mut store = TaskStore::new();
        store.add(task("a", "A"));
        store.add(task("b", "B"));
        store.add(task("c", "C"));

        assert!(store.replace_by_identity(task("b", "B updated")));

        let ids: Vec<&str> = store.tasks().iter().map(|t| t.identity.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(store.get("b").unwrap().title, "B updated");
    }

    #[test]
    fn replace_missing_is_silent_noop() {
        let mut store = TaskStore::new();
        store.add(task("a", "A"));
        assert!(!store.replace_by_identity(task("zz", "ghost")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_twice_is_noop_second_time() {
        let mut store = TaskStore::new();
        store.add(task("a", "A"));
        store.add(task("b", "B"));

        assert!(store.remove_by_identity("a"));
        assert!(!store.remove_by_identity("a"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.tasks()[0].identity, "b");
    }

    #[test]
    fn groups_preserve_relative_order() {
        let mut store = TaskStore::new();
        let mut t1 = task("1", "one");
        t1.status = TaskStatus::Completed;
        let t2 = task("2", "two");
        let mut t3 = task("3", "three");
        t3.status = TaskStatus::Completed;
        let t4 = task("4", "four");
        for t in [t1, t2, t3, t4] {
            store.add(t);
        }

        let groups = store.group_by_status();
        let done: Vec<&str> = groups.completed.iter().map(|t| t.identity.as_str()).collect();
        let open: Vec<&str> = groups.pending.iter().map(|t| t.identity.as_str()).collect();
        assert_eq!(done, ["1", "3"]);
        assert_eq!(open, ["2", "4"]);
        assert!(groups.in_progress.is_empty());
    }

    #[test]
    fn stats_pending_plus_completed_is_total() {
        let mut store = TaskStore::new();
        let mut a = task("a", "overdue one");
        a.due_date = Some(NaiveDate::from_ymd_opt(2026, 3, 14).unwrap());
        let mut b = task("b", "done, past due");
        b.due_date = Some(NaiveDate::from_ymd_opt(2026, 3, 16).unwrap());
        b.status = TaskStatus::Completed;
        store.add(a);
        store.add(b);

        let stats = store.stats(today());
        assert_eq!(
            stats,
            TaskStats { total: 2, pending: 1, completed: 1, overdue: 1 }
        );
        assert_eq!(stats.pending + stats.completed, stats.total);
    }

    #[test]
    fn overdue_never_counts_completed() {
        let mut store = TaskStore::new();
        let mut t = task("a", "late but done");
        t.due_date = Some(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        t.status = TaskStatus::Completed;
        store.add(t);

        assert_eq!(store.stats(today()).overdue, 0);
        assert!(store.overdue(today()).is_empty());
    }
}
