//! Record ordering.
//!
//! Parses `ordering` expressions such as `-order,name` into a list of sort
//! keys and applies them as a stable multi-key sort. Unknown field names are
//! dropped rather than rejected.

use std::borrow::Borrow;
use std::cmp::Ordering;

use crate::{Sprint, Task, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// A field a record type can be ordered by.
pub trait SortKey: Copy {
    type Item;

    fn parse(name: &str) -> Option<Self>;
    fn compare(&self, a: &Self::Item, b: &Self::Item) -> Ordering;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskSortField {
    Id,
    Name,
    Order,
    Started,
    Due,
    Completed,
}

impl SortKey for TaskSortField {
    type Item = Task;

    fn parse(name: &str) -> Option<Self> {
        match name {
            "name" => Some(Self::Name),
            "order" => Some(Self::Order),
            "started" => Some(Self::Started),
            "due" => Some(Self::Due),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }

    fn compare(&self, a: &Task, b: &Task) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::Name => a.name.cmp(&b.name),
            Self::Order => a.order.cmp(&b.order),
            Self::Started => a.started.cmp(&b.started),
            Self::Due => a.due.cmp(&b.due),
            Self::Completed => a.completed.cmp(&b.completed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SprintSortField {
    Id,
    End,
    Name,
}

impl SortKey for SprintSortField {
    type Item = Sprint;

    fn parse(name: &str) -> Option<Self> {
        match name {
            "end" => Some(Self::End),
            "name" => Some(Self::Name),
            _ => None,
        }
    }

    fn compare(&self, a: &Sprint, b: &Sprint) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::End => a.end.cmp(&b.end),
            Self::Name => a.name.cmp(&b.name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSortField {
    Username,
}

impl SortKey for UserSortField {
    type Item = User;

    fn parse(_name: &str) -> Option<Self> {
        // Users are always listed by username.
        None
    }

    fn compare(&self, a: &User, b: &User) -> Ordering {
        match self {
            Self::Username => a.username.cmp(&b.username),
        }
    }
}

/// Ordered list of sort keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingSpec<K> {
    keys: Vec<(K, SortOrder)>,
}

impl<K> OrderingSpec<K> {
    pub fn by(key: K, order: SortOrder) -> Self {
        Self {
            keys: vec![(key, order)],
        }
    }

    pub fn then(mut self, key: K, order: SortOrder) -> Self {
        self.keys.push((key, order));
        self
    }

    pub fn keys(&self) -> &[(K, SortOrder)] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<K: SortKey> OrderingSpec<K> {
    /// Parse `a,-b` into keys, falling back to `default` when nothing valid
    /// is left.
    pub fn parse(expr: Option<&str>, default: Self) -> Self {
        let keys: Vec<(K, SortOrder)> = expr
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter_map(|term| {
                let (name, order) = match term.strip_prefix('-') {
                    Some(name) => (name, SortOrder::Descending),
                    None => (term, SortOrder::Ascending),
                };
                K::parse(name).map(|key| (key, order))
            })
            .collect();

        if keys.is_empty() {
            default
        } else {
            Self { keys }
        }
    }

    /// Sort a slice in place. Works with both `&T` and `T` elements.
    pub fn sort<R: Borrow<K::Item>>(&self, items: &mut [R]) {
        items.sort_by(|a, b| self.compare(a.borrow(), b.borrow()));
    }

    fn compare(&self, a: &K::Item, b: &K::Item) -> Ordering {
        self.keys
            .iter()
            .map(|(key, order)| {
                let cmp = key.compare(a, b);
                match order {
                    SortOrder::Ascending => cmp,
                    SortOrder::Descending => cmp.reverse(),
                }
            })
            .find(|cmp| cmp.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TaskDraft;
    use chrono::NaiveDate;

    fn task(id: i64, name: &str, order: i16) -> Task {
        let mut draft = TaskDraft::new(name);
        draft.order = order;
        Task::from_draft(id, draft)
    }

    fn default_spec() -> OrderingSpec<TaskSortField> {
        OrderingSpec::by(TaskSortField::Id, SortOrder::Ascending)
    }

    #[test]
    fn test_parse_mixed_directions() {
        let spec = OrderingSpec::<TaskSortField>::parse(Some("-order, name"), default_spec());
        assert_eq!(
            spec.keys(),
            &[
                (TaskSortField::Order, SortOrder::Descending),
                (TaskSortField::Name, SortOrder::Ascending)
            ]
        );
    }

    #[test]
    fn test_unknown_fields_fall_back_to_default() {
        let spec =
            OrderingSpec::<TaskSortField>::parse(Some("priority,-id"), default_spec());
        assert_eq!(spec, default_spec());

        let spec = OrderingSpec::<TaskSortField>::parse(None, default_spec());
        assert_eq!(spec, default_spec());
    }

    #[test]
    fn test_multi_key_sort() {
        let mut tasks = vec![task(1, "b", 1), task(2, "a", 1), task(3, "c", 5)];
        let spec = OrderingSpec::by(TaskSortField::Order, SortOrder::Descending)
            .then(TaskSortField::Name, SortOrder::Ascending);
        spec.sort(&mut tasks);

        let ids: Vec<_> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_missing_dates_sort_first() {
        let mut with_due = task(1, "x", 0);
        with_due.due = NaiveDate::from_ymd_opt(2024, 1, 1);
        let without_due = task(2, "y", 0);

        let mut tasks = vec![&with_due, &without_due];
        OrderingSpec::by(TaskSortField::Due, SortOrder::Ascending).sort(&mut tasks);
        assert_eq!(tasks[0].id, 2);
    }

    #[test]
    fn test_sprint_sort_by_end() {
        let early = Sprint::from_draft(
            2,
            crate::SprintDraft::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
        );
        let late = Sprint::from_draft(
            1,
            crate::SprintDraft::new(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()),
        );
        let mut sprints = vec![late, early];
        OrderingSpec::by(SprintSortField::End, SortOrder::Ascending).sort(&mut sprints);
        assert_eq!(sprints[0].id, 2);
    }
}
