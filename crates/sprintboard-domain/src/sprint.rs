use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub type SprintId = i64;

pub const NAME_MAX_LENGTH: usize = 100;

/// Development iteration period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprint {
    pub id: SprintId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub end: NaiveDate,
}

impl Sprint {
    pub fn from_draft(id: SprintId, draft: SprintDraft) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            end: draft.end,
        }
    }

    pub fn draft(&self) -> SprintDraft {
        SprintDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            end: self.end,
        }
    }

    /// A sprint is past once its end date lies strictly before `today`.
    pub fn is_past(&self, today: NaiveDate) -> bool {
        self.end < today
    }
}

/// Sprint values that have not been given an identity yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SprintDraft {
    pub name: String,
    pub description: String,
    pub end: NaiveDate,
}

impl SprintDraft {
    pub fn new(end: NaiveDate) -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            end,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn apply(&mut self, updates: SprintUpdate) {
        if let Some(name) = updates.name {
            self.name = name;
        }
        if let Some(description) = updates.description {
            self.description = description;
        }
        if let Some(end) = updates.end {
            self.end = end;
        }
    }
}

/// Partial update struct for Sprint. None leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct SprintUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub end: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_draft_keeps_values_but_not_id() {
        let sprint = Sprint::from_draft(7, SprintDraft::new(date(2024, 3, 1)).with_name("Alpha"));
        let draft = sprint.draft();

        assert_eq!(draft.name, "Alpha");
        assert_eq!(draft.end, date(2024, 3, 1));
        assert_eq!(Sprint::from_draft(7, draft), sprint);
    }

    #[test]
    fn test_apply_partial_update() {
        let mut draft = SprintDraft::new(date(2024, 3, 1)).with_name("Alpha");
        draft.apply(SprintUpdate {
            description: Some("Polish".to_string()),
            ..Default::default()
        });

        assert_eq!(draft.name, "Alpha");
        assert_eq!(draft.description, "Polish");
        assert_eq!(draft.end, date(2024, 3, 1));
    }

    #[test]
    fn test_is_past_is_strict() {
        let sprint = Sprint::from_draft(1, SprintDraft::new(date(2024, 3, 1)));
        assert!(!sprint.is_past(date(2024, 3, 1)));
        assert!(sprint.is_past(date(2024, 3, 2)));
    }
}
