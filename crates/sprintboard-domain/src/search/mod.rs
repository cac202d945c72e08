//! Free-text search.
//!
//! A query is split on whitespace; a record matches when every term is a
//! case-insensitive substring of at least one of its searchable fields.

use crate::{Sprint, Task, User};

/// Records that expose text fields to search.
pub trait Searchable {
    fn search_fields(&self) -> Vec<&str>;
}

impl Searchable for Sprint {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name]
    }
}

impl Searchable for Task {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.description]
    }
}

impl Searchable for User {
    fn search_fields(&self) -> Vec<&str> {
        vec![&self.username]
    }
}

pub struct TextSearcher {
    terms: Vec<String>,
}

impl TextSearcher {
    /// Create a new searcher with the given query.
    pub fn new(query: &str) -> Self {
        Self {
            terms: query
                .split_whitespace()
                .map(|term| term.to_lowercase())
                .collect(),
        }
    }

    /// Get the normalised search terms.
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn matches<T: Searchable>(&self, item: &T) -> bool {
        if self.terms.is_empty() {
            return true;
        }
        let fields: Vec<String> = item
            .search_fields()
            .into_iter()
            .map(str::to_lowercase)
            .collect();
        self.terms
            .iter()
            .all(|term| fields.iter().any(|field| field.contains(term.as_str())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TaskDraft;

    fn task(name: &str, description: &str) -> Task {
        let mut draft = TaskDraft::new(name);
        draft.description = description.to_string();
        Task::from_draft(1, draft)
    }

    #[test]
    fn test_case_insensitive_name_match() {
        let t = task("Fix authentication bug", "");

        assert!(TextSearcher::new("auth").matches(&t));
        assert!(TextSearcher::new("AUTH").matches(&t));
        assert!(!TextSearcher::new("database").matches(&t));
    }

    #[test]
    fn test_description_is_searched() {
        let t = task("Cleanup", "Drop the legacy importer");
        assert!(TextSearcher::new("importer").matches(&t));
    }

    #[test]
    fn test_every_term_must_match_some_field() {
        let t = task("Login page", "Needs a redesign");

        assert!(TextSearcher::new("login redesign").matches(&t));
        assert!(!TextSearcher::new("login signup").matches(&t));
    }

    #[test]
    fn test_empty_query_matches_all() {
        let t = task("Anything", "");
        let searcher = TextSearcher::new("   ");
        assert!(searcher.terms().is_empty());
        assert!(searcher.matches(&t));
    }
}
