//! Query-string parameters shared by the list endpoints.

use std::collections::HashMap;

use chrono::NaiveDate;
use sprintboard_core::{AppConfig, PageError, PageRequest};
use sprintboard_domain::{SprintId, TaskStatus};

use crate::error::{ApiError, ApiResult, FieldErrors};

pub struct ListParams {
    raw: HashMap<String, String>,
    errors: FieldErrors,
}

impl ListParams {
    pub fn new(raw: HashMap<String, String>) -> Self {
        Self {
            raw,
            errors: FieldErrors::new(),
        }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.raw
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    fn reject(&mut self, key: &str, message: String) {
        self.errors.entry(key.to_string()).or_default().push(message);
    }

    pub fn search(&self) -> Option<&str> {
        self.get("search")
    }

    pub fn ordering(&self) -> Option<&str> {
        self.get("ordering")
    }

    /// `page` must be a positive integer; a malformed `page_size` falls
    /// back to the default.
    pub fn page_request(&self, config: &AppConfig) -> ApiResult<PageRequest> {
        let page = match self.get("page") {
            None => None,
            Some(raw) => Some(raw.parse::<usize>().map_err(|_| PageError::InvalidPage)?),
        };
        let page_size = self.get("page_size").and_then(|raw| raw.parse::<usize>().ok());
        Ok(PageRequest::from_params(
            page,
            page_size,
            config.effective_default_page_size(),
            config.effective_max_page_size(),
        )?)
    }

    pub fn date(&mut self, key: &str) -> Option<NaiveDate> {
        let raw = self.get(key)?.to_string();
        match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                self.reject(key, "Enter a valid date.".to_string());
                None
            }
        }
    }

    pub fn sprint_id(&mut self, key: &str) -> Option<SprintId> {
        let raw = self.get(key)?.to_string();
        match raw.parse::<SprintId>() {
            Ok(id) => Some(id),
            Err(_) => {
                self.reject(key, "Enter a whole number.".to_string());
                None
            }
        }
    }

    pub fn status(&mut self, key: &str) -> Option<TaskStatus> {
        let raw = self.get(key)?.to_string();
        match raw.parse::<TaskStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                self.reject(
                    key,
                    format!(
                        "Select a valid choice. {} is not one of the available choices.",
                        raw
                    ),
                );
                None
            }
        }
    }

    pub fn boolean(&mut self, key: &str) -> Option<bool> {
        let raw = self.get(key)?.to_ascii_lowercase();
        match raw.as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => {
                self.reject(key, "Enter a valid boolean.".to_string());
                None
            }
        }
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).map(ToString::to_string)
    }

    /// Fail with every filter problem found so far.
    pub fn finish(&mut self) -> ApiResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Invalid(std::mem::take(&mut self.errors)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ListParams {
        ListParams::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_page_defaults_and_caps() {
        let config = AppConfig::default();

        let request = params(&[]).page_request(&config).unwrap();
        assert_eq!((request.page, request.page_size), (1, 25));

        let request = params(&[("page", "2"), ("page_size", "500")])
            .page_request(&config)
            .unwrap();
        assert_eq!((request.page, request.page_size), (2, 100));

        let request = params(&[("page_size", "lots")]).page_request(&config).unwrap();
        assert_eq!(request.page_size, 25);
    }

    #[test]
    fn test_bad_page_is_not_found() {
        let config = AppConfig::default();
        assert!(matches!(
            params(&[("page", "abc")]).page_request(&config),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            params(&[("page", "0")]).page_request(&config),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_filter_errors_collected() {
        let mut p = params(&[("end_min", "soon"), ("status", "7"), ("backlog", "maybe")]);
        assert_eq!(p.date("end_min"), None);
        assert_eq!(p.status("status"), None);
        assert_eq!(p.boolean("backlog"), None);

        let Err(ApiError::Invalid(errors)) = p.finish() else {
            panic!("expected field errors");
        };
        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors["status"],
            vec!["Select a valid choice. 7 is not one of the available choices.".to_string()]
        );
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let mut p = params(&[("sprint", " "), ("search", "")]);
        assert_eq!(p.sprint_id("sprint"), None);
        assert_eq!(p.search(), None);
        assert!(p.finish().is_ok());
    }
}
