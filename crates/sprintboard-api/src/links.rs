//! Hyperlinks embedded in representations.
//!
//! Links are absolute when a base is known: the configured public URL wins,
//! then the request's `Host` header. Without either they are relative.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::HOST;
use axum::http::request::Parts;
use axum::http::Uri;
use sprintboard_domain::{SprintId, TaskId};

use crate::AppState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Links {
    base: String,
}

impl Links {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn relative() -> Self {
        Self::new("")
    }

    pub fn sprints(&self) -> String {
        format!("{}/api/sprints/", self.base)
    }

    pub fn sprint(&self, id: SprintId) -> String {
        format!("{}/api/sprints/{}/", self.base, id)
    }

    pub fn tasks(&self) -> String {
        format!("{}/api/tasks/", self.base)
    }

    pub fn tasks_in_sprint(&self, id: SprintId) -> String {
        format!("{}?sprint={}", self.tasks(), id)
    }

    pub fn task(&self, id: TaskId) -> String {
        format!("{}/api/tasks/{}/", self.base, id)
    }

    pub fn users(&self) -> String {
        format!("{}/api/users/", self.base)
    }

    pub fn user(&self, username: &str) -> String {
        format!("{}/api/users/{}/", self.base, username)
    }

    /// The current request's URL pointed at another page.
    ///
    /// Other query parameters are kept in place. Page 1 drops the `page`
    /// parameter instead of spelling it out.
    pub fn page(&self, uri: &Uri, page: usize) -> String {
        let mut pairs: Vec<String> = uri
            .query()
            .unwrap_or_default()
            .split('&')
            .filter(|pair| !pair.is_empty())
            .filter(|pair| pair.split('=').next() != Some("page"))
            .map(ToString::to_string)
            .collect();
        if page > 1 {
            pairs.push(format!("page={}", page));
        }

        let mut url = format!("{}{}", self.base, uri.path());
        if !pairs.is_empty() {
            url.push('?');
            url.push_str(&pairs.join("&"));
        }
        url
    }
}

impl FromRequestParts<AppState> for Links {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(public_url) = state.config.public_url.as_deref() {
            return Ok(Self::new(public_url));
        }
        let host = parts
            .headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty());
        Ok(match host {
            Some(host) => Self::new(format!("http://{}", host)),
            None => Self::relative(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_links() {
        let links = Links::new("https://board.example.com/");
        assert_eq!(links.sprint(3), "https://board.example.com/api/sprints/3/");
        assert_eq!(
            links.tasks_in_sprint(3),
            "https://board.example.com/api/tasks/?sprint=3"
        );
        assert_eq!(links.user("alice"), "https://board.example.com/api/users/alice/");
        assert_eq!(Links::relative().task(9), "/api/tasks/9/");
    }

    #[test]
    fn test_page_links_keep_other_params() {
        let links = Links::new("http://localhost");
        let uri: Uri = "/api/tasks/?search=bug&page=2&ordering=-due".parse().unwrap();

        assert_eq!(
            links.page(&uri, 3),
            "http://localhost/api/tasks/?search=bug&ordering=-due&page=3"
        );
        assert_eq!(
            links.page(&uri, 1),
            "http://localhost/api/tasks/?search=bug&ordering=-due"
        );
    }

    #[test]
    fn test_page_link_without_query() {
        let links = Links::relative();
        let uri: Uri = "/api/sprints/".parse().unwrap();
        assert_eq!(links.page(&uri, 2), "/api/sprints/?page=2");
        assert_eq!(links.page(&uri, 1), "/api/sprints/");
    }
}
