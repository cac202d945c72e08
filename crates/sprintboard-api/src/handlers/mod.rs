pub mod root;
pub mod sprints;
pub mod tasks;
pub mod users;

use crate::error::{ApiError, ApiResult};

/// Numeric path ids; anything else names no resource.
pub(crate) fn parse_id(raw: &str) -> ApiResult<i64> {
    raw.parse::<i64>().map_err(|_| ApiError::not_found())
}
