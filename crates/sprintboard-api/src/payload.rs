//! Request body decoding.
//!
//! Bodies are read field by field from a JSON object so that every bad field
//! is reported at once, under its own name. Unknown and read-only fields are
//! ignored.

use chrono::NaiveDate;
use serde_json::{Map, Value};
use sprintboard_domain::sprint::NAME_MAX_LENGTH as SPRINT_NAME_MAX;
use sprintboard_domain::task::NAME_MAX_LENGTH as TASK_NAME_MAX;
use sprintboard_domain::validation::NON_FIELD_ERRORS;
use sprintboard_domain::{FieldUpdate, SprintId, SprintUpdate, TaskStatus, TaskUpdate};

use crate::error::{ApiError, ApiResult, FieldErrors};

pub const REQUIRED: &str = "This field is required.";
pub const NOT_NULL: &str = "This field may not be null.";
pub const NOT_BLANK: &str = "This field may not be blank.";
const BAD_DATE: &str = "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.";
const BAD_INTEGER: &str = "A valid integer is required.";

/// How much of a resource the body describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// POST: required fields must be present.
    Create,
    /// PUT: required fields must be present, others keep their values.
    Replace,
    /// PATCH: nothing is required.
    Partial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    Required,
    Optional,
    Nullable,
}

/// Name JSON values the way error messages refer to them.
fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

struct PayloadReader<'a> {
    fields: &'a Map<String, Value>,
    mode: WriteMode,
    errors: FieldErrors,
}

impl<'a> PayloadReader<'a> {
    fn new(body: &'a Value, mode: WriteMode) -> ApiResult<Self> {
        let Value::Object(fields) = body else {
            return Err(ApiError::invalid(
                NON_FIELD_ERRORS,
                format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    type_name(body)
                ),
            ));
        };
        Ok(Self {
            fields,
            mode,
            errors: FieldErrors::new(),
        })
    }

    fn reject(&mut self, name: &str, message: impl Into<String>) {
        self.errors
            .entry(name.to_string())
            .or_default()
            .push(message.into());
    }

    fn read<T>(
        &mut self,
        name: &str,
        presence: Presence,
        parse: impl FnOnce(&Value) -> Result<T, String>,
    ) -> FieldUpdate<T> {
        match self.fields.get(name) {
            None => {
                if presence == Presence::Required && self.mode != WriteMode::Partial {
                    self.reject(name, REQUIRED);
                }
                FieldUpdate::NoChange
            }
            Some(Value::Null) if presence == Presence::Nullable => FieldUpdate::Clear,
            Some(Value::Null) => {
                self.reject(name, NOT_NULL);
                FieldUpdate::NoChange
            }
            Some(value) => match parse(value) {
                Ok(parsed) => FieldUpdate::Set(parsed),
                Err(message) => {
                    self.reject(name, message);
                    FieldUpdate::NoChange
                }
            },
        }
    }

    /// Non-null value or nothing.
    fn value<T>(
        &mut self,
        name: &str,
        presence: Presence,
        parse: impl FnOnce(&Value) -> Result<T, String>,
    ) -> Option<T> {
        match self.read(name, presence, parse) {
            FieldUpdate::Set(value) => Some(value),
            _ => None,
        }
    }

    fn text(
        &mut self,
        name: &str,
        presence: Presence,
        allow_blank: bool,
        max_length: Option<usize>,
    ) -> Option<String> {
        self.value(name, presence, |value| {
            let text = match value {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                _ => return Err("Not a valid string.".to_string()),
            };
            if text.is_empty() && !allow_blank {
                return Err(NOT_BLANK.to_string());
            }
            if let Some(max) = max_length {
                if text.chars().count() > max {
                    return Err(format!(
                        "Ensure this field has no more than {} characters.",
                        max
                    ));
                }
            }
            Ok(text)
        })
    }

    fn date(&mut self, name: &str, presence: Presence) -> FieldUpdate<NaiveDate> {
        let nullable = presence == Presence::Nullable;
        match self.read(name, presence, |value| match value {
            Value::String(s) if s.trim().is_empty() && nullable => Ok(None),
            Value::String(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(Some)
                .map_err(|_| BAD_DATE.to_string()),
            _ => Err(BAD_DATE.to_string()),
        }) {
            FieldUpdate::Set(Some(date)) => FieldUpdate::Set(date),
            FieldUpdate::Set(None) | FieldUpdate::Clear => FieldUpdate::Clear,
            FieldUpdate::NoChange => FieldUpdate::NoChange,
        }
    }

    fn primary_key(&mut self, name: &str) -> FieldUpdate<SprintId> {
        self.read(name, Presence::Nullable, |value| {
            let parsed = match value {
                Value::Number(n) => n.as_i64(),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            };
            parsed.ok_or_else(|| {
                format!(
                    "Incorrect type. Expected pk value, received {}.",
                    type_name(value)
                )
            })
        })
    }

    fn small_integer(&mut self, name: &str) -> Option<i16> {
        self.value(name, Presence::Optional, |value| {
            let parsed = match value {
                Value::Number(n) => n
                    .as_i64()
                    .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
                Value::String(s) => s.trim().parse::<i64>().ok(),
                _ => None,
            }
            .ok_or_else(|| BAD_INTEGER.to_string())?;

            if parsed > i64::from(i16::MAX) {
                return Err(format!(
                    "Ensure this value is less than or equal to {}.",
                    i16::MAX
                ));
            }
            if parsed < i64::from(i16::MIN) {
                return Err(format!(
                    "Ensure this value is greater than or equal to {}.",
                    i16::MIN
                ));
            }
            Ok(parsed as i16)
        })
    }

    fn status(&mut self, name: &str) -> Option<TaskStatus> {
        self.value(name, Presence::Optional, |value| {
            let raw = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            raw.parse::<TaskStatus>().map_err(|e| e.to_string())
        })
    }

    fn slug(&mut self, name: &str) -> FieldUpdate<String> {
        self.read(name, Presence::Nullable, |value| match value {
            Value::String(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
            _ => Err("Invalid value.".to_string()),
        })
    }

    fn finish(self) -> ApiResult<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Invalid(self.errors))
        }
    }
}

/// Sprint fields supplied by a request.
pub fn sprint_update(body: &Value, mode: WriteMode) -> ApiResult<SprintUpdate> {
    let mut reader = PayloadReader::new(body, mode)?;
    let update = SprintUpdate {
        name: reader.text("name", Presence::Optional, true, Some(SPRINT_NAME_MAX)),
        description: reader.text("description", Presence::Optional, true, None),
        end: match reader.date("end", Presence::Required) {
            FieldUpdate::Set(end) => Some(end),
            _ => None,
        },
    };
    reader.finish()?;
    Ok(update)
}

/// Task fields supplied by a request. The assignee is still a username.
#[derive(Debug, Clone, Default)]
pub struct TaskInput {
    pub update: TaskUpdate,
    pub assigned: FieldUpdate<String>,
}

pub fn task_input(body: &Value, mode: WriteMode) -> ApiResult<TaskInput> {
    let mut reader = PayloadReader::new(body, mode)?;
    let update = TaskUpdate {
        name: reader.text("name", Presence::Required, false, Some(TASK_NAME_MAX)),
        description: reader.text("description", Presence::Optional, true, None),
        order: reader.small_integer("order"),
        status: reader.status("status"),
        sprint: reader.primary_key("sprint"),
        assigned: FieldUpdate::NoChange,
        started: reader.date("started", Presence::Nullable),
        due: reader.date("due", Presence::Nullable),
        completed: reader.date("completed", Presence::Nullable),
    };
    let assigned = reader.slug("assigned");
    reader.finish()?;
    Ok(TaskInput { update, assigned })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn field_errors(result: ApiResult<impl std::fmt::Debug>) -> FieldErrors {
        match result {
            Err(ApiError::Invalid(errors)) => errors,
            other => panic!("expected field errors, got {:?}", other),
        }
    }

    #[test]
    fn test_sprint_create_requires_end() {
        let errors = field_errors(sprint_update(&json!({"name": "S1"}), WriteMode::Create));
        assert_eq!(errors["end"], vec![REQUIRED.to_string()]);
    }

    #[test]
    fn test_sprint_patch_requires_nothing() {
        let update = sprint_update(&json!({"name": " Renamed "}), WriteMode::Partial).unwrap();
        assert_eq!(update.name.as_deref(), Some("Renamed"));
        assert!(update.end.is_none());
    }

    #[test]
    fn test_all_bad_fields_reported_together() {
        let body = json!({
            "name": "",
            "end": "next tuesday",
            "order": "x",
            "status": 9,
            "sprint": true,
        });
        let errors = field_errors(task_input(&body, WriteMode::Create));

        assert_eq!(errors["name"], vec![NOT_BLANK.to_string()]);
        assert_eq!(errors["order"], vec![BAD_INTEGER.to_string()]);
        assert_eq!(errors["status"], vec!["\"9\" is not a valid choice.".to_string()]);
        assert_eq!(
            errors["sprint"],
            vec!["Incorrect type. Expected pk value, received bool.".to_string()]
        );
        // `end` is not a task field.
        assert!(!errors.contains_key("end"));
    }

    #[test]
    fn test_null_clears_nullable_fields() {
        let body = json!({"sprint": null, "due": null, "assigned": null});
        let input = task_input(&body, WriteMode::Partial).unwrap();

        assert_eq!(input.update.sprint, FieldUpdate::Clear);
        assert_eq!(input.update.due, FieldUpdate::Clear);
        assert_eq!(input.assigned, FieldUpdate::Clear);
        assert_eq!(input.update.started, FieldUpdate::NoChange);
    }

    #[test]
    fn test_null_rejected_for_required_text() {
        let errors = field_errors(task_input(&json!({"name": null}), WriteMode::Partial));
        assert_eq!(errors["name"], vec![NOT_NULL.to_string()]);
    }

    #[test]
    fn test_name_length_limit() {
        let long = "x".repeat(101);
        let errors = field_errors(task_input(&json!({ "name": long }), WriteMode::Create));
        assert_eq!(
            errors["name"],
            vec!["Ensure this field has no more than 100 characters.".to_string()]
        );
    }

    #[test]
    fn test_order_range() {
        let errors = field_errors(task_input(
            &json!({"name": "a", "order": 40000}),
            WriteMode::Create,
        ));
        assert_eq!(
            errors["order"],
            vec!["Ensure this value is less than or equal to 32767.".to_string()]
        );
    }

    #[test]
    fn test_status_accepts_code_as_string_or_number() {
        let a = task_input(&json!({"name": "a", "status": "2"}), WriteMode::Create).unwrap();
        let b = task_input(&json!({"name": "a", "status": 2}), WriteMode::Create).unwrap();
        assert_eq!(a.update.status, Some(TaskStatus::InProgress));
        assert_eq!(b.update.status, Some(TaskStatus::InProgress));
    }

    #[test]
    fn test_body_must_be_object() {
        let errors = field_errors(task_input(&json!([1, 2]), WriteMode::Create));
        assert_eq!(
            errors[NON_FIELD_ERRORS],
            vec!["Invalid data. Expected a dictionary, but got list.".to_string()]
        );
    }
}
