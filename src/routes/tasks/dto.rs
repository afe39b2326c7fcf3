use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{Task, TaskStatus};
use crate::error::{FieldError, ValidationError};

pub const TITLE_MAX_CHARS: usize = 255;

/// Task as sent by a client on create and update.
///
/// `id`, `createdAt` and `updatedAt` are accepted so a client can send back a
/// representation it received, but they are never applied.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRequest {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default, with = "wire_time::option")]
    pub due_date: Option<NaiveDateTime>,
    #[serde(default, with = "wire_time::option")]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default, with = "wire_time::option")]
    pub updated_at: Option<NaiveDateTime>,
}

impl TaskRequest {
    /// Request-shape checks: title present, not blank, at most 255 characters.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = Vec::new();

        match self.title.as_deref() {
            None => errors.push(FieldError::new("title", "Title is required")),
            Some(title) if title.trim().is_empty() => {
                errors.push(FieldError::new("title", "Title is required"))
            }
            Some(title) if title.chars().count() > TITLE_MAX_CHARS => errors.push(
                FieldError::new("title", "Title must be between 1 and 255 characters"),
            ),
            Some(_) => {}
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(errors))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(with = "wire_time::option")]
    pub due_date: Option<NaiveDateTime>,
    #[serde(with = "wire_time")]
    pub created_at: NaiveDateTime,
    #[serde(with = "wire_time")]
    pub updated_at: NaiveDateTime,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id(),
            title: task.title().to_string(),
            description: task.description().map(str::to_string),
            status: task.status(),
            due_date: task.due_date(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    pub status: Option<TaskStatus>,
}

/// Wire format for timestamps: `yyyy-MM-ddTHH:mm:ss.SSS`, no zone.
pub mod wire_time {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";
    // fractional seconds are optional on input
    const INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn parse(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        NaiveDateTime::parse_from_str(raw, INPUT_FORMAT)
    }

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(de::Error::custom)
    }

    pub mod option {
        use chrono::NaiveDateTime;
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match value {
                Some(value) => super::serialize(value, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| super::parse(&raw))
                .transpose()
                .map_err(de::Error::custom)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;
    use serde_json::json;

    fn request_with_title(title: Option<&str>) -> TaskRequest {
        TaskRequest {
            title: title.map(str::to_string),
            ..TaskRequest::default()
        }
    }

    #[rstest]
    #[case::single_char("a".to_string())]
    #[case::typical("Write report".to_string())]
    #[case::max_length("x".repeat(255))]
    #[case::multibyte_at_limit("é".repeat(255))]
    fn validate_accepts_titles_within_bounds(#[case] title: String) {
        assert!(request_with_title(Some(&title)).validate().is_ok());
    }

    #[rstest]
    #[case::missing(None)]
    #[case::empty(Some(String::new()))]
    #[case::blank(Some("   ".to_string()))]
    #[case::too_long(Some("x".repeat(256)))]
    fn validate_rejects_bad_titles(#[case] title: Option<String>) {
        let err = request_with_title(title.as_deref())
            .validate()
            .expect_err("title should be rejected");

        assert_eq!(err.errors.len(), 1);
        assert_eq!(err.errors[0].field, "title");
    }

    #[test]
    fn request_parses_without_server_assigned_fields() {
        let request: TaskRequest = serde_json::from_value(json!({
            "title": "Write report",
            "dueDate": "2024-06-30T17:00:00.000"
        }))
        .unwrap();

        assert_eq!(request.id, None);
        assert_eq!(request.status, None);
        assert_eq!(request.created_at, None);
        assert_eq!(
            request.due_date,
            NaiveDate::from_ymd_opt(2024, 6, 30)
                .unwrap()
                .and_hms_opt(17, 0, 0)
        );
    }

    #[test]
    fn request_due_date_accepts_missing_fraction() {
        let request: TaskRequest =
            serde_json::from_value(json!({"title": "t", "dueDate": "2024-06-30T17:00:00"}))
                .unwrap();

        assert!(request.due_date.is_some());
    }

    #[rstest]
    #[case::unknown_status(json!({"title": "t", "status": "DONE"}))]
    #[case::date_only(json!({"title": "t", "dueDate": "2024-06-30"}))]
    #[case::bad_id(json!({"title": "t", "id": "not-a-uuid"}))]
    fn request_rejects_malformed_fields(#[case] body: serde_json::Value) {
        assert!(serde_json::from_value::<TaskRequest>(body).is_err());
    }

    #[test]
    fn response_serializes_camel_case_with_millisecond_timestamps() {
        let created = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_milli_opt(9, 30, 0, 0)
            .unwrap();
        let task = Task::new("Write report".into(), None, None, created);
        let id = task.id();

        let body = serde_json::to_value(TaskResponse::from(task)).unwrap();

        assert_eq!(
            body,
            json!({
                "id": id.to_string(),
                "title": "Write report",
                "description": null,
                "status": "TODO",
                "dueDate": null,
                "createdAt": "2024-05-01T09:30:00.000",
                "updatedAt": "2024-05-01T09:30:00.000"
            })
        );
    }
}
