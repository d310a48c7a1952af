use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::{blog::Intersection, tasks::TaskFilter, theme::ThemePreference};

// Struct representing the request body for creating a new Book
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateBookSchema {
    pub title: Option<String>,
    pub author: Option<String>,
}

// Struct representing the request body for updating a Book; omitted fields keep their value
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateBookSchema {
    pub title: Option<String>,
    pub author: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskSchema {
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "deserialize_due_date")]
    pub due_date: Option<DateTime<Utc>>,
}

/// Accepts RFC 3339 or a `datetime-local` value (`2026-10-19T09:30`, read as UTC).
pub fn parse_due_date(raw: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(due) = DateTime::parse_from_rfc3339(raw) {
        return Ok(due.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| format!("invalid due date {raw:?}"))
}

// empty strings and null both mean no due date
fn deserialize_due_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => parse_due_date(raw).map(Some).map_err(de::Error::custom),
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderTasksSchema {
    pub dragged_id: i64,
    pub target_id: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskFilterOptions {
    #[serde(default)]
    pub filter: TaskFilter,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ThemeSchema {
    pub theme: ThemePreference,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ContactSchema {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EnhancePageSchema {
    pub html: String,
    /// Visibility reports for the page's reveal blocks, in arrival order.
    #[serde(default)]
    pub intersections: Vec<Intersection>,
    /// Millisecond timestamps of window resize events.
    #[serde(default)]
    pub resizes: Vec<u64>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn task(body: serde_json::Value) -> Result<CreateTaskSchema, serde_json::Error> {
        serde_json::from_value(body)
    }

    #[test]
    fn due_date_accepts_local_and_rfc3339() {
        let expected = Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap();

        let local = task(json!({"title": "x", "dueDate": "2026-10-19T09:30"})).unwrap();
        assert_eq!(local.due_date, Some(expected));

        let offset = task(json!({"title": "x", "dueDate": "2026-10-19T11:30:00+02:00"})).unwrap();
        assert_eq!(offset.due_date, Some(expected));
    }

    #[test]
    fn blank_due_date_is_none() {
        assert_eq!(task(json!({"title": "x", "dueDate": ""})).unwrap().due_date, None);
        assert_eq!(task(json!({"title": "x", "dueDate": null})).unwrap().due_date, None);
        assert_eq!(task(json!({"title": "x"})).unwrap().due_date, None);
    }

    #[test]
    fn garbage_due_date_is_rejected() {
        assert!(task(json!({"title": "x", "dueDate": "next tuesday"})).is_err());
    }
}
