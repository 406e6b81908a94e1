use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::id;

use super::{comment::Comment, null_as_default, student::StudentId, tag::NewTag, tag::Tag};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    pub id: WorkId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub file_url: Option<String>,
    /// Raw timestamp as sent by the API, see [`Work::submitted_at`].
    #[serde(default, rename = "submittedAt")]
    pub submitted_at_raw: Option<String>,
    #[serde(default)]
    pub student_id: Option<StudentId>,
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub student_email: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<Tag>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub rating_count: Option<u64>,
}

impl Work {
    /// Parses the submission timestamp. Returns `None` when the timestamp is
    /// missing or malformed, such works are not comparable by date.
    pub fn submitted_at(&self) -> Option<NaiveDateTime> {
        parse_timestamp(self.submitted_at_raw.as_deref()?)
    }

    pub fn author(&self) -> &str {
        self.student_name.as_deref().unwrap_or_default()
    }

    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(|tag| tag.name.as_str())
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tag_names().any(|tag| tag == name)
    }
}

pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return Some(timestamp.naive_utc());
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Payload for creating or updating a work.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkRequest {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub file_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub student_id: Option<StudentId>,
    #[serde(default)]
    pub tags: Vec<NewTag>,
}

impl WorkRequest {
    /// Merges the populated fields of `other` into this request, keeping the
    /// existing values where `other` is empty.
    pub fn update(&mut self, other: WorkRequest) {
        if !other.title.is_empty() {
            self.title = other.title;
        }
        if let Some(description) = other.description {
            self.description = Some(description);
        }
        if !other.file_url.is_empty() {
            self.file_url = other.file_url;
        }
        if let Some(student_id) = other.student_id {
            self.student_id = Some(student_id);
        }
        if !other.tags.is_empty() {
            self.tags = other.tags;
        }
    }
}

impl From<&Work> for WorkRequest {
    fn from(work: &Work) -> Self {
        Self {
            title: work.title.clone(),
            description: work.description.clone(),
            file_url: work.file_url.clone().unwrap_or_default(),
            student_id: work.student_id,
            tags: work.tags.iter().map(|tag| NewTag::new(&tag.name)).collect(),
        }
    }
}

id!(Work);

#[cfg(test)]
mod tests {
    use super::{parse_timestamp, Work};

    #[test]
    fn test_deserialize_api_work() {
        let work: Work = serde_json::from_str(
            r#"{
                "id": 3,
                "title": "Thesis",
                "description": null,
                "fileUrl": "https://files.example/thesis.pdf",
                "submittedAt": "2024-05-01T10:15:30.123",
                "studentId": 9,
                "studentName": "Jana",
                "studentEmail": "jana@example.com",
                "comments": null,
                "tags": [{"id": 1, "name": "math"}]
            }"#,
        )
        .unwrap();

        assert_eq!(work.author(), "Jana");
        assert!(work.comments.is_empty());
        assert!(work.has_tag("math"));
        assert!(work.submitted_at().is_some());
        assert_eq!(work.average_rating, None);
    }

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp("2024-05-01T10:15:30").is_some());
        assert!(parse_timestamp("2024-05-01T10:15:30Z").is_some());
        assert!(parse_timestamp("2024-05-01T10:15:30+02:00").is_some());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_parse_date_only_and_space_separated_timestamps() {
        let midnight = parse_timestamp("2024-05-01").unwrap();
        let morning = parse_timestamp("2024-05-01 10:00:00").unwrap();

        assert_eq!(midnight.to_string(), "2024-05-01 00:00:00");
        assert_eq!(morning.to_string(), "2024-05-01 10:00:00");
        assert!(morning > midnight);
        assert!(parse_timestamp("2024-05-01 10:00").is_some());
    }
}
