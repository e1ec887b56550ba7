//! # Case Records
//!
//! The input to a report: one parent issue and its subtasks, each with its
//! comments and field-change activity already fetched and flattened to plain
//! text. Field names follow the JSON the issue transformer emits
//! (`resolutiondate`, `type`, `fromString`, `toString`).

pub mod dates;

use serde::{Deserialize, Serialize};

use crate::error::DossierError;

/// The person an issue is assigned to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignee {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// One comment on an issue.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    /// Plain text body.
    #[serde(default)]
    pub body: String,
}

/// One field change from an issue's changelog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityItem {
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub field: String,
    #[serde(default, rename = "fromString")]
    pub from_value: String,
    #[serde(default, rename = "toString")]
    pub to_value: String,
}

/// A parent issue or one of its subtasks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub key: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default, rename = "type")]
    pub issue_type: Option<String>,
    #[serde(default)]
    pub assignee: Option<Assignee>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default, rename = "resolutiondate")]
    pub resolution_date: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub activity: Vec<ActivityItem>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

impl CaseRecord {
    pub fn assignee_name(&self) -> &str {
        non_empty(self.assignee.as_ref().and_then(|a| a.name.as_deref())).unwrap_or("Unassigned")
    }

    pub fn status_label(&self) -> &str {
        non_empty(self.status.as_deref()).unwrap_or("N/A")
    }

    pub fn priority_label(&self) -> &str {
        non_empty(self.priority.as_deref()).unwrap_or("None")
    }

    pub fn type_label(&self) -> &str {
        non_empty(self.issue_type.as_deref()).unwrap_or("Unknown")
    }

    pub fn resolved_label(&self) -> String {
        dates::format_date(self.resolution_date.as_deref())
    }

    /// `KEY — summary`, the way issues are named in headings.
    pub fn identity(&self) -> String {
        format!("{} \u{2014} {}", self.key, self.summary)
    }
}

/// A complete report request: the parent and its subtasks, in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    pub parent: CaseRecord,
    #[serde(default)]
    pub subtasks: Vec<CaseRecord>,
}

impl ReportRequest {
    pub fn from_json(json: &str) -> Result<Self, DossierError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_transformer_output() {
        let json = r#"{
            "parent": {
                "key": "CWP-904",
                "summary": "Erase customer data",
                "type": "GDPR",
                "assignee": { "name": "Dana Lee", "avatarUrl": null },
                "status": "Done",
                "priority": "High",
                "resolutiondate": "2024-02-01T12:00:00.000+0000",
                "comments": [{ "author": "Dana Lee", "created": "2024-01-30T09:00:00Z", "body": "Started" }],
                "activity": [{ "created": "2024-01-31T10:00:00Z", "author": "Dana Lee",
                               "field": "status", "fromString": "Open", "toString": "Done" }]
            },
            "subtasks": [{ "key": "CWP-905", "summary": "Purge backups" }]
        }"#;
        let req = ReportRequest::from_json(json).unwrap();
        assert_eq!(req.parent.type_label(), "GDPR");
        assert_eq!(req.parent.assignee_name(), "Dana Lee");
        assert_eq!(req.parent.activity[0].from_value, "Open");
        assert_eq!(req.parent.resolved_label(), "Feb 1, 2024");
        assert_eq!(req.subtasks.len(), 1);
        assert!(req.subtasks[0].comments.is_empty());
    }

    #[test]
    fn missing_fields_get_placeholders() {
        let record = CaseRecord {
            key: "CWP-1".to_string(),
            ..Default::default()
        };
        assert_eq!(record.assignee_name(), "Unassigned");
        assert_eq!(record.status_label(), "N/A");
        assert_eq!(record.priority_label(), "None");
        assert_eq!(record.type_label(), "Unknown");
        assert_eq!(record.resolved_label(), "N/A");
    }

    #[test]
    fn missing_key_is_a_parse_error() {
        let err = ReportRequest::from_json(r#"{ "parent": { "summary": "x" } }"#).unwrap_err();
        assert!(err.to_string().contains("doesn't match"));
    }
}
