use chrono::{DateTime, Utc};
use common::entities::issue::Issue;
use mongodb::bson::{self, Document};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::id_text;

/// Body of `PUT /api/issues/{project}`.
#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct ChangeIssueRequest {
    #[schema(value_type = Option<String>)]
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_text: Option<String>,
    /// Only the string `"false"` has an effect; it closes the issue.
    #[schema(value_type = Option<String>)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<Value>,
}

impl ChangeIssueRequest {
    pub fn into_parts(self) -> (Option<String>, IssueChanges) {
        let changes = IssueChanges {
            issue_title: non_empty(self.issue_title),
            issue_text: non_empty(self.issue_text),
            created_by: non_empty(self.created_by),
            assigned_to: non_empty(self.assigned_to),
            status_text: non_empty(self.status_text),
            close: matches!(&self.open, Some(Value::String(open)) if open == "false"),
        };
        (self.id.map(id_text), changes)
    }
}

/// Fields an update will actually touch. Empty strings mean "leave as is" and
/// never make it in here.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IssueChanges {
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    pub close: bool,
}

impl IssueChanges {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// `$set` payload, stamped with `now` as the new `updated_on`.
    pub fn into_document(self, now: DateTime<Utc>) -> Document {
        let mut changes = Document::new();
        let text = [
            ("issue_title", self.issue_title),
            ("issue_text", self.issue_text),
            ("created_by", self.created_by),
            ("assigned_to", self.assigned_to),
            ("status_text", self.status_text),
        ];
        for (field, value) in text {
            if let Some(value) = value {
                changes.insert(field, value);
            }
        }
        if self.close {
            changes.insert(Issue::OPEN, false);
        }
        changes.insert(Issue::UPDATED_ON, bson::DateTime::from_chrono(now));
        changes
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}
