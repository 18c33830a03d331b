use chrono::{DateTime, Utc};
use mongodb::bson::{oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stored shape of an issue. `id` is left empty until the store assigns one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Issue {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub project_name: String,
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    #[serde(default)]
    pub assigned_to: String,
    #[serde(default)]
    pub status_text: String,
    pub open: bool,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_on: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_on: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub expire_from: DateTime<Utc>,
}

impl Issue {
    pub const ID: &'static str = "_id";
    pub const PROJECT_NAME: &'static str = "project_name";
    pub const OPEN: &'static str = "open";
    pub const CREATED_ON: &'static str = "created_on";
    pub const UPDATED_ON: &'static str = "updated_on";
    /// TTL index key.
    pub const EXPIRE_FROM: &'static str = "expire_from";
}

/// The only shape of an issue that is ever returned to callers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct PublicIssue {
    #[serde(rename = "_id")]
    pub id: String,
    pub project_name: String,
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,
    pub open: bool,
    pub created_on: DateTime<Utc>,
    pub updated_on: DateTime<Utc>,
}

impl From<Issue> for PublicIssue {
    fn from(issue: Issue) -> Self {
        Self {
            id: issue.id.map(|id| id.to_hex()).unwrap_or_default(),
            project_name: issue.project_name,
            issue_title: issue.issue_title,
            issue_text: issue.issue_text,
            created_by: issue.created_by,
            assigned_to: issue.assigned_to,
            status_text: issue.status_text,
            open: issue.open,
            created_on: issue.created_on,
            updated_on: issue.updated_on,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use mongodb::bson::{self, oid::ObjectId};

    use super::{Issue, PublicIssue};

    fn issue() -> Issue {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        Issue {
            id: Some(ObjectId::new()),
            project_name: "apitest".to_string(),
            issue_title: "Broken link".to_string(),
            issue_text: "The footer link 404s".to_string(),
            created_by: "alice".to_string(),
            assigned_to: String::new(),
            status_text: String::new(),
            open: true,
            created_on: now,
            updated_on: now,
            expire_from: now,
        }
    }

    #[test]
    fn stored_document_keeps_expiry_and_bson_dates() {
        let document = bson::to_document(&issue()).unwrap();
        assert!(document.get_object_id("_id").is_ok());
        assert!(document.get_datetime(Issue::EXPIRE_FROM).is_ok());
        assert!(document.get_datetime(Issue::UPDATED_ON).is_ok());
    }

    #[test]
    fn unsaved_issue_has_no_id_field() {
        let mut issue = issue();
        issue.id = None;
        let document = bson::to_document(&issue).unwrap();
        assert!(!document.contains_key("_id"));
    }

    #[test]
    fn public_issue_drops_internal_fields() {
        let issue = issue();
        let hex = issue.id.unwrap().to_hex();
        let value = serde_json::to_value(PublicIssue::from(issue)).unwrap();
        let object = value.as_object().unwrap();

        assert_eq!(object["_id"], hex.as_str());
        assert!(!object.contains_key("expire_from"));
        assert_eq!(object.len(), 10);
    }
}
