use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use common::entities::issue::Issue;
use mongodb::bson::{self, oid::ObjectId, Document};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;

use crate::error::OuterError;

/// Query parameters accepted by `GET /api/issues/{project}`. Anything not
/// listed here is dropped during deserialization and never reaches the store.
#[derive(Debug, Default, Clone, Serialize, Deserialize, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct IssueQuery {
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
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
    /// `true` or `false`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_on: Option<String>,
}

/// Validated, typed form of [`IssueQuery`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IssueFilter {
    pub id: Option<ObjectId>,
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    pub open: Option<bool>,
    pub created_on: Option<DateTime<Utc>>,
    pub updated_on: Option<DateTime<Utc>>,
}

impl TryFrom<IssueQuery> for IssueFilter {
    type Error = OuterError;

    fn try_from(query: IssueQuery) -> Result<Self, Self::Error> {
        let id = query
            .id
            .map(|id| id.parse::<ObjectId>().map_err(|_| OuterError::InvalidId(id)))
            .transpose()?;

        let open = query.open.map(parse_open).transpose()?;

        let created_on = query
            .created_on
            .map(|value| parse_date(Issue::CREATED_ON, value))
            .transpose()?;
        let updated_on = query
            .updated_on
            .map(|value| parse_date(Issue::UPDATED_ON, value))
            .transpose()?;

        Ok(Self {
            id,
            issue_title: query.issue_title,
            issue_text: query.issue_text,
            created_by: query.created_by,
            assigned_to: query.assigned_to,
            status_text: query.status_text,
            open,
            created_on,
            updated_on,
        })
    }
}

impl IssueFilter {
    /// Store filter limited to `project`. Unset fields are left out entirely.
    pub fn scoped(self, project: &str) -> Document {
        let mut filter = Document::new();
        filter.insert(Issue::PROJECT_NAME, project);

        if let Some(id) = self.id {
            filter.insert(Issue::ID, id);
        }
        let text = [
            ("issue_title", self.issue_title),
            ("issue_text", self.issue_text),
            ("created_by", self.created_by),
            ("assigned_to", self.assigned_to),
            ("status_text", self.status_text),
        ];
        for (field, value) in text {
            if let Some(value) = value {
                filter.insert(field, value);
            }
        }
        if let Some(open) = self.open {
            filter.insert(Issue::OPEN, open);
        }
        if let Some(created_on) = self.created_on {
            filter.insert(Issue::CREATED_ON, bson::DateTime::from_chrono(created_on));
        }
        if let Some(updated_on) = self.updated_on {
            filter.insert(Issue::UPDATED_ON, bson::DateTime::from_chrono(updated_on));
        }

        filter
    }
}

fn parse_open(value: String) -> Result<bool, OuterError> {
    match value.as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(OuterError::InvalidOpen(value)),
    }
}

fn parse_date(field: &'static str, value: String) -> Result<DateTime<Utc>, OuterError> {
    let trimmed = value.trim();

    if let Ok(date) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(trimmed) {
        return Ok(date.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(date) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(date.and_utc());
        }
    }
    if let Some(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return Ok(date.and_utc());
    }

    Err(OuterError::InvalidDate { field, value })
}
