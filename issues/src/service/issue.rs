use anyhow::anyhow;
use chrono::Utc;
use common::{
    context::Context,
    entities::issue::{Issue, PublicIssue},
    error::AddCode,
};
use mongodb::bson::{doc, oid::ObjectId, Document};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::error::{self, Action, OuterError};

use super::{
    change::ChangeIssueRequest,
    id_text,
    filter::{IssueFilter, IssueQuery},
};

#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct CreateIssueRequest {
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
}

#[derive(Debug, Default, Clone, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct DeleteIssueRequest {
    #[schema(value_type = Option<String>)]
    #[serde(rename = "_id", alias = "id", skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
}

pub struct IssueService {
    context: Context,
}

impl IssueService {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub async fn list(&self, project: &str, query: IssueQuery) -> error::Result<Vec<PublicIssue>> {
        let project = require_project(project)?;
        let filter = IssueFilter::try_from(query)?.scoped(project);

        let issues = self.context.try_get_repository::<Issue>()?;
        let found = issues
            .find_many(filter, doc! {"updated_on": 1})
            .await?;

        Ok(found.into_iter().map(PublicIssue::from).collect())
    }

    pub async fn create(&self, project: &str, data: CreateIssueRequest) -> error::Result<PublicIssue> {
        let project = require_project(project)?;

        let (Some(issue_title), Some(issue_text), Some(created_by)) =
            (data.issue_title.clone(), data.issue_text.clone(), data.created_by.clone())
        else {
            let missing = [
                ("issue_title", data.issue_title.is_none()),
                ("issue_text", data.issue_text.is_none()),
                ("created_by", data.created_by.is_none()),
            ]
            .into_iter()
            .filter_map(|(field, missing)| missing.then_some(field))
            .collect();
            return Err(OuterError::MissingFields(missing).into());
        };

        let issues = self.context.try_get_repository::<Issue>()?;

        let now = Utc::now();
        let issue = Issue {
            id: None,
            project_name: project.to_string(),
            issue_title,
            issue_text,
            created_by,
            assigned_to: data.assigned_to.unwrap_or_default(),
            status_text: data.status_text.unwrap_or_default(),
            open: true,
            created_on: now,
            updated_on: now,
            expire_from: now,
        };

        let id = issues.insert(&issue).await?;

        // the insert acknowledgement only carries the id
        let Some(created) = issues.find_one(doc! {"_id": id}).await? else {
            return Err(anyhow!("Issue {} vanished right after insert", id).code(500).into());
        };

        log::info!("Created issue {} in project {}", id, project);
        Ok(created.into())
    }

    pub async fn update(&self, project: &str, data: ChangeIssueRequest) -> error::Result<PublicIssue> {
        let project = require_project(project)?;

        let (id, changes) = data.into_parts();
        let Some(id) = id else {
            return Err(OuterError::MissingId(Action::Update).into());
        };

        if changes.is_empty() {
            return Err(OuterError::NoUpdateFields { id }.into());
        }

        let could_not_update = |id: String| -> error::Error {
            OuterError::CouldNotUpdate { id }.into()
        };

        let Ok(object_id) = id.parse::<ObjectId>() else {
            log::warn!("Rejected update of issue with malformed id {:?}", id);
            return Err(could_not_update(id));
        };

        let issues = self.context.try_get_repository::<Issue>()?;
        let scope = scope(project, object_id);

        let modified = match issues
            .update_one(scope.clone(), changes.into_document(Utc::now()))
            .await
        {
            Ok(modified) => modified,
            Err(err) => {
                log::error!("Failed to update issue {}: {}", id, err);
                return Err(could_not_update(id));
            }
        };
        if modified != 1 {
            log::warn!("No issue {} in project {} to update", id, project);
            return Err(could_not_update(id));
        }

        match issues.find_one(scope).await {
            Ok(Some(updated)) => {
                log::info!("Updated issue {} in project {}", id, project);
                Ok(updated.into())
            }
            Ok(None) => Err(could_not_update(id)),
            Err(err) => {
                log::error!("Failed to read back issue {}: {}", id, err);
                Err(could_not_update(id))
            }
        }
    }

    pub async fn delete(&self, project: &str, data: DeleteIssueRequest) -> error::Result<String> {
        let project = require_project(project)?;

        let Some(id) = data.id.map(id_text) else {
            return Err(OuterError::MissingId(Action::Delete).into());
        };

        let Ok(object_id) = id.parse::<ObjectId>() else {
            log::warn!("Rejected delete of issue with malformed id {:?}", id);
            return Err(OuterError::CouldNotDelete { id }.into());
        };

        let issues = self.context.try_get_repository::<Issue>()?;

        match issues.delete_one(scope(project, object_id)).await {
            Ok(1) => {
                log::info!("Deleted issue {} from project {}", id, project);
                Ok(id)
            }
            Ok(_) => {
                log::warn!("No issue {} in project {} to delete", id, project);
                Err(OuterError::CouldNotDelete { id }.into())
            }
            Err(err) => {
                log::error!("Failed to delete issue {}: {}", id, err);
                Err(OuterError::CouldNotDelete { id }.into())
            }
        }
    }
}

fn require_project(project: &str) -> error::Result<&str> {
    if project.is_empty() {
        return Err(OuterError::MissingProject.into());
    }
    Ok(project)
}

fn scope(project: &str, id: ObjectId) -> Document {
    let mut scope = Document::new();
    scope.insert(Issue::PROJECT_NAME, project);
    scope.insert(Issue::ID, id);
    scope
}
