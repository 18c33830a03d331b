use actix_web::{
    delete, get, post, put,
    web::{self, Json},
    HttpRequest,
};
use common::{context::Context, entities::issue::PublicIssue};
use serde::Serialize;

use crate::{
    error::{self, OuterError},
    handlers::parse_body,
    service::{
        change::ChangeIssueRequest,
        filter::IssueQuery,
        issue::{CreateIssueRequest, DeleteIssueRequest, IssueService},
    },
};

#[derive(Debug, Serialize)]
pub struct UpdatedIssue {
    #[serde(flatten)]
    pub issue: PublicIssue,
    pub result: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DeletedIssue {
    pub result: &'static str,
    #[serde(rename = "_id")]
    pub id: String,
}

#[utoipa::path(
    params(
        ("project" = String, Path, description = "Project the issues belong to"),
        IssueQuery
    ),
    responses(
        (status = 200, description = "Matching issues, oldest update first", body = [PublicIssue]),
        (status = 400, description = "A filter value could not be parsed")
    )
)]
#[get("/api/issues/{project}")]
pub async fn get_issues(
    context: Context,
    project: web::Path<String>,
    query: web::Query<IssueQuery>,
) -> error::Result<Json<Vec<PublicIssue>>> {
    Ok(Json(
        IssueService::new(context)
            .list(&project, query.into_inner())
            .await?,
    ))
}

#[utoipa::path(
    params(
        ("project" = String, Path, description = "Project the issue belongs to")
    ),
    request_body(
        content = CreateIssueRequest,
        description = "JSON or url-encoded form"
    ),
    responses(
        (status = 200, description = "The stored issue", body = PublicIssue),
        (status = 400, description = "Required field(s) missing")
    )
)]
#[post("/api/issues/{project}")]
pub async fn post_issue(
    context: Context,
    project: web::Path<String>,
    req: HttpRequest,
    body: web::Bytes,
) -> error::Result<Json<PublicIssue>> {
    let data = parse_body::<CreateIssueRequest>(&req, &body)?;
    Ok(Json(IssueService::new(context).create(&project, data).await?))
}

#[utoipa::path(
    params(
        ("project" = String, Path, description = "Project the issue belongs to")
    ),
    request_body(
        content = ChangeIssueRequest,
        description = "JSON or url-encoded form"
    ),
    responses(
        (status = 200, description = "The updated issue with `result`, or `{error, _id, info}`", body = PublicIssue)
    )
)]
#[put("/api/issues/{project}")]
pub async fn put_issue(
    context: Context,
    project: web::Path<String>,
    req: HttpRequest,
    body: web::Bytes,
) -> error::Result<Json<UpdatedIssue>> {
    let data = parse_body::<ChangeIssueRequest>(&req, &body)?;
    let issue = IssueService::new(context).update(&project, data).await?;
    Ok(Json(UpdatedIssue {
        issue,
        result: "successfully updated",
    }))
}

#[utoipa::path(
    params(
        ("project" = String, Path, description = "Project the issue belongs to")
    ),
    request_body(
        content = DeleteIssueRequest,
        description = "JSON or url-encoded form"
    ),
    responses(
        (status = 200, description = "`{result, _id}`, or `{error, _id, info}`")
    )
)]
#[delete("/api/issues/{project}")]
pub async fn delete_issue(
    context: Context,
    project: web::Path<String>,
    req: HttpRequest,
    body: web::Bytes,
) -> error::Result<Json<DeletedIssue>> {
    let data = parse_body::<DeleteIssueRequest>(&req, &body)?;
    let id = IssueService::new(context).delete(&project, data).await?;
    Ok(Json(DeletedIssue {
        result: "successfully deleted",
        id,
    }))
}

/// `/api/issues` and `/api/issues/` have no project segment to scope by.
pub async fn missing_project() -> error::Result<Json<()>> {
    Err(OuterError::MissingProject.into())
}
