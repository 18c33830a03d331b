pub mod config;
pub mod error;
pub mod handlers;
pub mod seed;
pub mod service;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::ServiceFactory;
use actix_web::dev::ServiceRequest;
use actix_web::dev::ServiceResponse;
use actix_web::middleware;
use actix_web::web;
use actix_web::App;
use utoipa::OpenApi;

use common::context::ServiceState;
use common::entities::issue::PublicIssue;

pub use crate::handlers::issue::*;
pub use crate::handlers::openapi_json;
use crate::service::{
    change::ChangeIssueRequest,
    issue::{CreateIssueRequest, DeleteIssueRequest},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::issue::get_issues,
        handlers::issue::post_issue,
        handlers::issue::put_issue,
        handlers::issue::delete_issue
    ),
    components(schemas(
        PublicIssue,
        CreateIssueRequest,
        ChangeIssueRequest,
        DeleteIssueRequest
    ))
)]
pub struct ApiDoc;

pub fn create_app(
    state: Arc<ServiceState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Response = ServiceResponse<impl MessageBody>,
        Config = (),
        InitError = (),
        Error = actix_web::Error,
    >,
> {
    let cors = Cors::permissive();
    let query_config = web::QueryConfig::default().error_handler(|err, _req| {
        error::Error::from(error::OuterError::MalformedQuery(err.to_string())).into()
    });
    let app = App::new()
        .wrap(cors)
        .wrap(middleware::Logger::default())
        .app_data(web::Data::new(state))
        .app_data(query_config)
        .service(get_issues)
        .service(post_issue)
        .service(put_issue)
        .service(delete_issue)
        .service(web::resource(["/api/issues", "/api/issues/"]).to(missing_project))
        .service(openapi_json);
    app
}

#[cfg(test)]
pub(crate) fn create_test_state() -> Arc<ServiceState> {
    use common::{
        entities::issue::Issue,
        repository::{memory_repository::InMemoryRepository, RepositoryObject},
    };

    let mut state = ServiceState::new("issues");
    let issues: RepositoryObject<Issue> = Arc::new(InMemoryRepository::<Issue>::new());
    state.insert(issues);
    Arc::new(state)
}
