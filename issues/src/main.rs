use std::sync::Arc;

use actix_web::HttpServer;
use common::{
    context::ServiceState,
    entities::issue::Issue,
    repository::{
        memory_repository::InMemoryRepository, mongo_repository::MongoRepository,
        RepositoryObject,
    },
};
use issues::{config::Settings, create_app, seed};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    env_logger::init();

    let settings = Settings::from_env()?;

    let issues: RepositoryObject<Issue> = match &settings.mongo_uri {
        Some(mongo_uri) => Arc::new(
            MongoRepository::<Issue>::new(mongo_uri, &settings.database, &settings.collection)
                .await?,
        ),
        None => {
            log::warn!("MONGOURI is not set, issues are kept in memory only");
            Arc::new(InMemoryRepository::<Issue>::new())
        }
    };

    issues
        .expire_after(Issue::EXPIRE_FROM, settings.issue_ttl)
        .await?;

    if settings.seed_sample_issues {
        seed::insert_sample_issues(&issues).await?;
    }

    let mut state = ServiceState::new("issues");
    state.insert(issues);
    let state = Arc::new(state);

    log::info!(
        "Starting {} on {}:{}",
        state.service_name,
        settings.host,
        settings.port
    );
    HttpServer::new(move || create_app(state.clone()))
        .bind((settings.host.as_str(), settings.port))?
        .run()
        .await?;

    Ok(())
}
