use std::sync::Arc;

use actix_web::{dev::Payload, web::Data, FromRequest, HttpRequest};
use anyhow::anyhow;
use type_map::concurrent::TypeMap;

use crate::{
    error::{self, AddCode, ServiceError},
    repository::RepositoryObject,
};

/// Long-lived state built once at startup and shared by every worker.
pub struct ServiceState {
    pub service_name: String,
    pub repositories: TypeMap,
}

impl ServiceState {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            repositories: TypeMap::new(),
        }
    }

    pub fn insert<T: 'static>(&mut self, repository: RepositoryObject<T>) {
        self.repositories.insert(repository);
    }
}

/// Per-request handle to the shared [`ServiceState`].
#[derive(Clone)]
pub struct Context(pub Arc<ServiceState>);

impl Context {
    pub fn get_repository<T: 'static>(&self) -> Option<RepositoryObject<T>> {
        self.0.repositories.get::<RepositoryObject<T>>().cloned()
    }

    pub fn try_get_repository<T: 'static>(&self) -> error::Result<RepositoryObject<T>> {
        self.get_repository::<T>().ok_or_else(|| {
            anyhow!(
                "Repository for type {} not found",
                std::any::type_name::<T>()
            )
            .code(500)
        })
    }
}

impl FromRequest for Context {
    type Error = ServiceError;

    type Future = futures_util::future::Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<Data<Arc<ServiceState>>>() {
            Some(state) => Ok(Context(Arc::clone(state))),
            None => {
                log::error!("No service state registered for {}", req.path());
                Err(anyhow!("No state provided").code(500))
            }
        };

        futures_util::future::ready(result)
    }
}
