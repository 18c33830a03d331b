use actix_web::{http::StatusCode, ResponseError};
use mongodb::bson;

#[derive(Debug)]
pub struct ServiceError {
    pub code: u16,
    err: anyhow::Error,
}

impl std::fmt::Display for ServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "ServiceError({}): {}", self.code, self.err)
    }
}

impl std::error::Error for ServiceError {}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

pub trait AddCode {
    fn code(self, code: u16) -> ServiceError;
}

impl AddCode for anyhow::Error {
    fn code(self, code: u16) -> ServiceError {
        ServiceError { code, err: self }
    }
}

impl From<anyhow::Error> for ServiceError {
    fn from(err: anyhow::Error) -> Self {
        err.code(500)
    }
}

impl From<mongodb::error::Error> for ServiceError {
    fn from(err: mongodb::error::Error) -> Self {
        anyhow::Error::new(err).code(500)
    }
}

impl From<bson::ser::Error> for ServiceError {
    fn from(err: bson::ser::Error) -> Self {
        anyhow::Error::new(err).code(500)
    }
}

impl From<bson::de::Error> for ServiceError {
    fn from(err: bson::de::Error) -> Self {
        anyhow::Error::new(err).code(500)
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
