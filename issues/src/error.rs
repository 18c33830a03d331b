use actix_web::{
    http::{header::ContentType, StatusCode},
    HttpResponse, ResponseError,
};
use common::error::ServiceError;
use derive_more::{Display, Error};
use serde_json::{json, Value};

#[derive(Debug, Display, Error)]
pub enum Error {
    Inner(ServiceError),
    Outer(OuterError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Action {
    #[display(fmt = "update")]
    Update,
    #[display(fmt = "delete")]
    Delete,
}

/// Everything a caller can get wrong. Rendered as JSON; see
/// [`OuterError::status_code`] for which of these are reported as `200`.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum OuterError {
    #[display(fmt = "require project name for issues in URL")]
    MissingProject,
    #[display(fmt = "malformed request body: {}", _0)]
    MalformedBody(String),
    #[display(fmt = "malformed query string: {}", _0)]
    MalformedQuery(String),
    #[display(fmt = "Invalid _id parameter: {}; Please check _id", _0)]
    InvalidId(String),
    #[display(fmt = "Invalid value given for open filter: {}; must be true or false", _0)]
    InvalidOpen(String),
    #[display(fmt = "Invalid value given for {} filter: {}", field, value)]
    InvalidDate { field: &'static str, value: String },
    #[display(fmt = "required field(s) missing")]
    MissingFields(Vec<&'static str>),
    #[display(fmt = "missing _id")]
    MissingId(Action),
    #[display(fmt = "no update field(s) sent")]
    NoUpdateFields { id: String },
    #[display(fmt = "could not update")]
    CouldNotUpdate { id: String },
    #[display(fmt = "could not delete")]
    CouldNotDelete { id: String },
}

impl std::error::Error for OuterError {}

impl OuterError {
    /// The issue front-end only inspects the body of PUT and DELETE replies, so
    /// those rejections travel with a success status.
    pub fn status_code(&self) -> StatusCode {
        match self {
            OuterError::MissingProject
            | OuterError::MalformedBody(_)
            | OuterError::MalformedQuery(_)
            | OuterError::InvalidId(_)
            | OuterError::InvalidOpen(_)
            | OuterError::InvalidDate { .. }
            | OuterError::MissingFields(_) => StatusCode::BAD_REQUEST,
            OuterError::MissingId(_)
            | OuterError::NoUpdateFields { .. }
            | OuterError::CouldNotUpdate { .. }
            | OuterError::CouldNotDelete { .. } => StatusCode::OK,
        }
    }

    pub fn body(&self) -> Value {
        let error = self.to_string();
        match self {
            OuterError::MissingFields(missing) => json!({
                "error": error,
                "missingFields": missing,
            }),
            OuterError::MissingId(action) => json!({
                "error": error,
                "info": format!("Valid _id field is required to {} a specific issue", action),
            }),
            OuterError::NoUpdateFields { id } => json!({
                "error": error,
                "_id": id,
                "info": "Minimum of 1 field must be given a value to update",
            }),
            OuterError::CouldNotUpdate { id } => json!({
                "error": error,
                "_id": id,
                "info": "Issue could not be updated. Please check issue _id is valid and project name is correct",
            }),
            OuterError::CouldNotDelete { id } => json!({
                "error": error,
                "_id": id,
                "info": "Issue could not be deleted. Please check issue _id is valid and project name is correct",
            }),
            _ => json!({ "error": error }),
        }
    }
}

impl From<ServiceError> for Error {
    fn from(err: ServiceError) -> Self {
        Error::Inner(err)
    }
}

impl From<OuterError> for Error {
    fn from(value: OuterError) -> Self {
        Error::Outer(value)
    }
}

impl ResponseError for Error {
    fn error_response(&self) -> HttpResponse {
        match self {
            Error::Inner(err) => {
                log::error!("{}", err);
                HttpResponse::build(self.status_code())
                    .insert_header(ContentType::plaintext())
                    .body("Internal Server error: See Server Logs")
            }
            Error::Outer(err) => HttpResponse::build(self.status_code()).json(err.body()),
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::Inner(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Outer(err) => err.status_code(),
        }
    }
}
