pub mod issue;

use actix_web::{get, HttpMessage, HttpRequest, HttpResponse};
use serde::de::DeserializeOwned;
use utoipa::OpenApi;

use crate::{
    error::{self, OuterError},
    ApiDoc,
};

/// Issue bodies arrive as JSON from API clients and as url-encoded forms from
/// the HTML front-end. Anything that is not JSON is read as a form, so an empty
/// body yields a request with every field unset.
pub fn parse_body<T: DeserializeOwned>(req: &HttpRequest, body: &[u8]) -> error::Result<T> {
    let parsed = if req.content_type().contains("json") && !body.is_empty() {
        serde_json::from_slice(body).map_err(|err| err.to_string())
    } else {
        serde_urlencoded::from_bytes(body).map_err(|err| err.to_string())
    };

    parsed.map_err(|err| OuterError::MalformedBody(err).into())
}

#[get("/api-doc/openapi.json")]
pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use actix_web::{http::header::ContentType, test::TestRequest};

    use super::parse_body;
    use crate::{error::{Error, OuterError}, service::issue::CreateIssueRequest};

    #[test]
    fn json_and_form_bodies() {
        let req = TestRequest::default()
            .insert_header(ContentType::json())
            .to_http_request();
        let data: CreateIssueRequest =
            parse_body(&req, br#"{"issue_title": "t", "extra": 1}"#).unwrap();
        assert_eq!(data.issue_title.as_deref(), Some("t"));

        let req = TestRequest::default()
            .insert_header(ContentType::form_url_encoded())
            .to_http_request();
        let data: CreateIssueRequest = parse_body(&req, b"created_by=c+d&issue_text=").unwrap();
        assert_eq!(data.created_by.as_deref(), Some("c d"));
        assert_eq!(data.issue_text.as_deref(), Some(""));
        assert_eq!(data.issue_title, None);
    }

    #[test]
    fn empty_body_has_no_fields() {
        let req = TestRequest::default()
            .insert_header(ContentType::json())
            .to_http_request();
        let data: CreateIssueRequest = parse_body(&req, b"").unwrap();
        assert!(data.issue_title.is_none() && data.issue_text.is_none());
    }

    #[test]
    fn broken_json_is_malformed() {
        let req = TestRequest::default()
            .insert_header(ContentType::json())
            .to_http_request();
        let err = parse_body::<CreateIssueRequest>(&req, b"{\"issue_title\":").unwrap_err();
        assert!(matches!(err, Error::Outer(OuterError::MalformedBody(_))));
    }
}
