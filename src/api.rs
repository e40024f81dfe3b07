//! JSON request parsing and response bodies for the upload endpoint.
use std::result::Result as StdResult;

use futures::StreamExt;
use hyper::header::{self, HeaderMap};
use hyper::{Body, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub type Request = hyper::Request<hyper::Body>;
pub type Result = std::result::Result<hyper::Response<hyper::Body>, AppError>;

pub const UPLOADED: &str = "File uploaded successfully! It will appear in the gallery shortly.";
pub const MANIFEST_STALE: &str =
    "File uploaded but gallery manifest update failed. File will appear after manual refresh.";

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Uploaded {
    success: bool,
    file_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<&'static str>,
}

impl Uploaded {
    pub fn new(file_name: String) -> Uploaded {
        Uploaded {
            success: true,
            file_name,
            message: Some(UPLOADED),
            warning: None,
        }
    }

    /// The file is stored but the manifest does not list it yet.
    pub fn manifest_stale(file_name: String) -> Uploaded {
        Uploaded {
            success: true,
            file_name,
            message: None,
            warning: Some(MANIFEST_STALE),
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ErrorBody {
    pub fn new(e: &AppError, expose_internal: bool) -> ErrorBody {
        ErrorBody {
            error: e.to_string(),
            code: e.error_code(),
            details: e.details(expose_internal),
        }
    }
}

pub fn json<T: Serialize>(status: StatusCode, value: &T) -> Result {
    let bytes = serde_json::to_vec(value).map_err(unexpected!())?;

    Response::builder()
        .header(header::CONTENT_TYPE, "application/json")
        .status(status)
        .body(Body::from(bytes))
        .map_err(unexpected!())
}

pub fn error_response(e: &AppError, expose_internal: bool) -> Response<Body> {
    json(e.status_code(), &ErrorBody::new(e, expose_internal)).unwrap_or_else(|_| {
        let mut response = Response::new(Body::from(r#"{"error":"Internal server error"}"#));
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, header::HeaderValue::from_static("application/json"));
        response
    })
}

/// True when the declared content type is `application/json`, parameters
/// such as `charset` aside.
pub fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<mime::Mime>().ok())
        .map_or(false, |mime| mime.essence_str() == mime::APPLICATION_JSON.essence_str())
}

/// Read at most `limit` bytes of body and parse it as JSON. A body that does
/// not parse is an internal error, like any other uncaught failure.
pub async fn parse_body<T>(req: Request, limit: usize) -> StdResult<T, AppError>
where
    for<'de> T: Deserialize<'de>,
{
    let mut body = req.into_body();
    let mut buffer: Vec<u8> = Vec::new();
    while let Some(bytes) = body.next().await {
        let bytes = bytes.map_err(|_| AppError::BadRequest(format!("Failed to read the request body")))?;
        if buffer.len() + bytes.len() > limit {
            return Err(AppError::PayloadTooLarge(limit));
        }
        buffer.extend_from_slice(&bytes);
    }
    serde_json::from_slice(&buffer).map_err(unexpected!())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;

    #[test]
    fn json_content_type() {
        let mut headers = HeaderMap::new();
        assert!(!is_json(&headers));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"));
        assert!(is_json(&headers));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("multipart/form-data; boundary=x"));
        assert!(!is_json(&headers));
    }

    #[test]
    fn uploaded_body() {
        let value = serde_json::to_value(Uploaded::manifest_stale("upload_1_a.png".to_string())).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["fileName"], "upload_1_a.png");
        assert_eq!(value["warning"], MANIFEST_STALE);
        assert!(value.get("message").is_none());
    }

    #[tokio::test]
    async fn body_limit() {
        let req = hyper::Request::new(Body::from(vec![b' '; 32]));
        let err = parse_body::<serde_json::Value>(req, 16).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);

        let req = hyper::Request::new(Body::from("{oops"));
        let err = parse_body::<serde_json::Value>(req, 16).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.details(true).is_some());
    }
}
