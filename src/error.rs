use hyper::StatusCode;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Server configuration error: Missing content store token")]
    MissingToken,
    #[error("Wrong request format: {0}")]
    BadRequest(String),
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    #[error("Invalid file type. Only images (PNG, JPG, GIF, WebP) and videos (MP4, MOV, WebM) are allowed.")]
    InvalidFileType,
    #[error("The maximum request size of {0} bytes has been exceeded")]
    PayloadTooLarge(usize),
    #[error("{message}")]
    Upstream { message: &'static str, details: String },
    #[error("Internal server error")]
    Store(#[from] StoreError),
    #[error("Internal server error")]
    Unexpected(anyhow::Error),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        use AppError::*;
        match self {
            MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            BadRequest(_) | MissingFields(_) | InvalidFileType => StatusCode::BAD_REQUEST,
            PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        use AppError::*;
        match self {
            MethodNotAllowed => "METHOD_NOT_ALLOWED",
            MissingToken => "CONFIGURATION",
            BadRequest(_) => "BAD_REQUEST",
            MissingFields(_) => "MISSING_FIELDS",
            InvalidFileType => "INVALID_FILE_TYPE",
            PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            Upstream { .. } => "UPSTREAM",
            Store(_) | Unexpected(_) => "UNEXPECTED",
        }
    }

    /// Extra detail for the caller. Internal failures only carry a detail when
    /// the server is configured to expose it.
    pub fn details(&self, expose_internal: bool) -> Option<String> {
        match self {
            AppError::Upstream { details, .. } => Some(details.clone()),
            AppError::Store(e) if expose_internal => Some(e.to_string()),
            AppError::Unexpected(e) if expose_internal => Some(e.to_string()),
            _ => None,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, AppError::Store(_) | AppError::Unexpected(_))
    }
}

macro_rules! unexpected {
    () => {
        |e| {
            ::log::error!("Unexpected error: [{}][{}]{}", file!(), line!(), e);
            crate::error::AppError::Unexpected(e.into())
        }
    };
    ($msg: expr) => {{
        let msg = $msg.to_string();
        ::log::error!("Unexpected error: [{}][{}]{}", file!(), line!(), msg);
        crate::error::AppError::Unexpected(::anyhow::anyhow!(msg))
    }};
}

#[test]
fn test_error_mapping() {
    let e = AppError::MissingFields(vec!["fileName", "fileType"]);
    assert_eq!(e.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(e.to_string(), "Missing required fields: fileName, fileType");

    let e = AppError::Unexpected(anyhow::anyhow!("secret path /etc/foo"));
    assert_eq!(e.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(e.to_string(), "Internal server error");
    assert_eq!(e.details(false), None);
    assert_eq!(e.details(true).as_deref(), Some("secret path /etc/foo"));

    let e = AppError::Upstream {
        message: "Failed to upload file",
        details: "boom".to_string(),
    };
    assert_eq!(e.details(false).as_deref(), Some("boom"));
    assert_eq!(e.error_code(), "UPSTREAM");
}
