use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use serde::{Serialize, Serializer};
use std::convert::Infallible;
use thiserror::Error;
use tracing::{debug, warn};
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let code = if let Some(code) = err.find::<ApiErrorCode>() {
        code.clone()
    } else if err.is_not_found() {
        ApiErrorCode::RouteNotFound
    } else if let Some(e) = err.find::<warp::body::BodyDeserializeError>() {
        ApiErrorCode::InvalidInput(e.to_string())
    } else if err.find::<reject::PayloadTooLarge>().is_some() {
        ApiErrorCode::PayloadTooLarge
    } else if let Some(e) = err.find::<reject::UnsupportedMediaType>() {
        ApiErrorCode::InvalidInput(e.to_string())
    } else if let Some(e) = err.find::<reject::InvalidHeader>() {
        ApiErrorCode::InvalidInput(e.to_string())
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        ApiErrorCode::MethodNotAllowed
    } else {
        ApiErrorCode::internal(format!("unhandled rejection: {:?}", err))
    };

    debug!(code = code.code(), "request rejected");
    let json = warp::reply::json(&ApiResponse::<()>::err(code.clone(), code.to_string()));
    Ok(warp::reply::with_status(json, code.status()))
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Error)]
pub enum ApiErrorCode {
    #[error("Access denied. No valid token provided.")]
    Unauthorized,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0} not found")]
    ItemNotFound(&'static str),
    #[error("{0}")]
    DuplicateItemId(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("Invalid file type for {0}")]
    InvalidFileType(String),
    #[error("Invalid document type: {0}")]
    InvalidKind(String),
    #[error("No files uploaded")]
    NoFilesProvided,
    #[error("Payload too large")]
    PayloadTooLarge,
    #[error("Route not found")]
    RouteNotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn internal<E: std::fmt::Display>(error: E) -> ApiErrorCode {
        warn!("Internal error: {}", error);
        ApiErrorCode::InternalError
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiErrorCode::Unauthorized => "Unauthorized",
            ApiErrorCode::InvalidCredentials => "InvalidCredentials",
            ApiErrorCode::NotFound(_) => "NotFound",
            ApiErrorCode::ItemNotFound(_) => "ItemNotFound",
            ApiErrorCode::DuplicateItemId(_) => "DuplicateItemId",
            ApiErrorCode::InvalidInput(_) => "InvalidInput",
            ApiErrorCode::InvalidFileType(_) => "InvalidFileType",
            ApiErrorCode::InvalidKind(_) => "InvalidKind",
            ApiErrorCode::NoFilesProvided => "NoFilesProvided",
            ApiErrorCode::PayloadTooLarge => "PayloadTooLarge",
            ApiErrorCode::RouteNotFound => "RouteNotFound",
            ApiErrorCode::MethodNotAllowed => "MethodNotAllowed",
            ApiErrorCode::InternalError => "InternalError",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::Unauthorized | ApiErrorCode::InvalidCredentials => {
                StatusCode::UNAUTHORIZED
            }
            ApiErrorCode::NotFound(_) | ApiErrorCode::ItemNotFound(_) => StatusCode::NOT_FOUND,
            ApiErrorCode::RouteNotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::DuplicateItemId(_) => StatusCode::CONFLICT,
            ApiErrorCode::InvalidInput(_)
            | ApiErrorCode::InvalidFileType(_)
            | ApiErrorCode::InvalidKind(_)
            | ApiErrorCode::NoFilesProvided => StatusCode::BAD_REQUEST,
            ApiErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl Serialize for ApiErrorCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.code())
    }
}

impl reject::Reject for ApiErrorCode {}

impl From<AuthError> for ApiErrorCode {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::InvalidCredentials => ApiErrorCode::InvalidCredentials,
            AuthError::TokenInvalid | AuthError::TokenExpired | AuthError::Unauthorized => {
                ApiErrorCode::Unauthorized
            }
            AuthError::Store(e) => ApiErrorCode::internal(e),
            AuthError::InternalError(e) => ApiErrorCode::internal(e),
        }
    }
}

impl From<PortfolioError> for ApiErrorCode {
    fn from(error: PortfolioError) -> Self {
        match error {
            PortfolioError::NotFound => ApiErrorCode::NotFound("Portfolio"),
            PortfolioError::ItemNotFound(list) => ApiErrorCode::ItemNotFound(list.label()),
            e @ PortfolioError::DuplicateItemId { .. } => ApiErrorCode::DuplicateItemId(e.to_string()),
            PortfolioError::InvalidInput(reason) => ApiErrorCode::InvalidInput(reason),
            PortfolioError::Store(e) => ApiErrorCode::internal(e),
        }
    }
}

impl From<DocumentError> for ApiErrorCode {
    fn from(error: DocumentError) -> Self {
        match error {
            DocumentError::NotFound => ApiErrorCode::NotFound("Document"),
            DocumentError::InvalidFileType(slot) => {
                ApiErrorCode::InvalidFileType(slot.field_name().to_string())
            }
            DocumentError::InvalidKind(kind) => ApiErrorCode::InvalidKind(kind),
            DocumentError::NoFilesProvided => ApiErrorCode::NoFilesProvided,
            e @ DocumentError::MalformedUpload(_) => ApiErrorCode::InvalidInput(e.to_string()),
            DocumentError::Store(e) => ApiErrorCode::internal(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::ListName;

    #[test]
    fn item_not_found_names_the_list() {
        let code = ApiErrorCode::from(PortfolioError::ItemNotFound(ListName::Certifications));
        assert_eq!(code.status(), StatusCode::NOT_FOUND);
        assert_eq!(code.to_string(), "Certification not found");
        assert_eq!(serde_json::to_value(&code).unwrap(), "ItemNotFound");
    }

    #[test]
    fn token_failures_are_uniformly_unauthorized() {
        for error in [
            AuthError::TokenInvalid,
            AuthError::TokenExpired,
            AuthError::Unauthorized,
        ] {
            let code = ApiErrorCode::from(error);
            assert_eq!(code.code(), "Unauthorized");
            assert_eq!(code.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn store_failures_hide_details() {
        let code = ApiErrorCode::from(DocumentError::Store("disk on fire".to_string()));
        assert_eq!(code.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code.to_string(), "Internal error");
    }
}
