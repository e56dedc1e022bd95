use super::error::*;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::ByteSource;
use crate::logger::*;
use chrono::{DateTime, Utc};
use futures_util::{StreamExt, TryStreamExt, future};
use serde::{Deserialize, Serialize};
use std::io;
use std::sync::Arc;
use tokio_util::io::{ReaderStream, StreamReader};
use warp::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE, HeaderValue};
use warp::multipart::{FormData, Part};
use warp::reject;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: Option<T>) -> Self {
        ApiResponse {
            success: true,
            message: Some(message.into()),
            data,
            error: None,
        }
    }

    pub fn err(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            message: None,
            data: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
        }
    }
}

fn done(message: impl Into<String>) -> warp::reply::Json {
    warp::reply::json(&ApiResponse::<()>::ok(message, None))
}

#[derive(Debug, Serialize)]
struct StatusResponse {
    message: &'static str,
}

pub async fn status() -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::json(&StatusResponse {
        message: "Portfolio API is running",
    }))
}

// region public

pub async fn get_portfolio(
    portfolio_service: Arc<dyn PortfolioService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let portfolio = portfolio_service
        .get()
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&portfolio))
}

pub async fn download_document(
    kind: String,
    document_service: Arc<dyn DocumentService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let download = document_service
        .resolve_download(&kind)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    debug!(%kind, filename = %download.filename, "serving document");
    let disposition = format!(
        "attachment; filename=\"{}\"",
        header_safe_filename(&download.filename)
    );
    let disposition = HeaderValue::from_str(&disposition)
        .map_err(ApiErrorCode::internal)
        .map_err(reject::custom)?;

    let body = warp::hyper::Body::wrap_stream(ReaderStream::new(download.source));
    let mut response = warp::reply::Response::new(body);
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(download.content_type));
    headers.insert(CONTENT_DISPOSITION, disposition);
    Ok(response)
}

fn header_safe_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect()
}

// endregion

// region auth

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: AccessToken,
    pub message: &'static str,
    pub expires_at: DateTime<Utc>,
}

pub async fn login(
    body: LoginRequest,
    auth_service: Arc<dyn AuthService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let login_input = LoginInput {
        username: body.username,
        password: body.password,
    };
    let login_result = auth_service
        .login(login_input)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    info!(username = %login_result.username, "admin logged in");
    Ok(warp::reply::json(&LoginResponse {
        token: login_result.token,
        message: "Login successful",
        expires_at: login_result.expires_at,
    }))
}

#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    pub valid: bool,
    pub username: String,
}

pub async fn verify(username: String) -> Result<impl warp::Reply, warp::Rejection> {
    Ok(warp::reply::json(&VerifyResponse {
        valid: true,
        username,
    }))
}

// endregion

// region admin portfolio

pub async fn update_personal_info(
    _admin: String,
    body: PersonalInfo,
    portfolio_service: Arc<dyn PortfolioService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    portfolio_service
        .replace_personal_info(body)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(done("Personal info updated successfully"))
}

pub async fn update_social_links(
    _admin: String,
    body: SocialLinks,
    portfolio_service: Arc<dyn PortfolioService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    portfolio_service
        .replace_social_links(body)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(done("Social links updated successfully"))
}

fn decode_item(list: ListName, body: serde_json::Value) -> Result<ListItem, warp::Rejection> {
    ListItem::from_json(list, body)
        .map_err(|e| ApiErrorCode::InvalidInput(e.to_string()))
        .map_err(reject::custom)
}

pub async fn add_list_item(
    list: ListName,
    _admin: String,
    body: serde_json::Value,
    portfolio_service: Arc<dyn PortfolioService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let item = decode_item(list, body)?;
    let added = portfolio_service
        .append_list_item(item)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let message = format!("{} added successfully", list.label());
    Ok(warp::reply::json(&ApiResponse::ok(message, Some(added))))
}

pub async fn update_list_item(
    list: ListName,
    id: String,
    _admin: String,
    body: serde_json::Value,
    portfolio_service: Arc<dyn PortfolioService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let item = decode_item(list, body)?;
    let updated = portfolio_service
        .replace_list_item(list, &ItemId(id), item)
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    let message = format!("{} updated successfully", list.label());
    Ok(warp::reply::json(&ApiResponse::ok(message, Some(updated))))
}

pub async fn delete_list_item(
    list: ListName,
    id: String,
    _admin: String,
    portfolio_service: Arc<dyn PortfolioService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    portfolio_service
        .remove_list_item(list, &ItemId(id))
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(done(format!("{} deleted successfully", list.label())))
}

// endregion

// region admin documents

pub async fn get_documents(
    _admin: String,
    document_service: Arc<dyn DocumentService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let registry = document_service
        .get()
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::json(&registry))
}

pub async fn upload_documents(
    admin: String,
    form: FormData,
    document_service: Arc<dyn DocumentService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    debug!(%admin, "upload received");
    let report = document_service
        .store_files(upload_stream(form))
        .await
        .map_err(ApiErrorCode::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::json(&ApiResponse::ok(
        "Files uploaded successfully",
        Some(report),
    )))
}

/// File parts whose field name is one of the registry slots, each streamed straight
/// from the request body. Other parts are skipped.
fn upload_stream(form: FormData) -> UploadStream {
    form.map_err(|e| DocumentError::MalformedUpload(e.to_string()))
        .try_filter_map(|part| future::ready(Ok(uploaded_file(part))))
        .boxed()
}

fn uploaded_file(part: Part) -> Option<UploadedFile> {
    let Some(slot) = DocumentSlot::from_field_name(part.name()) else {
        debug!(field = part.name(), "ignoring unknown upload field");
        return None;
    };
    let filename = part.filename()?.to_string();
    let content_type = part.content_type().map(str::to_string);

    let bytes = part
        .stream()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e));
    let source: ByteSource = Box::pin(StreamReader::new(bytes));
    Some(UploadedFile {
        slot,
        filename,
        content_type,
        source,
    })
}

// endregion

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_filename_is_quoted_safely() {
        assert_eq!(header_safe_filename("cv.pdf"), "cv.pdf");
        assert_eq!(header_safe_filename("my \"best\" cv.pdf"), "my _best_ cv.pdf");
        assert_eq!(header_safe_filename("résumé.pdf"), "r_sum_.pdf");
    }

    #[test]
    fn error_body_has_no_data() {
        let body = serde_json::to_value(ApiResponse::<()>::err(
            ApiErrorCode::NoFilesProvided,
            "No files uploaded",
        ))
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "success": false,
                "error": {"code": "NoFilesProvided", "message": "No files uploaded"}
            })
        );
    }
}
