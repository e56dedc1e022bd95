use super::error::*;
use super::handler;
use crate::application_impl::AccessGate;
use crate::domain_model::ListName;
use crate::server::*;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::HeaderMap;
use warp::http::header::{AUTHORIZATION, HeaderValue};
use warp::{Filter, reject};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    public_routes(server.clone())
        .or(auth_routes(server.clone()))
        .or(portfolio_admin_routes(server.clone()))
        .or(document_admin_routes(server))
}

fn public_routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let status = warp::path::end()
        .and(warp::get())
        .and_then(handler::status);

    let portfolio = warp::path!("portfolio")
        .and(warp::get())
        .and(with(server.portfolio_service.clone()))
        .and_then(handler::get_portfolio);

    let download = warp::path!("documents" / "download" / String)
        .and(warp::get())
        .and(with(server.document_service.clone()))
        .and_then(handler::download_document);

    status.or(portfolio).or(download)
}

fn auth_routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let login = warp::path!("auth" / "login")
        .and(warp::post())
        .and(warp::body::json())
        .and(with(server.auth_service.clone()))
        .and_then(handler::login);

    let verify = warp::path!("auth" / "verify")
        .and(warp::post())
        .and(with_verification(server.access_gate.clone()))
        .and_then(handler::verify);

    login.or(verify)
}

fn portfolio_admin_routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let personal = warp::path!("admin" / "portfolio" / "personal")
        .and(warp::put())
        .and(with_verification(server.access_gate.clone()))
        .and(warp::body::json())
        .and(with(server.portfolio_service.clone()))
        .and_then(handler::update_personal_info);

    let social_links = warp::path!("admin" / "portfolio" / "social-links")
        .and(warp::put())
        .and(with_verification(server.access_gate.clone()))
        .and(warp::body::json())
        .and(with(server.portfolio_service.clone()))
        .and_then(handler::update_social_links);

    let add_item = warp::path!("admin" / "portfolio" / ListName)
        .and(warp::post())
        .and(with_verification(server.access_gate.clone()))
        .and(warp::body::json())
        .and(with(server.portfolio_service.clone()))
        .and_then(handler::add_list_item);

    let update_item = warp::path!("admin" / "portfolio" / ListName / String)
        .and(warp::put())
        .and(with_verification(server.access_gate.clone()))
        .and(warp::body::json())
        .and(with(server.portfolio_service.clone()))
        .and_then(handler::update_list_item);

    let delete_item = warp::path!("admin" / "portfolio" / ListName / String)
        .and(warp::delete())
        .and(with_verification(server.access_gate.clone()))
        .and(with(server.portfolio_service.clone()))
        .and_then(handler::delete_list_item);

    personal
        .or(social_links)
        .or(add_item)
        .or(update_item)
        .or(delete_item)
}

fn document_admin_routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let documents = warp::path!("admin" / "documents")
        .and(warp::get())
        .and(with_verification(server.access_gate.clone()))
        .and(with(server.document_service.clone()))
        .and_then(handler::get_documents);

    let upload = warp::path!("admin" / "documents" / "upload")
        .and(warp::post())
        .and(with_verification(server.access_gate.clone()))
        .and(warp::multipart::form().max_length(server.upload_limit))
        .and(with(server.document_service.clone()))
        .and_then(handler::upload_documents);

    documents.or(upload)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

/// Runs before any body is read; yields the admin username.
fn with_verification(
    access_gate: AccessGate,
) -> impl Filter<Extract = (String,), Error = warp::Rejection> + Clone {
    warp::header::headers_cloned().and_then(move |headers: HeaderMap| {
        let access_gate = access_gate.clone();
        async move {
            let authorization = headers.get(AUTHORIZATION).map(HeaderValue::as_bytes);
            access_gate
                .authenticate_header(authorization)
                .await
                .map_err(ApiErrorCode::from)
                .map_err(reject::custom)
        }
    })
}
