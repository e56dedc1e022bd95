mod auth_service;
mod document_service;
mod portfolio_service;

pub use auth_service::*;
pub use document_service::*;
pub use portfolio_service::*;
