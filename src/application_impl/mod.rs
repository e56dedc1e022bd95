mod access_gate;
mod auth_service_fake;
mod auth_service_impl;
mod credential_store_impl;
mod document_service_impl;
mod portfolio_service_impl;
mod record_mutation;

pub use access_gate::*;
pub use auth_service_fake::*;
pub use auth_service_impl::*;
pub use credential_store_impl::*;
pub use document_service_impl::*;
pub use portfolio_service_impl::*;
