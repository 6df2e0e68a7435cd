//! JSON REST API for Sophia.
//!
//! Exposes an axum [`Router`] backed by any
//! [`sophia_core::store::ArgumentStore`]. Auth, TLS, CORS and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! let app = sophia_api::api_router(Arc::new(store));
//! ```

pub mod arguments;
pub mod error;

use std::sync::Arc;

use axum::{
  Router,
  http::{Method, Uri},
  routing::get,
};
use sophia_core::store::ArgumentStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: ArgumentStore + 'static,
{
  Router::new()
    .route(
      "/arguments",
      get(arguments::list::<S>).post(arguments::save::<S>),
    )
    .route(
      "/arguments/{id}",
      get(arguments::get_live::<S>)
        .patch(arguments::update::<S>)
        .delete(arguments::delete::<S>),
    )
    .route(
      "/arguments/{id}/version/{version}",
      get(arguments::get_version::<S>),
    )
    .fallback(unknown_route)
    .method_not_allowed_fallback(wrong_method)
    .with_state(store)
}

async fn unknown_route(uri: Uri) -> ApiError {
  ApiError::NotFound(format!("no resource at {}", uri.path()))
}

async fn wrong_method(method: Method) -> ApiError {
  ApiError::MethodNotAllowed(method.to_string())
}
