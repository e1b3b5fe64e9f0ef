//! Tubely API Library
//!
//! HTTP handlers, authentication and application setup for the upload service.

mod api_doc;
mod telemetry;
mod utils;

pub mod auth;
pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;

pub use api_doc::{get_openapi_spec, ApiDoc};
pub use error::ErrorResponse;
pub use state::AppState;
