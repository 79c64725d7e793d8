//! HTTP API surface for the MPK member roster.
//!
//! # Responsibility
//! - Map JSON requests onto `mpk_core` services and back.
//! - Translate service errors into HTTP status codes.
//!
//! # Invariants
//! - Validation failures are client errors (400), never 5xx.
//! - Storage failures are reported as 500 without retries.

pub mod config;
mod error;
mod handlers;
mod payload;
mod router;
mod server;
mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ErrorResponse};
pub use payload::{member_ids_input, raw_member_id};
pub use router::create_router;
pub use server::{serve, ServerError};
pub use state::AppState;
