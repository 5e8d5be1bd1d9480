//! # ridematch-api
//!
//! HTTP API server for the RideMatch auth service.
//!
//! - [`accounts`]: registration, login, token refresh/revocation, profiles
//! - [`routes`]: the axum route tree
//! - [`extract`]: validating body extractors and current-user extractors
//! - [`server`]: CORS, tracing, and the serve loop
//! - [`cli`]: the `ridematch-auth` command line

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod accounts;
pub mod cli;
pub mod error;
pub mod extract;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, Error, Result};
pub use server::app;
pub use state::AppState;
