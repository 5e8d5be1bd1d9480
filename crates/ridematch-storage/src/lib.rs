//! # ridematch-storage
//!
//! User storage backends for RideMatch.
//!
//! - [`UserStore`]: the storage abstraction the account service uses
//! - [`PgUserStore`]: PostgreSQL via sqlx
//! - [`MemoryUserStore`]: in-memory, for tests and `serve --memory`
//! - [`migrations`]: the embedded, reversible schema migrations

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod database;
pub mod error;
pub mod memory;
pub mod migrations;
pub mod traits;

pub use database::PgUserStore;
pub use error::{Error, Result};
pub use memory::MemoryUserStore;
pub use traits::UserStore;
