//! Redis-backed refresh-token store for RideMatch.
//!
//! [`RedisTokenStore`] implements [`ridematch_auth::RefreshTokenStore`] on a
//! multiplexed [`redis::aio::ConnectionManager`]. The manager is opened on
//! first use and reconnects on its own after a dropped connection.

mod error;
mod store;

pub use error::{Error, Result};
pub use store::{RedisTokenStore, SCAN_BATCH};
