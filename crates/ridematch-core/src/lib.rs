//! RideMatch Core: shared types, settings, schemas, and validation.
//!
//! This crate provides the foundational types used across all RideMatch
//! crates. It has no internal RideMatch dependencies (dependency level 0).
//!
//! # Modules
//!
//! - [`error`]: Error types and Result alias
//! - [`config`]: Layered service [`Settings`]
//! - [`dates`]: Age arithmetic
//! - [`user`]: The `users` domain model
//! - [`schemas`]: API request/response contracts
//! - [`validation`]: Field validators and the [`Validate`] trait

#![doc = include_str!("../README.md")]

pub mod config;
pub mod dates;
pub mod error;
pub mod schemas;
pub mod user;
pub mod validation;

mod proptests;

// Re-export key types at crate root for convenience
pub use config::Settings;
pub use error::{Error, Result};
pub use user::{NewUser, Preferences, ProfileChanges, RatingRole, User};
pub use validation::{FieldError, Validate, ValidationErrors};
