//! # Chirpy Shared Library
//!
//! This crate contains the authentication core, data models and storage layer
//! used by the Chirpy API server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, access tokens, credential extraction,
//!   refresh tokens and the ownership gate
//! - `models`: Database models and data structures
//! - `store`: Storage contract with PostgreSQL and in-memory backends
//! - `db`: Connection pooling and migrations
//! - `events`: Inbound webhook events
//! - `platform`: Deployment mode

pub mod auth;
pub mod db;
pub mod events;
pub mod models;
pub mod platform;
pub mod store;

/// Current version of the Chirpy shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
