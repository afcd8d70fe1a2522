/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `admin`: Hit count page and dev-mode reset
/// - `users`: Registration and credential changes
/// - `auth`: Login, access token refresh and refresh token revocation
/// - `chirps`: Chirp CRUD
/// - `webhooks`: Payment provider events

pub mod admin;
pub mod auth;
pub mod chirps;
pub mod health;
pub mod users;
pub mod webhooks;
