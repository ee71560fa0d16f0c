//! Storefront CLI - client library for a headless Drupal Commerce backend
//!
//! Exposes the session, cart and checkout layers so the binary and the
//! integration tests share one implementation.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
