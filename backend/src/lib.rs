//! # Lesson Store Backend
//!
//! Catalog and order service for after-school lessons.
//!
//! The crate stores two collections of schemaless JSON documents: `lessons`
//! (the catalog, with stock in `availableSpaces`) and `orders` (customer
//! purchases). It exposes them over a small REST API built on Axum.
//!
//! ## Features
//!
//! - **Catalog**: list, add, and update stock of lessons
//! - **Orders**: place and list orders
//! - **Search**: case-insensitive substring search, numeric-aware
//! - **Static assets**: lesson images served from a configured directory
//! - **Pluggable storage**: in-memory or Postgres (JSONB) backends
//!
//! ## Architecture
//!
//! - [`api`]: Public types for crate consumers
//! - [`models`]: Documents, identifiers, lessons and search semantics
//! - [`routes`]: Route-specific payload validation
//! - [`db`]: Repository pattern, backends and service layer
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;

pub mod db;
pub mod models;

pub mod routes;

#[cfg(feature = "http-server")]
pub mod http;
