//! # Todo API Server Library
//!
//! HTTP front end of the todo service. One binary serves either the JSON API
//! (bearer tokens) or the server-rendered pages (cookie token), chosen by
//! `APP_SURFACE`.
//!
//! ## Modules
//!
//! - `app`: Application state, router builder, bearer authentication layer
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `routes`: JSON API route handlers
//! - `session`: Request-scoped database session extractor
//! - `web`: HTML pages and form handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod session;
pub mod web;
