//! StudiHub - campus learning portal and template marketplace
//!
//! This library provides the core functionality for the StudiHub portal:
//! the backend client, the data gateway, the page controller, and the
//! HTTP layer that serves the rendered page.

pub mod api;
pub mod app;
pub mod backend;
pub mod config;
pub mod gateway;
pub mod models;
