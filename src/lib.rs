//! Aula - Content catalog service for courses, news and materials
//!
//! This library provides the catalog engine (slugs, filtering, highlights,
//! visibility gating, pagination and the listing state machine) together with
//! the configuration, persistence, caching and HTTP layers that serve it.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
