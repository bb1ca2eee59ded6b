//! # Review Scheduler
//!
//! Scheduling and assignment engine for academic project reviews.
//!
//! The crate turns coordinator-supplied time windows into bookable review
//! slots, commits team-to-slot assignments under uniqueness and prerequisite
//! constraints, and assigns guides and panels to teams under load-balancing
//! and conflict-of-interest rules. A REST surface is exposed via Axum.
//!
//! ## Architecture
//!
//! - [`models`]: Teams, guides, panels, review slots and schedule records
//! - [`config`]: TOML configuration with environment overrides
//! - [`db`]: Store traits, error type, in-memory store and the global handle
//! - [`services`]: The engine itself, one module per component
//! - [`api`]: Consolidated public types
//! - [`http`]: Axum-based HTTP server and request handlers
//!
//! ## Concurrency
//!
//! Operations are stateless. Writes are conditioned on the store revision that
//! was read during validation; a lost race re-runs validation from scratch a
//! bounded number of times before reporting a conflict.

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;
pub mod config;

pub mod db;
pub mod models;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
