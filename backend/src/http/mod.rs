//! HTTP server module for the review scheduler.
//!
//! This module provides an axum-based HTTP server that exposes the engine as a
//! REST API.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                               │
//! │  - Path/JSON extraction                                   │
//! │  - Error category -> status code mapping                  │
//! │  - CORS, compression, tracing                             │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │  windows, now, attempt limits
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Engine (services/)                                       │
//! │  - Slot generation, gating, batch commits                 │
//! │  - Guide balancing, panel resolution                      │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │  conditional writes
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Store (db/)                                              │
//! │  - LocalRepository                                        │
//! └──────────────────────────────────────────────────────────┘
//! ```

#[cfg(feature = "http-server")]
pub mod handlers;

#[cfg(feature = "http-server")]
pub mod router;

#[cfg(feature = "http-server")]
pub mod state;

#[cfg(feature = "http-server")]
pub mod error;

#[cfg(feature = "http-server")]
pub mod dto;

#[cfg(feature = "http-server")]
pub use router::create_router;

#[cfg(feature = "http-server")]
pub use state::AppState;
