//! Metric Relay Service - pushes stored metrics to WebSocket subscribers.

pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

pub use startup::{build_router, AppState, Application};
