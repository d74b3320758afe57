//! TempVoice: temporary voice rooms driven by a platform gateway bridge.
//!
//! Layers:
//! - `domain`: rooms, access-control rules, and the ports below
//! - `infrastructure`: JSON file store, in-memory registry, WebSocket gateway
//! - `usecase`: lifecycle controller, access-control engine, input collector
//! - `ui`: axum server (bridge endpoint and HTTP API)

pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
