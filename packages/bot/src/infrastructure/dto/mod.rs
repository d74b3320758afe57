//! Data Transfer Objects (DTOs).
//!
//! DTOs are organized by protocol:
//! - `registry`: persisted room registry document
//! - `gateway`: gateway bridge WebSocket frames
//! - `http`: HTTP API response DTOs

pub mod conversion;
pub mod gateway;
pub mod http;
pub mod registry;
