//! Platform gateway implementations.
//!
//! - `websocket`: commands relayed to a gateway bridge connected over WebSocket

pub mod websocket;

pub use websocket::{BridgeSender, WebSocketGateway};
