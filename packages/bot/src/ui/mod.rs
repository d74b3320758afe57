//! UI layer: the process surface (gateway bridge endpoint and HTTP API).

pub mod handler;
pub mod server;
pub mod signal;
pub mod state;

pub use server::Server;
pub use state::AppState;
