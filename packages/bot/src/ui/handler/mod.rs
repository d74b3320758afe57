//! Request handlers.

mod gateway;
mod http;

pub use gateway::gateway_handler;
pub use http::{get_guild_rooms, health_check};
