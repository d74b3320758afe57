//! Durable store implementations.
//!
//! - `json_file`: whole-registry JSON document on the local filesystem

pub mod json_file;

pub use json_file::JsonFileRoomStore;
