//! Utilities shared by the TempVoice crates: logging setup and clock abstraction.

pub mod logger;
pub mod time;
