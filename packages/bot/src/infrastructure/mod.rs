//! Infrastructure layer: implementations of the domain ports.

pub mod dto;
pub mod gateway;
pub mod repository;
pub mod store;
