//! Terrarium Core - Domain models, temporal utilities, ports, and configuration
//!
//! This crate contains the domain types shared by the geometry and remote
//! imagery crates, along with the port traits the remote adapters implement.

pub mod config;
pub mod error;
pub mod models;
pub mod ports;
pub mod temporal;

pub use error::{Result, TerrariumError};
