//! Core domain + application logic for the image relay bot.
//!
//! This crate is framework-agnostic. The Discord gateway and REST client live
//! behind the `PlatformPort` trait, implemented in the adapter crate.

pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod logging;
pub mod moderation;
pub mod ports;
pub mod relay;
pub mod router;
pub mod security;

#[cfg(test)]
mod fake;

pub use errors::{Error, Result};
