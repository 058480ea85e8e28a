//! # relay-core
//!
//! Core types, text normalization, message shaping, configuration, and error
//! handling for relay.

pub mod config;
pub mod error;
pub mod format;
pub mod message;
pub mod normalize;
pub mod traits;

pub use config::{redact_url, shellexpand};
