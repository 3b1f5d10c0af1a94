//! # Playlist Bench Common Library
//!
//! Shared code for the playlist benchmark workspace:
//! - Error type and result alias
//! - TOML configuration loading and resolution
//! - Human-readable runtime formatting

pub mod config;
pub mod error;
pub mod human_time;

pub use error::{Error, Result};
