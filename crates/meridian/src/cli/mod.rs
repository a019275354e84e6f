//! CLI module for Meridian
//!
//! Commands read definition files (TOML), exported schemas and value
//! documents (JSON). None of them keep state beyond the config file and logs
//! under the Meridian home directory.

pub mod check;
pub mod config;
pub mod error;
pub mod output;
pub mod schema;
