//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads and writes the TOML settings file and turns
//! it into the immutable `ServerConfig` the facade is built from.  Queued
//! items and the outbound snapshot are never persisted.

pub mod config;
