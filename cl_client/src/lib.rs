//! Internal modules for the Cee-Lo terminal client.
//!
//! This library provides command parsing, configuration, and view rendering
//! used by the cl_client binary.

pub mod commands;
pub mod config;
pub mod render;
