//! Library entry point for the slimzip CLI.

pub mod archive;
pub mod commands;
pub mod config;
pub mod error;
pub mod installer;
pub mod json_config;
pub mod manifest;
pub mod model;
pub mod pipeline;
pub mod prune;
pub mod utils;
