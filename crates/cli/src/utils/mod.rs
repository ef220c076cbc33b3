//! Shared helpers for commands

pub mod config;
pub mod logger;
