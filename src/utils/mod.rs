//! Shared utilities: JSON extraction from collaborator output and
//! environment-based configuration.

pub mod config;
pub mod json;
