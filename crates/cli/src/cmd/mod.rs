//! CLI command implementations

pub mod config;
pub mod edit;
pub mod init;
pub mod show;
pub mod week;
