//! # securedefaults-core
//!
//! Shared configuration and utilities for SecureDefaults.
//!
//! This crate provides functionality used across all SecureDefaults crates:
//!
//! - **Configuration**: Loading, validation, and saving of the config file
//! - **Accessibility**: The vault accessibility policies a secret can carry
//! - **Utilities**: Path resolution, environment handling, zeroizing strings

pub mod accessibility;
pub mod config;
pub mod env;
pub mod error;
pub mod paths;
pub mod secret;

// Re-exports for convenience
pub use accessibility::Accessibility;
pub use config::Config;
pub use error::ConfigError;
pub use secret::SecretString;
