//! Environment variable handling.

use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Environment variable names read by SecureDefaults.
pub mod vars {
    /// Home directory override (default `~/.securedefaults`).
    pub const SECUREDEFAULTS_HOME: &str = "SECUREDEFAULTS_HOME";

    /// Config file override.
    pub const SECUREDEFAULTS_CONFIG: &str = "SECUREDEFAULTS_CONFIG";

    /// Log filter directive for the CLI.
    pub const SECUREDEFAULTS_LOG: &str = "SECUREDEFAULTS_LOG";

    /// Store password for non-interactive use.
    pub const SECUREDEFAULTS_PASSWORD: &str = "SECUREDEFAULTS_PASSWORD";
}
