//! Shared test utilities for unit tests
//!
//! Integration tests in the root crate keep their own helpers in
//! `tests/common/mod.rs`, since `#[cfg(test)]` items are not visible to them.

use once_cell::sync::Lazy;
use std::env;

// Serializes tests that touch AWS_* environment variables
pub static ENV_MUTEX: Lazy<tokio::sync::Mutex<()>> = Lazy::new(|| tokio::sync::Mutex::new(()));

/// RAII guard that restores environment variables on drop, even on panic
pub struct EnvVarGuard {
    vars: Vec<(String, Option<String>)>,
}

impl EnvVarGuard {
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    /// Set a variable, remembering its original value
    pub fn set(&mut self, key: &str, value: &str) {
        self.remember(key);
        // env::set_var is unsafe since edition 2024
        unsafe {
            env::set_var(key, value);
        }
    }

    /// Remove a variable, remembering its original value
    pub fn remove(&mut self, key: &str) {
        self.remember(key);
        unsafe {
            env::remove_var(key);
        }
    }

    fn remember(&mut self, key: &str) {
        if self.vars.iter().all(|(k, _)| k != key) {
            self.vars.push((key.to_string(), env::var(key).ok()));
        }
    }
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        for (key, value) in self.vars.iter().rev() {
            unsafe {
                match value {
                    Some(v) => env::set_var(key, v),
                    None => env::remove_var(key),
                }
            }
        }
    }
}

impl Default for EnvVarGuard {
    fn default() -> Self {
        Self::new()
    }
}
