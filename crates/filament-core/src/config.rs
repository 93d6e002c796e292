//! Engine configuration.
//!
//! One `ReactiveConfig` is active per thread. Hosts install it once at
//! startup with [`configure`]; the engine only ever reads it.

use std::cell::Cell;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Host-provided switches consulted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactiveConfig {
    /// Non-interactive render pass: `observe` creates no new observers.
    pub server_rendering: bool,

    /// Development build: emit misuse diagnostics and run field diagnostic hooks.
    pub diagnostics: bool,

    /// Largest length `set` may grow an array to by writing past its end.
    pub max_array_len: usize,
}

/// Default for [`ReactiveConfig::max_array_len`].
pub const DEFAULT_MAX_ARRAY_LEN: usize = 1 << 24;

impl Default for ReactiveConfig {
    fn default() -> Self {
        Self {
            server_rendering: false,
            diagnostics: true,
            max_array_len: DEFAULT_MAX_ARRAY_LEN,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid reactive config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ReactiveConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Production preset: no diagnostics.
    pub fn production() -> Self {
        Self {
            diagnostics: false,
            ..Self::default()
        }
    }
}

thread_local! {
    static CONFIG: Cell<ReactiveConfig> = Cell::new(ReactiveConfig::default());
}

/// Install `config` for the current thread.
pub fn configure(config: ReactiveConfig) {
    CONFIG.with(|c| c.set(config));
}

/// The configuration currently in effect.
pub fn config() -> ReactiveConfig {
    CONFIG.with(|c| c.get())
}
