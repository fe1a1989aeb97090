//! One-time plugin registration
//!
//! Installs the process-wide binding defaults. The first registration wins;
//! later calls are no-ops that return the installed plugin.

use crate::config::UnveilConfig;
use std::sync::OnceLock;

static PLUGIN: OnceLock<ScrollPlugin> = OnceLock::new();

/// The installed scroll plugin
#[derive(Debug)]
pub struct ScrollPlugin {
    config: UnveilConfig,
}

impl ScrollPlugin {
    pub fn config(&self) -> &UnveilConfig {
        &self.config
    }
}

/// Register with the built-in defaults
pub fn register() -> &'static ScrollPlugin {
    PLUGIN.get_or_init(|| {
        tracing::debug!("scroll plugin registered with built-in defaults");
        ScrollPlugin {
            config: UnveilConfig::default(),
        }
    })
}

/// Register with custom defaults
///
/// Has no effect if a plugin is already installed.
pub fn register_with(config: UnveilConfig) -> &'static ScrollPlugin {
    let mut installed = false;
    let plugin = PLUGIN.get_or_init(|| {
        installed = true;
        ScrollPlugin { config }
    });
    if installed {
        tracing::debug!("scroll plugin registered");
    } else {
        tracing::debug!("scroll plugin already registered, keeping existing defaults");
    }
    plugin
}

pub fn is_registered() -> bool {
    PLUGIN.get().is_some()
}

/// The installed defaults, registering first if needed
pub fn defaults() -> &'static UnveilConfig {
    &register().config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_is_idempotent() {
        let first = register();
        let second = register();
        assert!(std::ptr::eq(first, second));
        assert!(is_registered());

        let again = register_with(UnveilConfig::default());
        assert!(std::ptr::eq(first, again));
    }
}
