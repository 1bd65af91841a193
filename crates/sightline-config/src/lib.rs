//! Configuration management for Sightline
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. Environment variables (SLN_* prefix, highest precedence)
//! 2. sightline.local.toml (gitignored, local overrides)
//! 3. sightline.toml (git-tracked, project config)
//! 4. ~/.config/sightline/config.toml (user defaults)
//! 5. Built-in defaults (lowest precedence)

use serde::{Deserialize, Serialize};

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main Sightline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SightlineConfig {
    pub authority: AuthorityConfig,
    pub hierarchy: HierarchyConfig,
}

/// Elevated-role policy for the resolver's global-visibility override.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorityConfig {
    /// Role tags conferring global visibility. Matched case-insensitively
    /// after trimming, so the casing here is cosmetic.
    pub elevated_roles: Vec<String>,
}

impl Default for AuthorityConfig {
    fn default() -> Self {
        Self {
            elevated_roles: vec!["admin".to_string(), "director".to_string()],
        }
    }
}

/// Bounds on hierarchy traversal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    /// Hard bound on manager-chain depth; the visited set already stops
    /// cycles, this caps pathological-but-acyclic chains.
    pub max_depth: usize,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}
