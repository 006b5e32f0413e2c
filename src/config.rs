//! Configuration to acknowledge authoring preferences as well as set defaults.
//!
//! Specifically, we try to find a rubric.toml, and if present we load settings
//! from there. This provides the fallback language codes applied to imported
//! chapters that omit them.

use facet::Facet;
use std::fs;

#[derive(Facet, Clone)]
/// User preferences loaded from rubric.toml or falling back to defaults.
pub struct Config {
    #[facet(default = "de".to_string())]
    /// Language code assigned to chapters that omit `primaryLanguage`.
    pub primary_language: String,
    #[facet(default = "ru".to_string())]
    /// Language code assigned to chapters that omit `secondaryLanguage`.
    pub secondary_language: String,
}

impl Config {
    #[must_use]
    /// Load configuration from rubric.toml if present.
    ///
    /// # Panics
    ///
    /// Panics if the default configuration cannot be parsed.
    pub fn load() -> Self {
        if let Ok(contents) = fs::read_to_string("rubric.toml") {
            if let Ok(config) = facet_toml::from_str::<Self>(&contents) {
                return config;
            }
        }
        facet_toml::from_str::<Self>("").unwrap()
    }
}

impl Default for Config {
    /// The built-in defaults, equivalent to an empty rubric.toml.
    fn default() -> Self {
        facet_toml::from_str::<Self>("").unwrap()
    }
}
