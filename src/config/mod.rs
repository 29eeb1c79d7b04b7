//! Site configuration management for `vitrine.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                          |
//! |-------------|--------------------------------------------------|
//! | `[site]`    | Site metadata (title, description, language)     |
//! | `[store]`   | Content store connection (project, dataset, ...) |
//! | `[build]`   | Static export (output, assets, minify)           |
//! | `[serve]`   | Development server (interface, port)             |
//!
//! # Example
//!
//! ```toml
//! [site]
//! title = "Northwind Advisory"
//! description = "Independent experts for hard problems"
//!
//! [store]
//! project_id = "abc123xy"
//! dataset = "production"
//!
//! [build]
//! output = "public"
//! minify = true
//!
//! [serve]
//! port = 5277
//! ```

mod build;
pub mod defaults;
mod error;
mod serve;
mod site;
mod store;

pub use error::ConfigError;
pub use site::SiteMeta;
pub use store::{Perspective, StoreConfig};

use build::BuildConfig;
use serve::ServeConfig;

use crate::cli::{Cli, Commands};
use anyhow::{Result, bail};
use chrono::NaiveDate;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing vitrine.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Site metadata
    #[serde(default)]
    pub site: SiteMeta,

    /// Content store connection
    #[serde(default)]
    pub store: StoreConfig,

    /// Static export settings
    #[serde(default)]
    pub build: BuildConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl SiteConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: SiteConfig = toml::from_str(content).map_err(ConfigError::from)?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Get the root directory path
    pub fn get_root(&self) -> &Path {
        self.build.root.as_deref().unwrap_or(Path::new("./"))
    }

    /// Set the root directory path
    pub fn set_root(&mut self, path: &Path) {
        self.build.root = Some(path.to_path_buf())
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli
            .root
            .clone()
            .unwrap_or_else(|| self.get_root().to_owned());

        if let Some(export) = &cli.export {
            self.store.export = Some(export.clone());
        }

        match &cli.command {
            Commands::Build {
                clean,
                minify,
                output,
            } => {
                self.build.clean |= *clean;
                Self::update_option(&mut self.build.minify, minify.as_ref());
                Self::update_option(&mut self.build.output, output.as_ref());
            }
            Commands::Serve { interface, port } => {
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
                self.site.url = Some(format!(
                    "http://{}:{}",
                    self.serve.interface, self.serve.port
                ));
            }
            _ => {}
        }

        self.update_path_with_root(&root, &cli.config);
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve every configured path against the root and make it absolute
    fn update_path_with_root(&mut self, root: &Path, config_name: &Path) {
        let root = Self::normalize_path(root);
        self.set_root(&root);

        self.config_path = Self::normalize_path(&root.join(config_name));
        self.build.output = Self::normalize_path(&root.join(&self.build.output));
        self.build.assets = Self::normalize_path(&root.join(&self.build.assets));

        if let Some(export) = &self.store.export {
            let expanded = PathBuf::from(
                shellexpand::tilde(&export.to_string_lossy()).into_owned(),
            );
            self.store.export = Some(if expanded.is_relative() {
                Self::normalize_path(&root.join(expanded))
            } else {
                Self::normalize_path(&expanded)
            });
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration for the current command
    pub fn validate(&self, cli: &Cli) -> Result<()> {
        if !self.config_path.exists() {
            bail!("Config file not found");
        }

        if let Some(url) = &self.site.url
            && !url.starts_with("http")
        {
            bail!(ConfigError::Validation(
                "[site.url] must start with http:// or https://".into()
            ));
        }

        if cli.needs_store() {
            self.validate_store()?;
        }

        Ok(())
    }

    /// Check the `[store]` section; an export file replaces the remote settings.
    fn validate_store(&self) -> Result<()> {
        let store = &self.store;

        if let Some(export) = &store.export {
            if !export.is_file() {
                bail!(ConfigError::Validation(format!(
                    "[store.export] `{}` is not a file",
                    export.display()
                )));
            }
            return Ok(());
        }

        if store.project_id.is_empty() {
            bail!(ConfigError::Validation(
                "[store.project_id] is required unless [store.export] is set".into()
            ));
        }
        Self::check_identifier("[store.project_id]", &store.project_id)?;
        Self::check_identifier("[store.dataset]", &store.dataset)?;

        let version = store.api_version.trim_start_matches('v');
        if version != "1" && NaiveDate::parse_from_str(version, "%Y-%m-%d").is_err() {
            bail!(ConfigError::Validation(
                "[store.api_version] must be `1` or a date like `2023-05-03`".into()
            ));
        }

        Ok(())
    }

    /// Project and dataset names end up in a hostname and a URL path.
    fn check_identifier(field: &str, value: &str) -> Result<()> {
        let valid = !value.is_empty()
            && value
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
        if !valid {
            bail!(ConfigError::Validation(format!(
                "{field} may only contain a-z, 0-9, `-` and `_`"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
