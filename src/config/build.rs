//! `[build]` section configuration.
//!
//! Static export settings: output and asset directories, minification.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in vitrine.toml.
///
/// # Example
/// ```toml
/// [build]
/// output = "public"   # Exported HTML lands here
/// assets = "assets"   # Copied verbatim to <output>/assets
/// minify = true
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Project root; set from the CLI, never read from the file.
    #[serde(skip)]
    #[educe(Default = defaults::build::root())]
    pub root: Option<PathBuf>,

    #[serde(default = "defaults::build::output")]
    #[educe(Default = defaults::build::output())]
    pub output: PathBuf,

    #[serde(default = "defaults::build::assets")]
    #[educe(Default = defaults::build::assets())]
    pub assets: PathBuf,

    /// Minify exported HTML.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub minify: bool,

    /// Remove the output directory before exporting.
    #[serde(default = "defaults::r#false")]
    #[educe(Default = false)]
    pub clean: bool,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;
    use std::path::PathBuf;

    #[test]
    fn test_build_config() {
        let config = r#"
            [site]
            title = "Test"

            [build]
            output = "dist"
            assets = "static"
            minify = false
            clean = true
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.build.output, PathBuf::from("dist"));
        assert_eq!(config.build.assets, PathBuf::from("static"));
        assert!(!config.build.minify);
        assert!(config.build.clean);
    }

    #[test]
    fn test_build_config_defaults() {
        let config = r#"
            [site]
            title = "Test"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.build.output, PathBuf::from("public"));
        assert_eq!(config.build.assets, PathBuf::from("assets"));
        assert!(config.build.minify);
        assert!(!config.build.clean);
        assert!(config.build.root.is_none());
    }

    #[test]
    fn test_root_not_read_from_file() {
        let config = r#"
            [site]
            title = "Test"
            [build]
            root = "/elsewhere"
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);
        assert!(result.is_err());
    }
}
