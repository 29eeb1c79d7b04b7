//! `[site]` section configuration.
//!
//! Site-wide metadata rendered into every page: title, description, language.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};

/// `[site]` section in vitrine.toml.
///
/// # Example
/// ```toml
/// [site]
/// title = "Northwind Advisory"
/// description = "Independent experts for hard problems"
/// url = "https://northwind.example"
/// language = "en"
/// stylesheets = ["/assets/site.css"]
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteMeta {
    /// Site title, appended to every page title.
    pub title: String,

    /// Description for the `<meta name="description">` tag and the home page.
    #[serde(default)]
    pub description: String,

    /// Canonical base URL of the deployed site.
    #[serde(default = "defaults::site::url")]
    #[educe(Default = defaults::site::url())]
    pub url: Option<String>,

    /// BCP 47 language code for `<html lang>`.
    #[serde(default = "defaults::site::language")]
    #[educe(Default = defaults::site::language())]
    pub language: String,

    /// Footer copyright line. Empty hides the footer text.
    #[serde(default)]
    pub copyright: String,

    /// Stylesheet hrefs linked from every page, in order.
    #[serde(default)]
    pub stylesheets: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::super::SiteConfig;

    #[test]
    fn test_site_config_full() {
        let config = r#"
            [site]
            title = "Northwind"
            description = "Independent experts"
            url = "https://northwind.example"
            language = "en-GB"
            copyright = "2026 Northwind"
            stylesheets = ["/assets/site.css", "/assets/print.css"]
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.site.title, "Northwind");
        assert_eq!(config.site.description, "Independent experts");
        assert_eq!(config.site.url.as_deref(), Some("https://northwind.example"));
        assert_eq!(config.site.language, "en-GB");
        assert_eq!(config.site.copyright, "2026 Northwind");
        assert_eq!(config.site.stylesheets.len(), 2);
    }

    #[test]
    fn test_site_config_defaults() {
        let config = r#"
            [site]
            title = "Test"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.site.description, "");
        assert_eq!(config.site.language, "en");
        assert_eq!(config.site.url, None);
        assert!(config.site.stylesheets.is_empty());
    }

    #[test]
    fn test_unknown_field_rejection() {
        let config = r#"
            [site]
            title = "Test"
            author = "nobody"
        "#;
        let result: Result<SiteConfig, _> = toml::from_str(config);

        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("unknown field"));
    }

    #[test]
    fn test_site_config_unicode() {
        let config = r#"
            [site]
            title = "Beratung & Co 🚀"
            language = "de"
        "#;
        let config: SiteConfig = toml::from_str(config).unwrap();

        assert_eq!(config.site.title, "Beratung & Co 🚀");
        assert_eq!(config.site.language, "de");
    }
}
