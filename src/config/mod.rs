//! Configuration management
//!
//! This module handles loading and parsing configuration for the catalog service.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};

use crate::models::ContentDomain;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Catalog engine configuration
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin (for cookie-based sessions)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:3000".to_string()
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database driver (sqlite or mysql)
    #[serde(default)]
    pub driver: DatabaseDriver,
    /// Database connection URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: DatabaseDriver::default(),
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/aula.db".to_string()
}

/// Database driver type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    /// SQLite (default)
    #[default]
    Sqlite,
    /// MySQL
    Mysql,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache TTL in seconds
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// Maximum number of cached entries
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
            max_capacity: default_max_capacity(),
        }
    }
}

fn default_ttl() -> u64 {
    300
}

fn default_max_capacity() -> u64 {
    1_000
}

/// Catalog engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Number of items an anonymous caller may see
    #[serde(default = "default_anonymous_limit")]
    pub anonymous_limit: usize,
    /// Maximum size of the featured widget
    #[serde(default = "default_highlight_limit")]
    pub highlight_limit: usize,
    /// Optional wall-clock timeout on repository fetches, in milliseconds
    #[serde(default)]
    pub fetch_timeout_ms: Option<u64>,
    /// Display name for dangling category references
    #[serde(default = "default_category_name")]
    pub default_category_name: String,
    /// Display name for absent or dangling level references
    #[serde(default = "default_level_name")]
    pub default_level_name: String,
    /// Fixed page size per domain
    #[serde(default)]
    pub page_sizes: PageSizes,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            anonymous_limit: default_anonymous_limit(),
            highlight_limit: default_highlight_limit(),
            fetch_timeout_ms: None,
            default_category_name: default_category_name(),
            default_level_name: default_level_name(),
            page_sizes: PageSizes::default(),
        }
    }
}

fn default_anonymous_limit() -> usize {
    3
}

fn default_highlight_limit() -> usize {
    5
}

fn default_category_name() -> String {
    "General".to_string()
}

fn default_level_name() -> String {
    "Nivel".to_string()
}

/// Page size per content domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSizes {
    #[serde(default = "default_courses_page_size")]
    pub courses: u32,
    #[serde(default = "default_news_page_size")]
    pub news: u32,
    #[serde(default = "default_materials_page_size")]
    pub materials: u32,
}

impl Default for PageSizes {
    fn default() -> Self {
        Self {
            courses: default_courses_page_size(),
            news: default_news_page_size(),
            materials: default_materials_page_size(),
        }
    }
}

fn default_courses_page_size() -> u32 {
    6
}

fn default_news_page_size() -> u32 {
    5
}

fn default_materials_page_size() -> u32 {
    6
}

impl PageSizes {
    pub fn for_domain(&self, domain: ContentDomain) -> u32 {
        match domain {
            ContentDomain::Courses => self.courses,
            ContentDomain::News => self.news,
            ContentDomain::Materials => self.materials,
        }
    }
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - AULA_SERVER_HOST
    /// - AULA_SERVER_PORT
    /// - AULA_SERVER_CORS_ORIGIN
    /// - AULA_DATABASE_DRIVER
    /// - AULA_DATABASE_URL
    /// - AULA_CACHE_TTL_SECONDS
    /// - AULA_CATALOG_ANONYMOUS_LIMIT
    /// - AULA_CATALOG_HIGHLIGHT_LIMIT
    /// - AULA_CATALOG_FETCH_TIMEOUT_MS
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject values the catalog cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        for domain in ContentDomain::ALL {
            if self.catalog.page_sizes.for_domain(domain) == 0 {
                return Err(ConfigError::ValidationError(format!(
                    "catalog.page_sizes.{} must be at least 1",
                    domain
                )));
            }
        }
        if self.catalog.highlight_limit == 0 {
            return Err(ConfigError::ValidationError(
                "catalog.highlight_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("AULA_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("AULA_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("AULA_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        if let Ok(driver) = std::env::var("AULA_DATABASE_DRIVER") {
            match driver.to_lowercase().as_str() {
                "sqlite" => self.database.driver = DatabaseDriver::Sqlite,
                "mysql" => self.database.driver = DatabaseDriver::Mysql,
                _ => {} // Ignore invalid values
            }
        }
        if let Ok(url) = std::env::var("AULA_DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(ttl) = std::env::var("AULA_CACHE_TTL_SECONDS") {
            if let Ok(ttl) = ttl.parse::<u64>() {
                self.cache.ttl_seconds = ttl;
            }
        }

        if let Ok(limit) = std::env::var("AULA_CATALOG_ANONYMOUS_LIMIT") {
            if let Ok(limit) = limit.parse::<usize>() {
                self.catalog.anonymous_limit = limit;
            }
        }
        if let Ok(limit) = std::env::var("AULA_CATALOG_HIGHLIGHT_LIMIT") {
            if let Ok(limit) = limit.parse::<usize>() {
                self.catalog.highlight_limit = limit;
            }
        }
        if let Ok(timeout) = std::env::var("AULA_CATALOG_FETCH_TIMEOUT_MS") {
            if let Ok(timeout) = timeout.parse::<u64>() {
                self.catalog.fetch_timeout_ms = Some(timeout);
            }
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for all config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());


/// Property-based tests for configuration parsing
#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn valid_page_sizes_strategy() -> impl Strategy<Value = PageSizes> {
        (1..50u32, 1..50u32, 1..50u32).prop_map(|(courses, news, materials)| PageSizes {
            courses,
            news,
            materials,
        })
    }

    fn valid_catalog_strategy() -> impl Strategy<Value = CatalogConfig> {
        (
            0..10usize,
            1..10usize,
            prop::option::of(1..10_000u64),
            "[A-Za-z ]{1,20}",
            "[A-Za-z ]{1,20}",
            valid_page_sizes_strategy(),
        )
            .prop_map(
                |(anonymous_limit, highlight_limit, fetch_timeout_ms, category, level, page_sizes)| {
                    CatalogConfig {
                        anonymous_limit,
                        highlight_limit,
                        fetch_timeout_ms,
                        default_category_name: category,
                        default_level_name: level,
                        page_sizes,
                    }
                },
            )
    }

    fn valid_config_strategy() -> impl Strategy<Value = Config> {
        (
            "[a-z0-9.]{1,20}",
            1024..65535u16,
            prop_oneof![Just(DatabaseDriver::Sqlite), Just(DatabaseDriver::Mysql)],
            1..86_400u64,
            valid_catalog_strategy(),
        )
            .prop_map(|(host, port, driver, ttl_seconds, catalog)| Config {
                server: ServerConfig {
                    host,
                    port,
                    cors_origin: default_cors_origin(),
                },
                database: DatabaseConfig {
                    driver,
                    url: default_database_url(),
                },
                cache: CacheConfig {
                    ttl_seconds,
                    max_capacity: default_max_capacity(),
                },
                catalog,
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        /// Serializing a valid config to YAML and loading it back yields the same values.
        #[test]
        fn property_config_roundtrip(config in valid_config_strategy()) {
            let yaml = serde_yaml::to_string(&config).expect("Failed to serialize config");

            let mut file = NamedTempFile::new().expect("Failed to create temp file");
            write!(file, "{}", yaml).expect("Failed to write config");

            let parsed = Config::load(file.path()).expect("Failed to parse config");

            prop_assert_eq!(config.server.host, parsed.server.host);
            prop_assert_eq!(config.server.port, parsed.server.port);
            prop_assert_eq!(config.database.driver, parsed.database.driver);
            prop_assert_eq!(config.cache.ttl_seconds, parsed.cache.ttl_seconds);
            prop_assert_eq!(config.catalog.anonymous_limit, parsed.catalog.anonymous_limit);
            prop_assert_eq!(config.catalog.highlight_limit, parsed.catalog.highlight_limit);
            prop_assert_eq!(config.catalog.fetch_timeout_ms, parsed.catalog.fetch_timeout_ms);
            prop_assert_eq!(config.catalog.page_sizes, parsed.catalog.page_sizes);
        }

        /// Malformed YAML always produces a descriptive error, never defaults.
        #[test]
        fn property_malformed_yaml_is_rejected(
            yaml in prop_oneof![
                Just("server:\n  host: [unclosed".to_string()),
                Just("catalog: {page_sizes: ".to_string()),
                "[a-z]{1,8}:\n  - \\[",
            ]
        ) {
            let mut file = NamedTempFile::new().expect("Failed to create temp file");
            write!(file, "{}", yaml).expect("Failed to write config");

            let result = Config::load(file.path());
            prop_assert!(result.is_err(), "Malformed YAML should produce an error");
            prop_assert!(result.unwrap_err().to_string().len() > 10);
        }
    }
}
