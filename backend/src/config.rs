//! Configuration management for the warehouse inventory server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with WMS_ prefix
//!
//! `PORT` and `DATABASE_URL` are also honoured since most hosts set them.

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::QuantityMode;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// PDF and spreadsheet rendering
    pub report: ReportConfig,

    /// Stock write policy
    pub stock: StockConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWT tokens. There is no default.
    pub secret: String,

    /// Access token expiration in seconds
    pub access_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    /// Directory holding the TTF files for PDF output
    pub font_dir: String,

    /// Font family name, e.g. `LiberationSans` for `LiberationSans-Regular.ttf`
    pub font_family: String,

    /// Logo drawn at the top of PDF reports when the file exists
    pub logo_path: String,

    /// Organisation name printed in PDF headers
    pub company_name: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StockConfig {
    /// How a repeated write for the same scheme and material changes quantity
    pub quantity_mode: QuantityMode,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("WMS_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 5000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("jwt.access_token_expiry", 3600)?
            .set_default("report.font_dir", "./fonts")?
            .set_default("report.font_family", "LiberationSans")?
            .set_default("report.logo_path", "./assets/logo.png")?
            .set_default("report.company_name", "Warehouse Management System")?
            .set_default("stock.quantity_mode", "overwrite")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (WMS_ prefix)
            .add_source(
                Environment::with_prefix("WMS")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("server.port", std::env::var("PORT").ok())?
            .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
            .build()?;

        let config: Self = config.try_deserialize()?;

        if config.jwt.secret.trim().is_empty() {
            return Err(ConfigError::Message("jwt.secret must not be empty".to_string()));
        }

        Ok(config)
    }
}
