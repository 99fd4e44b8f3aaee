//! Configuration module
//!
//! Environment-driven configuration for the API and services: storage paths,
//! size ceilings, authentication boundary, and preview tooling.

use std::env;

const MAX_FILE_SIZE_MB: u64 = 100;
const PREVIEW_MAX_WIDTH: u32 = 800;
const PREVIEW_MAX_HEIGHT: u32 = 600;
const PREVIEW_TIMEOUT_SECS: u64 = 30;
const PREVIEW_DPI: u32 = 150;
const MAX_CONCURRENT_RENDERS: usize = 2;
const JWKS_CACHE_TTL_SECS: i64 = 3600;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,

    // Storage layout: active/backup/preview areas live under this root
    pub storage_base_path: String,
    pub max_file_size_bytes: u64,

    // Identity boundary: tokens are validated, never issued
    pub jwt_secret: String,
    pub service_api_key: Option<String>,
    pub idp_jwks_url: Option<String>,
    pub idp_jwks_cache_ttl_secs: i64,

    // Preview generation
    pub preview_max_width: u32,
    pub preview_max_height: u32,
    pub preview_timeout_secs: u64,
    pub preview_dpi: u32,
    pub max_concurrent_renders: usize,
    pub pdftoppm_path: String,
    pub soffice_path: String,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<u64>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "4000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            storage_base_path: env::var("STORAGE_BASE_PATH")
                .unwrap_or_else(|_| "./data".to_string()),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set for authentication"))?,
            service_api_key: env::var("SERVICE_API_KEY").ok().filter(|s| !s.is_empty()),
            idp_jwks_url: env::var("IDP_JWKS_URL").ok().filter(|s| !s.is_empty()),
            idp_jwks_cache_ttl_secs: env::var("IDP_JWKS_CACHE_TTL_SECS")
                .unwrap_or_else(|_| JWKS_CACHE_TTL_SECS.to_string())
                .parse()
                .unwrap_or(JWKS_CACHE_TTL_SECS),
            preview_max_width: env::var("PREVIEW_MAX_WIDTH")
                .unwrap_or_else(|_| PREVIEW_MAX_WIDTH.to_string())
                .parse()
                .unwrap_or(PREVIEW_MAX_WIDTH),
            preview_max_height: env::var("PREVIEW_MAX_HEIGHT")
                .unwrap_or_else(|_| PREVIEW_MAX_HEIGHT.to_string())
                .parse()
                .unwrap_or(PREVIEW_MAX_HEIGHT),
            preview_timeout_secs: env::var("PREVIEW_TIMEOUT_SECS")
                .unwrap_or_else(|_| PREVIEW_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(PREVIEW_TIMEOUT_SECS),
            preview_dpi: env::var("PREVIEW_DPI")
                .unwrap_or_else(|_| PREVIEW_DPI.to_string())
                .parse()
                .unwrap_or(PREVIEW_DPI),
            max_concurrent_renders: env::var("MAX_CONCURRENT_RENDERS")
                .unwrap_or_else(|_| MAX_CONCURRENT_RENDERS.to_string())
                .parse()
                .unwrap_or(MAX_CONCURRENT_RENDERS),
            pdftoppm_path: env::var("PDFTOPPM_PATH").unwrap_or_else(|_| "pdftoppm".to_string()),
            soffice_path: env::var("SOFFICE_PATH").unwrap_or_else(|_| "soffice".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if self.storage_base_path.trim().is_empty() {
            return Err(anyhow::anyhow!("STORAGE_BASE_PATH must not be empty"));
        }

        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than zero"));
        }

        if self.preview_max_width == 0 || self.preview_max_height == 0 {
            return Err(anyhow::anyhow!(
                "PREVIEW_MAX_WIDTH and PREVIEW_MAX_HEIGHT must be greater than zero"
            ));
        }

        if self.max_concurrent_renders == 0 {
            return Err(anyhow::anyhow!(
                "MAX_CONCURRENT_RENDERS must be greater than zero"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            server_port: 4000,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
            storage_base_path: "./data".to_string(),
            max_file_size_bytes: 100 * 1024 * 1024,
            jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
            service_api_key: None,
            idp_jwks_url: None,
            idp_jwks_cache_ttl_secs: 3600,
            preview_max_width: 800,
            preview_max_height: 600,
            preview_timeout_secs: 30,
            preview_dpi: 150,
            max_concurrent_renders: 2,
            pdftoppm_path: "pdftoppm".to_string(),
            soffice_path: "soffice".to_string(),
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_short_jwt_secret() {
        let mut config = test_config();
        config.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_storage_path() {
        let mut config = test_config();
        config.storage_base_path = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_is_production() {
        let mut config = test_config();
        assert!(!config.is_production());
        config.environment = "Production".to_string();
        assert!(config.is_production());
    }
}
