use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

const DEFAULT_PORT: u16 = 4000;
const DEFAULT_ENVIRONMENT: &str = "development";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 20;
const DEFAULT_DB_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;
const DEFAULT_MAX_VIDEO_SIZE_MB: u64 = 1024;
const DEFAULT_MAX_THUMBNAIL_SIZE_MB: u64 = 10;
const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";
const DEFAULT_FFPROBE_PATH: &str = "ffprobe";
const DEFAULT_MEDIA_TOOL_TIMEOUT_SECS: u64 = 300;
const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Runtime configuration, loaded once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub server_port: u16,
    pub cors_origins: Vec<String>,

    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,

    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,

    pub s3_bucket: String,
    pub s3_region: String,
    /// Custom S3-compatible endpoint (MinIO, localstack). None for AWS.
    pub s3_endpoint: Option<String>,

    pub max_video_size_bytes: u64,
    pub max_thumbnail_size_bytes: u64,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub media_tool_timeout_secs: u64,
    /// Directory where uploads are staged before processing.
    pub scratch_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| DEFAULT_ENVIRONMENT.to_string()),
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .context("PORT must be a number")?,
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".to_string())
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| DEFAULT_DB_MAX_CONNECTIONS.to_string())
                .parse()
                .context("DB_MAX_CONNECTIONS must be a number")?,
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| DEFAULT_DB_TIMEOUT_SECONDS.to_string())
                .parse()
                .context("DB_TIMEOUT_SECONDS must be a number")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_expiry_hours: env::var("JWT_EXPIRY_HOURS")
                .unwrap_or_else(|_| DEFAULT_JWT_EXPIRY_HOURS.to_string())
                .parse()
                .context("JWT_EXPIRY_HOURS must be a number")?,
            s3_bucket: env::var("S3_BUCKET").context("S3_BUCKET must be set")?,
            s3_region: env::var("S3_REGION").context("S3_REGION must be set")?,
            s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|e| !e.is_empty()),
            max_video_size_bytes: env::var("MAX_VIDEO_SIZE_MB")
                .unwrap_or_else(|_| DEFAULT_MAX_VIDEO_SIZE_MB.to_string())
                .parse::<u64>()
                .context("MAX_VIDEO_SIZE_MB must be a number")?
                * 1024
                * 1024,
            max_thumbnail_size_bytes: env::var("MAX_THUMBNAIL_SIZE_MB")
                .unwrap_or_else(|_| DEFAULT_MAX_THUMBNAIL_SIZE_MB.to_string())
                .parse::<u64>()
                .context("MAX_THUMBNAIL_SIZE_MB must be a number")?
                * 1024
                * 1024,
            ffmpeg_path: env::var("FFMPEG_PATH")
                .unwrap_or_else(|_| DEFAULT_FFMPEG_PATH.to_string()),
            ffprobe_path: env::var("FFPROBE_PATH")
                .unwrap_or_else(|_| DEFAULT_FFPROBE_PATH.to_string()),
            media_tool_timeout_secs: env::var("MEDIA_TOOL_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_MEDIA_TOOL_TIMEOUT_SECS.to_string())
                .parse()
                .context("MEDIA_TOOL_TIMEOUT_SECS must be a number")?,
            scratch_dir: env::var("UPLOAD_SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| env::temp_dir()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            bail!(
                "JWT_SECRET must be at least {} characters",
                MIN_JWT_SECRET_LENGTH
            );
        }
        if !self.database_url.starts_with("postgresql://")
            && !self.database_url.starts_with("postgres://")
        {
            bail!("DATABASE_URL must be a postgresql:// connection string");
        }
        if self.max_video_size_bytes == 0 {
            bail!("MAX_VIDEO_SIZE_MB must be greater than zero");
        }
        if self.max_thumbnail_size_bytes == 0 {
            bail!("MAX_THUMBNAIL_SIZE_MB must be greater than zero");
        }
        if self.media_tool_timeout_secs == 0 {
            bail!("MEDIA_TOOL_TIMEOUT_SECS must be greater than zero");
        }
        if self.is_production() && self.cors_origins.iter().any(|origin| origin == "*") {
            bail!("CORS_ORIGINS must list explicit origins in production");
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn media_tool_timeout(&self) -> Duration {
        Duration::from_secs(self.media_tool_timeout_secs)
    }

    pub fn db_timeout(&self) -> Duration {
        Duration::from_secs(self.db_timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> Config {
        Config {
            environment: "development".to_string(),
            server_port: 4000,
            cors_origins: vec!["*".to_string()],
            database_url: "postgresql://localhost/clipdock".to_string(),
            db_max_connections: 20,
            db_timeout_seconds: 30,
            jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
            jwt_expiry_hours: 24,
            s3_bucket: "clipdock-media".to_string(),
            s3_region: "us-east-1".to_string(),
            s3_endpoint: None,
            max_video_size_bytes: 1024 * 1024 * 1024,
            max_thumbnail_size_bytes: 10 * 1024 * 1024,
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            media_tool_timeout_secs: 300,
            scratch_dir: std::env::temp_dir(),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn short_jwt_secret_rejected() {
        let mut config = base_config();
        config.jwt_secret = "too-short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn non_postgres_url_rejected() {
        let mut config = base_config();
        config.database_url = "mysql://localhost/clipdock".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn wildcard_cors_rejected_in_production() {
        let mut config = base_config();
        config.environment = "production".to_string();
        assert!(config.validate().is_err());

        config.cors_origins = vec!["https://app.example.com".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_caps_rejected() {
        let mut config = base_config();
        config.max_video_size_bytes = 0;
        assert!(config.validate().is_err());
    }
}
