//! Configuration module
//!
//! Settings are read from the environment (a `.env` file is honored) once at startup
//! and validated before any service is built.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    BYTES_PER_MB, DEFAULT_MAX_THUMBNAIL_SIZE_MB, DEFAULT_MAX_VIDEO_SIZE_MB,
    DEFAULT_PRESIGNED_URL_EXPIRY_SECS,
};

const SERVER_PORT: u16 = 8091;
const DB_MAX_CONNECTIONS: u32 = 10;
const DB_TIMEOUT_SECS: u64 = 30;
const S3_MAX_RETRIES: usize = 3;
const MEDIA_COMMAND_TIMEOUT_SECS: u64 = 600;
const MIN_JWT_SECRET_LEN: usize = 32;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub log_format: String,
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    // Object store
    pub s3_bucket: String,
    pub s3_region: String,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO etc.)
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub s3_max_retries: usize,
    // Media tooling
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub media_command_timeout_secs: u64,
    pub scratch_dir: PathBuf,
    // Upload limits
    pub max_video_size_bytes: usize,
    pub max_thumbnail_size_bytes: usize,
    pub video_allowed_content_types: Vec<String>,
    pub thumbnail_allowed_content_types: Vec<String>,
    pub presigned_url_expiry_secs: u64,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn megabytes_to_bytes(key: &str, megabytes: usize) -> Result<usize, anyhow::Error> {
    megabytes
        .checked_mul(BYTES_PER_MB)
        .ok_or_else(|| anyhow::anyhow!("{} is too large", key))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins = env_or("CORS_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
        let jwt_secret =
            env::var("JWT_SECRET").map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;

        let s3_bucket =
            env::var("S3_BUCKET").map_err(|_| anyhow::anyhow!("S3_BUCKET must be set"))?;
        let s3_region = env::var("S3_REGION")
            .or_else(|_| env::var("AWS_REGION"))
            .map_err(|_| anyhow::anyhow!("S3_REGION or AWS_REGION must be set"))?;

        let scratch_dir = env::var("SCRATCH_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| env::temp_dir());

        let max_video_size_bytes = megabytes_to_bytes(
            "MAX_VIDEO_SIZE_MB",
            parse_env("MAX_VIDEO_SIZE_MB", DEFAULT_MAX_VIDEO_SIZE_MB),
        )?;
        let max_thumbnail_size_bytes = megabytes_to_bytes(
            "MAX_THUMBNAIL_SIZE_MB",
            parse_env("MAX_THUMBNAIL_SIZE_MB", DEFAULT_MAX_THUMBNAIL_SIZE_MB),
        )?;

        Ok(Config {
            server_port: parse_env("PORT", SERVER_PORT),
            environment,
            cors_origins,
            log_format: env_or("LOG_FORMAT", "pretty"),
            database_url,
            db_max_connections: parse_env("DB_MAX_CONNECTIONS", DB_MAX_CONNECTIONS),
            db_timeout_seconds: parse_env("DB_TIMEOUT_SECONDS", DB_TIMEOUT_SECS),
            jwt_secret,
            s3_bucket,
            s3_region,
            s3_endpoint: env::var("S3_ENDPOINT").ok().filter(|s| !s.is_empty()),
            aws_access_key_id: env::var("AWS_ACCESS_KEY_ID").ok(),
            aws_secret_access_key: env::var("AWS_SECRET_ACCESS_KEY").ok(),
            s3_max_retries: parse_env("S3_MAX_RETRIES", S3_MAX_RETRIES),
            ffmpeg_path: env_or("FFMPEG_PATH", "ffmpeg"),
            ffprobe_path: env_or("FFPROBE_PATH", "ffprobe"),
            media_command_timeout_secs: parse_env(
                "MEDIA_COMMAND_TIMEOUT_SECS",
                MEDIA_COMMAND_TIMEOUT_SECS,
            ),
            scratch_dir,
            max_video_size_bytes,
            max_thumbnail_size_bytes,
            video_allowed_content_types: split_list(&env_or(
                "VIDEO_ALLOWED_CONTENT_TYPES",
                "video/mp4",
            )),
            thumbnail_allowed_content_types: split_list(&env_or(
                "THUMBNAIL_ALLOWED_CONTENT_TYPES",
                "image/jpeg,image/png",
            )),
            presigned_url_expiry_secs: parse_env(
                "PRESIGNED_URL_EXPIRY_SECS",
                DEFAULT_PRESIGNED_URL_EXPIRY_SECS,
            ),
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn media_command_timeout(&self) -> Duration {
        Duration::from_secs(self.media_command_timeout_secs)
    }

    pub fn presigned_url_expiry(&self) -> Duration {
        Duration::from_secs(self.presigned_url_expiry_secs)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            ));
        }

        if !(self.database_url.starts_with("postgres://")
            || self.database_url.starts_with("postgresql://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.s3_bucket.trim().is_empty() || self.s3_region.trim().is_empty() {
            return Err(anyhow::anyhow!("S3_BUCKET and S3_REGION must not be empty"));
        }

        if self.aws_access_key_id.is_some() != self.aws_secret_access_key.is_some() {
            return Err(anyhow::anyhow!(
                "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set together"
            ));
        }

        if self.video_allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "VIDEO_ALLOWED_CONTENT_TYPES must list at least one type"
            ));
        }

        if self.max_video_size_bytes == 0 || self.max_thumbnail_size_bytes == 0 {
            return Err(anyhow::anyhow!("Upload size limits must be greater than zero"));
        }

        if self.media_command_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "MEDIA_COMMAND_TIMEOUT_SECS must be greater than zero"
            ));
        }

        if self.presigned_url_expiry_secs == 0 || self.presigned_url_expiry_secs > 7 * 24 * 3600 {
            return Err(anyhow::anyhow!(
                "PRESIGNED_URL_EXPIRY_SECS must be between 1 second and 7 days"
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
            server_port: 8091,
            environment: "development".to_string(),
            cors_origins: vec!["*".to_string()],
            log_format: "pretty".to_string(),
            database_url: "postgres://localhost/tubely".to_string(),
            db_max_connections: 5,
            db_timeout_seconds: 30,
            jwt_secret: "a".repeat(32),
            s3_bucket: "tubely-videos".to_string(),
            s3_region: "us-east-1".to_string(),
            s3_endpoint: None,
            aws_access_key_id: None,
            aws_secret_access_key: None,
            s3_max_retries: 3,
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            media_command_timeout_secs: 600,
            scratch_dir: env::temp_dir(),
            max_video_size_bytes: 1024 * BYTES_PER_MB,
            max_thumbnail_size_bytes: 10 * BYTES_PER_MB,
            video_allowed_content_types: vec!["video/mp4".to_string()],
            thumbnail_allowed_content_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
            ],
            presigned_url_expiry_secs: 3600,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(test_config().validate().is_ok());
    }

    #[test]
    fn test_short_jwt_secret_rejected() {
        let mut config = test_config();
        config.jwt_secret = "short".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        let mut config = test_config();
        config.environment = "production".to_string();
        assert!(config.validate().is_err());

        config.cors_origins = vec!["https://tubely.example.com".to_string()];
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_half_configured_credentials_rejected() {
        let mut config = test_config();
        config.aws_access_key_id = Some("AKIAEXAMPLE".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_split_list_normalizes() {
        assert_eq!(
            split_list(" Video/MP4 , ,image/png"),
            vec!["video/mp4".to_string(), "image/png".to_string()]
        );
    }

    #[test]
    fn test_megabyte_limits_reject_overflow() {
        assert_eq!(
            megabytes_to_bytes("MAX_VIDEO_SIZE_MB", 10).unwrap(),
            10 * 1024 * 1024
        );

        let err = megabytes_to_bytes("MAX_VIDEO_SIZE_MB", usize::MAX).unwrap_err();
        assert!(err.to_string().contains("MAX_VIDEO_SIZE_MB"));
    }
}
