// Process configuration read from environment variables.
//
// `main` loads `.env` through `dotenv` first, then calls
// AppConfig::from_env. Parsing goes through a lookup closure so tests can
// supply variables without touching the process environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use crate::auth::jwt::{DEFAULT_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS};
use crate::auth::password::{DEFAULT_BCRYPT_COST, MIN_BCRYPT_COST};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_FACEBOOK_GRAPH_URL: &str = "https://graph.facebook.com";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Where users and photos are persisted
#[derive(Debug, Clone, PartialEq)]
pub enum StorageConfig {
    Postgres {
        url: String,
        max_connections: u32,
    },
    /// Process-local maps, lost on restart
    Memory,
}

/// Where uploaded media is written
#[derive(Debug, Clone, PartialEq)]
pub enum BlobConfig {
    S3(S3Config),
    Local { dir: PathBuf, public_url: String },
}

#[derive(Clone, PartialEq)]
pub struct S3Config {
    pub region: String,
    pub bucket: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Path-style endpoint override, e.g. a MinIO deployment
    pub endpoint: Option<String>,
    /// Base used to build public object URLs instead of the bucket host
    pub public_url: Option<String>,
}

impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("public_url", &self.public_url)
            .finish()
    }
}

#[derive(Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub storage: StorageConfig,
    pub jwt_secret: String,
    pub token_ttl_secs: i64,
    pub bcrypt_cost: u32,
    pub blob: BlobConfig,
    pub facebook_graph_url: String,
    pub max_upload_bytes: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind_addr", &self.bind_addr)
            .field("storage", &self.storage.kind())
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("blob", &self.blob)
            .field("facebook_graph_url", &self.facebook_graph_url)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl StorageConfig {
    /// Short backend name for logs; never includes the connection string
    pub fn kind(&self) -> &'static str {
        match self {
            StorageConfig::Postgres { .. } => "postgres",
            StorageConfig::Memory => "memory",
        }
    }
}

impl AppConfig {
    /// Reads configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads configuration through `lookup`; empty values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port: u16 = parse_or("PORT", get("PORT"), 3000)?;
        let bind_addr = format!("{host}:{port}")
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                var: "HOST",
                reason: e.to_string(),
            })?;

        let storage = match get("STORAGE_BACKEND").as_deref().unwrap_or("postgres") {
            "postgres" => StorageConfig::Postgres {
                url: require("DATABASE_URL")?,
                max_connections: parse_or(
                    "DATABASE_MAX_CONNECTIONS",
                    get("DATABASE_MAX_CONNECTIONS"),
                    5,
                )?,
            },
            "memory" => StorageConfig::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    var: "STORAGE_BACKEND",
                    reason: format!("expected 'postgres' or 'memory', got '{other}'"),
                })
            }
        };

        let jwt_secret = require("JWT_SECRET")?;
        let token_ttl_secs: i64 =
            parse_or("JWT_TTL_SECS", get("JWT_TTL_SECS"), DEFAULT_TOKEN_TTL_SECS)?;
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&token_ttl_secs) {
            return Err(ConfigError::Invalid {
                var: "JWT_TTL_SECS",
                reason: format!("must be between 1 and {MAX_TOKEN_TTL_SECS}"),
            });
        }

        let bcrypt_cost: u32 = parse_or("BCRYPT_COST", get("BCRYPT_COST"), DEFAULT_BCRYPT_COST)?;
        if !(MIN_BCRYPT_COST..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                var: "BCRYPT_COST",
                reason: format!("must be between {MIN_BCRYPT_COST} and 31"),
            });
        }

        let blob = match get("BLOB_STORE").as_deref().unwrap_or("s3") {
            "s3" => BlobConfig::S3(S3Config {
                region: require("AWS_REGION")?,
                bucket: require("AWS_S3_BUCKET_NAME")?,
                access_key_id: require("AWS_ACCESS_KEY_ID")?,
                secret_access_key: require("AWS_SECRET_ACCESS_KEY")?,
                endpoint: get("AWS_S3_ENDPOINT").map(|url| url.trim_end_matches('/').to_string()),
                public_url: get("AWS_S3_PUBLIC_URL")
                    .map(|url| url.trim_end_matches('/').to_string()),
            }),
            "local" => BlobConfig::Local {
                dir: PathBuf::from(get("MEDIA_DIR").unwrap_or_else(|| "./media".to_string())),
                public_url: get("MEDIA_PUBLIC_URL")
                    .unwrap_or_else(|| format!("http://localhost:{port}/media"))
                    .trim_end_matches('/')
                    .to_string(),
            },
            other => {
                return Err(ConfigError::Invalid {
                    var: "BLOB_STORE",
                    reason: format!("expected 's3' or 'local', got '{other}'"),
                })
            }
        };

        Ok(Self {
            bind_addr,
            storage,
            jwt_secret,
            token_ttl_secs,
            bcrypt_cost,
            blob,
            facebook_graph_url: get("FACEBOOK_GRAPH_URL")
                .unwrap_or_else(|| DEFAULT_FACEBOOK_GRAPH_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            max_upload_bytes: parse_or(
                "MAX_UPLOAD_BYTES",
                get("MAX_UPLOAD_BYTES"),
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
        })
    }
}

fn parse_or<T>(var: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
