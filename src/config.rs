//! Configuration management for Foodgram.
//!
//! Loads configuration from environment variables (and a `.env` file when
//! present). The resulting [`Config`] is handed to [`crate::AppState`]
//! explicitly; nothing reads the environment after startup.

use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub pagination: PaginationConfig,
    pub shopping_list: ShoppingListConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Absolute base URL used for media, pagination and short links.
    pub public_url: String,
    pub max_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// bcrypt work factor for password hashes.
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub media_root: PathBuf,
    pub max_image_size: usize,
}

#[derive(Debug, Clone)]
pub struct PaginationConfig {
    pub page_size: u32,
    pub max_page_size: u32,
}

#[derive(Debug, Clone)]
pub struct ShoppingListConfig {
    pub order: ShoppingListOrder,
}

/// How the aggregated shopping list is sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShoppingListOrder {
    /// Ascending by summed amount, then by name.
    #[default]
    Amount,
    /// Alphabetical by ingredient name, then by unit.
    Name,
}

impl std::str::FromStr for ShoppingListOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "amount" => Ok(Self::Amount),
            "name" => Ok(Self::Name),
            _ => Err(format!("Unknown shopping list order: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let port = env_or("PORT", "8000")
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid PORT: {}", e))?;

        Ok(Self {
            server: ServerConfig {
                host: env_or("HOST", "0.0.0.0"),
                port,
                public_url: env_or("PUBLIC_URL", "http://localhost:8000")
                    .trim_end_matches('/')
                    .to_string(),
                max_body_size: env_parse("MAX_BODY_SIZE", 20 * 1024 * 1024),
            },
            database: DatabaseConfig {
                path: env_or("DATABASE_PATH", "./data/foodgram.db"),
            },
            auth: AuthConfig {
                bcrypt_cost: env_parse("BCRYPT_COST", bcrypt::DEFAULT_COST),
            },
            storage: StorageConfig {
                media_root: PathBuf::from(env_or("MEDIA_ROOT", "./data/media")),
                max_image_size: env_parse("MAX_IMAGE_SIZE", 5 * 1024 * 1024),
            },
            pagination: PaginationConfig {
                page_size: env_parse("PAGE_SIZE", 6),
                max_page_size: env_parse("MAX_PAGE_SIZE", 100),
            },
            shopping_list: ShoppingListConfig {
                order: env_parse("SHOPPING_LIST_ORDER", ShoppingListOrder::default()),
            },
            logging: LoggingConfig {
                format: env_parse("LOG_FORMAT", LogFormat::default()),
            },
        })
    }

    /// Configuration for tests: in-memory database, media under `media_root`.
    pub fn for_tests(media_root: impl Into<PathBuf>) -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                public_url: "http://testserver".to_string(),
                max_body_size: 20 * 1024 * 1024,
            },
            database: DatabaseConfig {
                path: ":memory:".to_string(),
            },
            auth: AuthConfig { bcrypt_cost: 4 },
            storage: StorageConfig {
                media_root: media_root.into(),
                max_image_size: 1024 * 1024,
            },
            pagination: PaginationConfig {
                page_size: 6,
                max_page_size: 100,
            },
            shopping_list: ShoppingListConfig {
                order: ShoppingListOrder::Amount,
            },
            logging: LoggingConfig {
                format: LogFormat::Pretty,
            },
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
