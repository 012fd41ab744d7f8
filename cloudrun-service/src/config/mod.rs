use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;

/// Model used for image-to-image generation unless overridden.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Base64 images inflate uploads by a third; 20 MiB leaves room for typical photos.
const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Deserialize)]
pub struct CloudrunConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub storage: StorageConfig,
    pub genai: GenaiConfig,
    pub http: HttpConfig,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CounterBackend {
    Mongo,
    Memory,
}

impl FromStr for CounterBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(CounterBackend::Mongo),
            "memory" => Ok(CounterBackend::Memory),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "unknown COUNTER_STORE '{}', expected 'mongo' or 'memory'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: CounterBackend,
    pub mongodb: MongoConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageProviderKind {
    Gemini,
    Mock,
}

impl FromStr for ImageProviderKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gemini" => Ok(ImageProviderKind::Gemini),
            "mock" => Ok(ImageProviderKind::Mock),
            other => Err(AppError::ConfigError(anyhow::anyhow!(
                "unknown IMAGE_PROVIDER '{}', expected 'gemini' or 'mock'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenaiConfig {
    pub provider: ImageProviderKind,
    /// Only required for the Gemini provider.
    pub api_key: Option<String>,
    pub image_model: String,
    pub request_timeout_secs: u64,
    /// Alternative API root, e.g. a regional proxy.
    pub api_base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    pub max_body_bytes: usize,
}

impl CloudrunConfig {
    pub fn load() -> Result<Self, AppError> {
        let mut common_config = core_config::Config::load()?;
        // Cloud Run injects PORT; it wins over APP__PORT.
        if let Ok(port) = env::var("PORT") {
            common_config.port = parse_or("PORT", &port, common_config.port);
        }
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let backend: CounterBackend = get_env("COUNTER_STORE", Some("mongo"), is_prod)?.parse()?;
        let provider: ImageProviderKind =
            get_env("IMAGE_PROVIDER", Some("gemini"), is_prod)?.parse()?;

        // The key is mandatory only when we actually talk to Gemini.
        let api_key = match provider {
            ImageProviderKind::Gemini => Some(get_env("GOOGLE_API_KEY", None, is_prod)?),
            ImageProviderKind::Mock => env::var("GOOGLE_API_KEY").ok(),
        };

        Ok(CloudrunConfig {
            common: common_config,
            storage: StorageConfig {
                backend,
                mongodb: MongoConfig {
                    uri: get_env("MONGODB_URI", Some("mongodb://localhost:27017"), is_prod)?,
                    database: get_env("MONGODB_DATABASE", Some("cloudrun_db"), is_prod)?,
                },
            },
            genai: GenaiConfig {
                provider,
                api_key,
                image_model: get_env("GENAI_IMAGE_MODEL", Some(DEFAULT_IMAGE_MODEL), is_prod)?,
                request_timeout_secs: parse_or(
                    "GENAI_REQUEST_TIMEOUT_SECS",
                    &get_env(
                        "GENAI_REQUEST_TIMEOUT_SECS",
                        Some(&DEFAULT_REQUEST_TIMEOUT_SECS.to_string()),
                        is_prod,
                    )?,
                    DEFAULT_REQUEST_TIMEOUT_SECS,
                ),
                api_base_url: env::var("GENAI_API_BASE_URL").ok().filter(|s| !s.is_empty()),
            },
            http: HttpConfig {
                max_body_bytes: parse_or(
                    "MAX_BODY_BYTES",
                    &get_env(
                        "MAX_BODY_BYTES",
                        Some(&DEFAULT_MAX_BODY_BYTES.to_string()),
                        is_prod,
                    )?,
                    DEFAULT_MAX_BODY_BYTES,
                ),
            },
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
        })
    }

    /// Configuration for tests and local runs: in-memory counter, mock provider.
    pub fn in_memory() -> Self {
        CloudrunConfig {
            common: core_config::Config {
                port: 0,
                ..Default::default()
            },
            storage: StorageConfig {
                backend: CounterBackend::Memory,
                mongodb: MongoConfig {
                    uri: "mongodb://localhost:27017".to_string(),
                    database: "cloudrun_db".to_string(),
                },
            },
            genai: GenaiConfig {
                provider: ImageProviderKind::Mock,
                api_key: None,
                image_model: DEFAULT_IMAGE_MODEL.to_string(),
                request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                api_base_url: None,
            },
            http: HttpConfig {
                max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            },
            otlp_endpoint: None,
        }
    }
}

fn parse_or<T: FromStr + Copy>(key: &str, raw: &str, default: T) -> T {
    raw.parse().unwrap_or_else(|_| {
        tracing::warn!(key = %key, value = %raw, "Unparseable value, using default");
        default
    })
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
