use crate::auth::gate::GatePolicy;
use crate::auth::verify::SignatureScheme;
use std::env;
use std::net::SocketAddr;

#[derive(Clone)]
pub struct Config {
    // Redis
    pub redis_url: String,
    pub redis_prefix: String,

    // Server
    pub bind_addr: SocketAddr,

    // Request signing
    /// Maximum request age in seconds; `0` disables the freshness check.
    pub access_expire_secs: u64,
    pub signature_scheme: SignatureScheme,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("redis_url", &"[REDACTED]")
            .field("redis_prefix", &self.redis_prefix)
            .field("bind_addr", &self.bind_addr)
            .field("access_expire_secs", &self.access_expire_secs)
            .field("signature_scheme", &self.signature_scheme)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("Failed to parse {0}: {1}")]
    ParseError(String, String),
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Attempt to load .env file, but don't fail if it doesn't exist
        let _ = dotenvy::dotenv();

        // Redis is required; sessions live there
        let redis_url =
            env::var("REDIS_URL").map_err(|_| ConfigError::MissingVar("REDIS_URL".to_string()))?;
        if redis_url.is_empty() {
            return Err(ConfigError::InvalidValue(
                "REDIS_URL".to_string(),
                "cannot be empty".to_string(),
            ));
        }
        let redis_prefix = env::var("REDIS_PREFIX").unwrap_or_default();

        // Server
        let bind_addr_str = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_addr = bind_addr_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::ParseError("BIND_ADDR".to_string(), e.to_string()))?;

        // Request signing
        let access_expire_secs = parse_env_or_default("ACCESS_EXPIRE", 0)?;
        let signature_scheme = match env::var("SIGNATURE_SCHEME") {
            Ok(val) => val
                .parse::<SignatureScheme>()
                .map_err(|e| ConfigError::InvalidValue("SIGNATURE_SCHEME".to_string(), e))?,
            Err(_) => SignatureScheme::default(),
        };

        Ok(Config {
            redis_url,
            redis_prefix,
            bind_addr,
            access_expire_secs,
            signature_scheme,
        })
    }

    /// Settings the auth gate needs.
    pub fn gate_policy(&self) -> GatePolicy {
        GatePolicy {
            access_expire_secs: self.access_expire_secs,
            scheme: self.signature_scheme,
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests() -> Self {
        Config {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            redis_prefix: String::new(),
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            access_expire_secs: 0,
            signature_scheme: SignatureScheme::Md5,
        }
    }
}

/// Helper function to parse environment variable with a default value
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| ConfigError::ParseError(key.to_string(), format!("{}: {}", e, val))),
        Err(_) => Ok(default),
    }
}
