use std::env;

use auth::JwtError;
use auth::SigningKey;
use config::Config as ConfigBuilder;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
}

/// Postgres connection settings. Without a URL identities live in memory.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub http_port: u16,
}

#[derive(Deserialize, Clone)]
pub struct JwtConfig {
    /// Base64-encoded HS256 secret, at least 32 bytes once decoded.
    pub secret: String,
    pub expiration_ms: u64,
}

impl JwtConfig {
    pub fn signing_key(&self) -> Result<SigningKey, JwtError> {
        SigningKey::from_base64(&self.secret)
    }

    pub fn expiration(&self) -> Result<chrono::Duration, JwtError> {
        i64::try_from(self.expiration_ms)
            .ok()
            .and_then(chrono::Duration::try_milliseconds)
            .ok_or_else(|| {
                JwtError::InvalidExpiration(format!("{} ms is out of range", self.expiration_ms))
            })
    }
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"***")
            .field("expiration_ms", &self.expiration_ms)
            .finish()
    }
}

impl Config {
    /// Load configuration from files with environment variable overrides
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (JWT__SECRET, DATABASE__URL, SERVER__HTTP_PORT, etc.)
    /// 2. Environment-specific config file (config/{environment}.toml)
    /// 3. Default config file (config/default.toml)
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let configuration = ConfigBuilder::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // JWT__EXPIRATION_MS=3600000 overrides jwt.expiration_ms
            .add_source(Environment::default().separator("__"))
            .build()?;

        let config: Config = configuration.try_deserialize()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(secret: &str, expiration_ms: u64) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            expiration_ms,
        }
    }

    #[test]
    fn test_signing_key_decoded_from_base64() {
        let config = jwt("c2VjcmV0X2tleV9hdF9sZWFzdF8zMl9ieXRlc19sb25nIQ==", 60_000);
        assert_eq!(config.signing_key().unwrap().as_bytes().len(), 34);
    }

    #[test]
    fn test_short_or_invalid_secret_rejected() {
        assert!(matches!(
            jwt("c2hvcnQ=", 60_000).signing_key(),
            Err(JwtError::InvalidKey(_))
        ));
        assert!(matches!(
            jwt("%%% not base64 %%%", 60_000).signing_key(),
            Err(JwtError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_expiration_in_milliseconds() {
        assert_eq!(
            jwt("", 86_400_000).expiration().unwrap(),
            chrono::Duration::days(1)
        );
        assert!(jwt("", u64::MAX).expiration().is_err());
    }

    #[test]
    fn test_debug_hides_secret() {
        let rendered = format!("{:?}", jwt("c2VjcmV0", 1_000));
        assert!(!rendered.contains("c2VjcmV0"));
    }

    #[test]
    fn test_environment_overrides_files() {
        env::set_var("SERVER__HTTP_PORT", "9999");
        env::set_var("JWT__EXPIRATION_MS", "1234");

        let config = Config::load().unwrap();

        env::remove_var("SERVER__HTTP_PORT");
        env::remove_var("JWT__EXPIRATION_MS");

        assert_eq!(config.server.http_port, 9999);
        assert_eq!(config.jwt.expiration_ms, 1234);
        // Untouched keys still come from config/default.toml
        assert!(config.jwt.signing_key().is_ok());
    }

    #[test]
    fn test_deserialize_without_database_section() {
        let config: Config = ConfigBuilder::builder()
            .set_override("server.http_port", 8080)
            .unwrap()
            .set_override("jwt.secret", "c2VjcmV0")
            .unwrap()
            .set_override("jwt.expiration_ms", 1_000)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.http_port, 8080);
        assert!(config.database.url.is_none());
    }
}
