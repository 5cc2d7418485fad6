use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::env;

/// Default monthly translation budget, in characters
pub const DEFAULT_MONTHLY_QUOTA: u64 = 500_000;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub usage: UsageSettings,
    pub redis: RedisSettings,
    pub translation: TranslationSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub request_timeout: u64, // milliseconds
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UsageSettings {
    pub backend: String, // "file" or "redis"
    pub file_path: String,
    pub redis_key: String,
    pub monthly_quota: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: u8,
    pub pool_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TranslationSettings {
    pub api_key: Option<String>,
    pub endpoint: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String, // "json" or "pretty"
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5001)?
            .set_default("server.request_timeout", 30000)?
            .set_default("server.cors_origins", vec!["http://localhost:5173"])?
            .set_default("usage.backend", "file")?
            .set_default("usage.file_path", "data/translation_usage.json")?
            .set_default("usage.redis_key", "translation:usage")?
            .set_default("usage.monthly_quota", DEFAULT_MONTHLY_QUOTA)?
            .set_default("redis.host", "localhost")?
            .set_default("redis.port", 6379)?
            .set_default("redis.db", 0)?
            .set_default("redis.pool_size", 10)?
            .set_default(
                "translation.endpoint",
                "https://translation.googleapis.com/language/translate/v2",
            )?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name("config/config").required(false))
            .add_source(File::with_name(&format!("config/config.{}", run_mode)).required(false));

        // Explicit env overrides; the config crate's Environment source mangles
        // nested keys with underscores (file_path, monthly_quota)
        if let Ok(val) = env::var("CHAT_SERVER__HOST") {
            builder = builder.set_override("server.host", val)?;
        }
        if let Ok(val) = env::var("CHAT_SERVER__PORT") {
            builder = builder.set_override("server.port", val)?;
        }
        if let Ok(val) = env::var("CHAT_SERVER__REQUEST_TIMEOUT") {
            builder = builder.set_override("server.request_timeout", val)?;
        }
        if let Ok(val) = env::var("CHAT_SERVER__CORS_ORIGINS") {
            let origins: Vec<String> = val
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            builder = builder.set_override("server.cors_origins", origins)?;
        }

        if let Ok(val) = env::var("CHAT_USAGE__BACKEND") {
            builder = builder.set_override("usage.backend", val)?;
        }
        if let Ok(val) = env::var("CHAT_USAGE__FILE_PATH") {
            builder = builder.set_override("usage.file_path", val)?;
        }
        if let Ok(val) = env::var("CHAT_USAGE__REDIS_KEY") {
            builder = builder.set_override("usage.redis_key", val)?;
        }
        if let Ok(val) = env::var("CHAT_USAGE__MONTHLY_QUOTA") {
            builder = builder.set_override("usage.monthly_quota", val)?;
        }

        if let Ok(val) = env::var("CHAT_REDIS__HOST") {
            builder = builder.set_override("redis.host", val)?;
        }
        if let Ok(val) = env::var("CHAT_REDIS__PORT") {
            builder = builder.set_override("redis.port", val)?;
        }
        if let Ok(val) = env::var("CHAT_REDIS__PASSWORD") {
            builder = builder.set_override("redis.password", val)?;
        }
        if let Ok(val) = env::var("CHAT_REDIS__DB") {
            builder = builder.set_override("redis.db", val)?;
        }
        if let Ok(val) = env::var("CHAT_REDIS__POOL_SIZE") {
            builder = builder.set_override("redis.pool_size", val)?;
        }

        // The chat backend's .env historically carries GOOGLE_TRANSLATE_API_KEY
        if let Ok(val) = env::var("GOOGLE_TRANSLATE_API_KEY") {
            builder = builder.set_override("translation.api_key", val)?;
        }
        if let Ok(val) = env::var("CHAT_TRANSLATION__API_KEY") {
            builder = builder.set_override("translation.api_key", val)?;
        }
        if let Ok(val) = env::var("CHAT_TRANSLATION__ENDPOINT") {
            builder = builder.set_override("translation.endpoint", val)?;
        }

        if let Ok(val) = env::var("CHAT_LOGGING__LEVEL") {
            builder = builder.set_override("logging.level", val)?;
        }
        if let Ok(val) = env::var("CHAT_LOGGING__FORMAT") {
            builder = builder.set_override("logging.format", val)?;
        }

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.usage.monthly_quota == 0 {
            return Err("Monthly quota must be greater than 0".to_string());
        }
        if self.usage.monthly_quota > i64::MAX as u64 {
            return Err(format!("Monthly quota must not exceed {}", i64::MAX));
        }

        let valid_backends = ["file", "redis"];
        if !valid_backends.contains(&self.usage.backend.as_str()) {
            return Err(format!(
                "Invalid usage backend '{}'. Must be one of: {}",
                self.usage.backend,
                valid_backends.join(", ")
            ));
        }

        if self.usage.backend == "file" && self.usage.file_path.trim().is_empty() {
            return Err("Usage file path must not be empty".to_string());
        }

        if self.redis.pool_size == 0 {
            return Err("Redis pool size must be greater than 0".to_string());
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid logging level '{}'. Must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            ));
        }

        Ok(())
    }

    /// Get Redis connection string
    pub fn redis_url(&self) -> String {
        match &self.redis.password {
            Some(password) => format!(
                "redis://:{}@{}:{}/{}",
                password, self.redis.host, self.redis.port, self.redis.db
            ),
            None => format!(
                "redis://{}:{}/{}",
                self.redis.host, self.redis.port, self.redis.db
            ),
        }
    }

    /// Get server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// API key for the translation provider, if one is configured and non-blank
    pub fn translation_api_key(&self) -> Option<&str> {
        self.translation
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
pub(crate) fn test_settings() -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 5001,
            request_timeout: 30000,
            cors_origins: vec!["http://localhost:5173".to_string()],
        },
        usage: UsageSettings {
            backend: "file".to_string(),
            file_path: "data/translation_usage.json".to_string(),
            redis_key: "translation:usage".to_string(),
            monthly_quota: DEFAULT_MONTHLY_QUOTA,
        },
        redis: RedisSettings {
            host: "localhost".to_string(),
            port: 6379,
            password: None,
            db: 0,
            pool_size: 10,
        },
        translation: TranslationSettings {
            api_key: None,
            endpoint: "https://translation.googleapis.com/language/translate/v2".to_string(),
        },
        logging: LoggingSettings {
            level: "info".to_string(),
            format: "pretty".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_settings_defaults() {
        env::remove_var("CHAT_USAGE__MONTHLY_QUOTA");
        env::remove_var("CHAT_USAGE__BACKEND");

        let settings = Settings::new().expect("Failed to load settings");

        assert_eq!(settings.server.port, 5001);
        assert_eq!(settings.usage.backend, "file");
        assert_eq!(settings.usage.file_path, "data/translation_usage.json");
        assert_eq!(settings.usage.monthly_quota, 500_000);
        assert_eq!(settings.server.cors_origins, vec!["http://localhost:5173"]);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        env::set_var("CHAT_USAGE__MONTHLY_QUOTA", "1000");
        env::set_var("CHAT_TRANSLATION__API_KEY", "test-key");
        env::set_var(
            "CHAT_SERVER__CORS_ORIGINS",
            "http://localhost:5173, https://chat.example.com",
        );

        let settings = Settings::new().expect("Failed to load settings");

        assert_eq!(settings.usage.monthly_quota, 1000);
        assert_eq!(settings.translation_api_key(), Some("test-key"));
        assert_eq!(
            settings.server.cors_origins,
            vec!["http://localhost:5173", "https://chat.example.com"]
        );

        env::remove_var("CHAT_USAGE__MONTHLY_QUOTA");
        env::remove_var("CHAT_TRANSLATION__API_KEY");
        env::remove_var("CHAT_SERVER__CORS_ORIGINS");
    }

    #[test]
    fn test_redis_url_without_password() {
        let settings = test_settings();
        let url = settings.redis_url();

        assert!(url.starts_with("redis://"));
        assert!(!url.contains("@"));
    }

    #[test]
    fn test_validation_rejects_zero_quota() {
        let mut settings = test_settings();
        settings.usage.monthly_quota = 0;

        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_quota_beyond_signed_range() {
        let mut settings = test_settings();
        settings.usage.monthly_quota = i64::MAX as u64 + 1;
        assert!(settings.validate().is_err());

        settings.usage.monthly_quota = i64::MAX as u64;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_unknown_backend() {
        let mut settings = test_settings();
        settings.usage.backend = "sqlite".to_string();

        let err = settings.validate().unwrap_err();
        assert!(err.contains("sqlite"));
    }

    #[test]
    fn test_blank_api_key_is_not_configured() {
        let mut settings = test_settings();
        settings.translation.api_key = Some("   ".to_string());

        assert_eq!(settings.translation_api_key(), None);
    }
}
