use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Postgres connection string. When absent the server keeps drinks in memory.
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub reset_on_start: bool,
    pub seed_on_reset: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Identity provider domain, e.g. `my-shop.us.auth0.com`
    pub domain: String,
    pub audience: String,
    pub algorithm: String,
    /// Overrides the JWKS location derived from `domain`
    pub jwks_url: Option<String>,
    pub jwks_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl AuthConfig {
    /// Expected `iss` claim for tokens minted by the configured domain
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.domain.trim_end_matches('/'))
    }

    pub fn jwks_url(&self) -> String {
        match &self.jwks_url {
            Some(url) => url.clone(),
            None => format!(
                "https://{}/.well-known/jwks.json",
                self.domain.trim_end_matches('/')
            ),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            if !v.trim().is_empty() {
                self.database.url = Some(v);
            }
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RESET_ON_START") {
            self.database.reset_on_start = v.parse().unwrap_or(self.database.reset_on_start);
        }
        if let Ok(v) = env::var("DATABASE_SEED_ON_RESET") {
            self.database.seed_on_reset = v.parse().unwrap_or(self.database.seed_on_reset);
        }

        // Auth overrides
        if let Ok(v) = env::var("AUTH0_DOMAIN") {
            self.auth.domain = v.trim().to_string();
        }
        if let Ok(v) = env::var("API_AUDIENCE") {
            self.auth.audience = v.trim().to_string();
        }
        if let Ok(v) = env::var("ALGORITHMS") {
            // Accept "RS256" as well as the list form "['RS256']"
            let cleaned: String = v
                .chars()
                .filter(|c| !matches!(c, '[' | ']' | '\'' | '"' | ' '))
                .collect();
            if let Some(first) = cleaned.split(',').find(|s| !s.is_empty()) {
                self.auth.algorithm = first.to_string();
            }
        }
        if let Ok(v) = env::var("AUTH_JWKS_URL") {
            if !v.trim().is_empty() {
                self.auth.jwks_url = Some(v.trim().to_string());
            }
        }
        if let Ok(v) = env::var("AUTH_JWKS_TIMEOUT_SECS") {
            self.auth.jwks_timeout_secs = v.parse().unwrap_or(self.auth.jwks_timeout_secs);
        }

        // API overrides
        if let Some(port) = env::var("COFFEE_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 5,
                connection_timeout: 30,
                reset_on_start: true,
                seed_on_reset: true,
            },
            auth: AuthConfig::default(),
            api: ApiConfig {
                port: 5000,
                enable_request_logging: true,
                max_request_size_bytes: 1024 * 1024, // 1MB
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["*".to_string()],
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 10,
                reset_on_start: false,
                seed_on_reset: false,
            },
            auth: AuthConfig::default(),
            api: ApiConfig {
                port: 5000,
                enable_request_logging: true,
                max_request_size_bytes: 256 * 1024,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 5,
                reset_on_start: false,
                seed_on_reset: false,
            },
            auth: AuthConfig::default(),
            api: ApiConfig {
                port: 5000,
                enable_request_logging: false,
                max_request_size_bytes: 64 * 1024,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            domain: String::new(),
            audience: String::new(),
            algorithm: "RS256".to_string(),
            jwks_url: None,
            jwks_timeout_secs: 5,
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert!(config.database.reset_on_start);
        assert!(config.database.seed_on_reset);
        assert_eq!(config.security.cors_origins, vec!["*".to_string()]);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert!(!config.database.reset_on_start);
        assert!(!config.api.enable_request_logging);
        assert_eq!(config.auth.algorithm, "RS256");
    }

    #[test]
    fn derives_issuer_and_jwks_url_from_domain() {
        let auth = AuthConfig {
            domain: "shop.eu.auth0.com".to_string(),
            ..AuthConfig::default()
        };
        assert_eq!(auth.issuer(), "https://shop.eu.auth0.com/");
        assert_eq!(auth.jwks_url(), "https://shop.eu.auth0.com/.well-known/jwks.json");
    }

    #[test]
    fn explicit_jwks_url_wins() {
        let auth = AuthConfig {
            domain: "shop.eu.auth0.com".to_string(),
            jwks_url: Some("http://127.0.0.1:9999/keys".to_string()),
            ..AuthConfig::default()
        };
        assert_eq!(auth.jwks_url(), "http://127.0.0.1:9999/keys");
    }
}
