use std::{fmt, str::FromStr, time::Duration};

use anyhow::{Context, Result, anyhow};
use directory::auth::AuthConfig;
use sea_orm::ConnectOptions;
use tracing::warn;

const DEFAULT_DATABASE_URL: &str = "sqlite://directory.db?mode=rwc";
const DEFAULT_SESSION_TTL_MINUTES: i64 = 480;
const DEV_SECRET: &str = "dev-secret";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "dev" | "development" => Ok(Self::Development),
            "prod" | "production" => Ok(Self::Production),
            other => Err(anyhow!(
                "unknown APP_ENV {:?} (use development|production)",
                other
            )),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Production => f.write_str("production"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub environment: Environment,
    pub database_url: String,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let environment: Environment = std::env::var("APP_ENV")
            .unwrap_or_default()
            .parse()?;
        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.into());

        let jwt_secret = match std::env::var("SESSION_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if environment == Environment::Development => {
                warn!("SESSION_SECRET not set, using the development secret");
                DEV_SECRET.into()
            }
            _ => return Err(anyhow!("SESSION_SECRET missing (required in production)")),
        };
        let session_ttl_minutes = match std::env::var("SESSION_TTL_MINUTES") {
            Ok(raw) => raw
                .trim()
                .parse::<i64>()
                .with_context(|| format!("invalid SESSION_TTL_MINUTES {:?}", raw))?,
            Err(_) => DEFAULT_SESSION_TTL_MINUTES,
        };
        if session_ttl_minutes <= 0 {
            return Err(anyhow!("SESSION_TTL_MINUTES must be positive"));
        }

        Ok(Self {
            environment,
            database_url,
            auth: AuthConfig {
                jwt_secret,
                session_ttl_minutes,
                secure_cookies: env_bool(
                    "SECURE_COOKIES",
                    environment == Environment::Production,
                ),
            },
        })
    }

    /// Statement logging follows the environment: on in development only.
    pub fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new(self.database_url.clone());
        options
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(self.environment == Environment::Development);
        options
    }
}

fn env_bool(var: &str, default: bool) -> bool {
    std::env::var(var)
        .ok()
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_names() {
        assert_eq!("".parse::<Environment>().unwrap(), Environment::Development);
        assert_eq!(
            "Production".parse::<Environment>().unwrap(),
            Environment::Production
        );
        assert!("staging".parse::<Environment>().is_err());
        assert_eq!(Environment::Production.to_string(), "production");
    }
}
