use std::env;
use std::net::SocketAddr;

use anyhow::{Context, Result};
use zeroize::Zeroizing;

use crate::expiry::DEFAULT_URGENT_MARGIN_DAYS;

/// Minimum length of the token signing secret, in bytes.
const MIN_JWT_SECRET_LEN: usize = 32;
/// Longest accepted token lifetime (one year).
const MAX_TOKEN_TTL_MINUTES: i64 = 525_600;

/// Which origins may call the API from a browser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The URL of the PostgreSQL database.
    pub database_url: String,
    /// The HS256 secret used to sign access tokens.
    pub jwt_secret: Zeroizing<Vec<u8>>,
    /// Lifetime of an access token in minutes.
    pub token_ttl_minutes: i64,
    /// Default margin for the urgent listing.
    pub urgent_margin_days: i64,
    /// The address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// CORS policy.
    pub allowed_origins: AllowedOrigins,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a `Config` from any key/value source.
    ///
    /// # Arguments
    ///
    /// * `lookup` - Returns the value for a variable name, if set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = Zeroizing::new(
            lookup("JWT_SECRET")
                .context("JWT_SECRET must be set (generate with: openssl rand -hex 32)")?
                .into_bytes(),
        );

        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {} bytes", MIN_JWT_SECRET_LEN);
        }

        let token_ttl_minutes: i64 = lookup("TOKEN_TTL_MINUTES")
            .unwrap_or_else(|| "1440".to_string())
            .parse()
            .context("Invalid TOKEN_TTL_MINUTES")?;

        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&token_ttl_minutes) {
            anyhow::bail!("TOKEN_TTL_MINUTES must be between 1 and {}", MAX_TOKEN_TTL_MINUTES);
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL").context("DATABASE_URL must be set")?,
            jwt_secret,
            token_ttl_minutes,
            urgent_margin_days: match lookup("URGENT_MARGIN_DAYS") {
                Some(raw) => raw.parse().context("Invalid URGENT_MARGIN_DAYS")?,
                None => DEFAULT_URGENT_MARGIN_DAYS,
            },
            bind_addr: lookup("BIND_ADDR")
                .unwrap_or_else(|| "127.0.0.1:3000".to_string())
                .parse()
                .context("Invalid BIND_ADDR")?,
            allowed_origins: parse_origins(lookup("CORS_ALLOWED_ORIGINS").as_deref()),
        })
    }
}

fn parse_origins(raw: Option<&str>) -> AllowedOrigins {
    let Some(raw) = raw else {
        return AllowedOrigins::Any;
    };

    let origins: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowedOrigins::Any
    } else {
        AllowedOrigins::List(origins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn applies_defaults() {
        let config = load(&[
            ("DATABASE_URL", "postgres://renu@localhost/renu"),
            ("JWT_SECRET", SECRET),
        ])
        .unwrap();

        assert_eq!(config.token_ttl_minutes, 1440);
        assert_eq!(config.urgent_margin_days, 3);
        assert_eq!(config.bind_addr, "127.0.0.1:3000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.allowed_origins, AllowedOrigins::Any);
        assert_eq!(config.jwt_secret.as_slice(), SECRET.as_bytes());
    }

    #[test]
    fn reads_overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgresql://renu@db/renu"),
            ("JWT_SECRET", SECRET),
            ("TOKEN_TTL_MINUTES", "60"),
            ("URGENT_MARGIN_DAYS", "7"),
            ("BIND_ADDR", "0.0.0.0:8080"),
            ("CORS_ALLOWED_ORIGINS", "http://localhost:3000, https://renu.app"),
        ])
        .unwrap();

        assert_eq!(config.token_ttl_minutes, 60);
        assert_eq!(config.urgent_margin_days, 7);
        assert_eq!(config.bind_addr.port(), 8080);
        assert_eq!(
            config.allowed_origins,
            AllowedOrigins::List(vec![
                "http://localhost:3000".to_string(),
                "https://renu.app".to_string()
            ])
        );
    }

    #[test]
    fn requires_secret_and_database() {
        assert!(load(&[("DATABASE_URL", "postgres://x")]).is_err());
        assert!(load(&[("JWT_SECRET", SECRET)]).is_err());
        assert!(load(&[("DATABASE_URL", "postgres://x"), ("JWT_SECRET", "short")]).is_err());
    }

    #[test]
    fn rejects_bad_numbers() {
        let base = [("DATABASE_URL", "postgres://x"), ("JWT_SECRET", SECRET)];

        let mut vars = base.to_vec();
        vars.push(("TOKEN_TTL_MINUTES", "0"));
        assert!(load(&vars).is_err());

        let mut vars = base.to_vec();
        vars.push(("TOKEN_TTL_MINUTES", "999999999"));
        assert!(load(&vars).is_err());

        let mut vars = base.to_vec();
        vars.push(("URGENT_MARGIN_DAYS", "three"));
        assert!(load(&vars).is_err());
    }

    #[test]
    fn wildcard_origin_means_any() {
        assert_eq!(parse_origins(Some("*")), AllowedOrigins::Any);
        assert_eq!(parse_origins(Some(" ")), AllowedOrigins::Any);
        assert_eq!(
            parse_origins(Some("http://a.test")),
            AllowedOrigins::List(vec!["http://a.test".to_string()])
        );
    }
}
