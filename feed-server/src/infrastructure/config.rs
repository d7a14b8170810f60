use serde::Deserialize;

/// Upper bound for `JWT_TTL_HOURS`: one year.
pub const MAX_JWT_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Without a database the server runs on the in-process store.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".into());
        let port = lookup("PORT")
            .unwrap_or_else(|| "8080".into())
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid PORT: {}", e))?;
        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let jwt_secret = lookup("JWT_SECRET")
            .filter(|secret| !secret.is_empty())
            .ok_or_else(|| anyhow::anyhow!("JWT_SECRET must be set"))?;
        let jwt_ttl_hours = lookup("JWT_TTL_HOURS")
            .unwrap_or_else(|| "24".into())
            .parse::<i64>()
            .map_err(|e| anyhow::anyhow!("invalid JWT_TTL_HOURS: {}", e))?;
        if !(1..=MAX_JWT_TTL_HOURS).contains(&jwt_ttl_hours) {
            anyhow::bail!("JWT_TTL_HOURS must be between 1 and {MAX_JWT_TTL_HOURS}");
        }
        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            host,
            port,
            database_url,
            jwt_secret,
            jwt_ttl_hours,
            cors_origins,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> anyhow::Result<AppConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = config(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.jwt_ttl_hours, 24);
        assert!(config.database_url.is_none());
        assert_eq!(config.cors_origins, ["http://localhost:3000"]);
    }

    #[test]
    fn missing_secret_is_an_error() {
        assert!(config(&[]).is_err());
        assert!(config(&[("JWT_SECRET", "")]).is_err());
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let config = config(&[
            ("JWT_SECRET", "s3cret"),
            ("CORS_ORIGINS", "http://a.test, http://b.test,,"),
        ])
        .unwrap();
        assert_eq!(config.cors_origins, ["http://a.test", "http://b.test"]);
    }

    #[test]
    fn invalid_numbers_are_rejected() {
        assert!(config(&[("JWT_SECRET", "s"), ("PORT", "http")]).is_err());
        assert!(config(&[("JWT_SECRET", "s"), ("JWT_TTL_HOURS", "0")]).is_err());
    }

    #[test]
    fn token_lifetime_is_bounded() {
        let max = MAX_JWT_TTL_HOURS.to_string();
        let config_at_max = config(&[("JWT_SECRET", "s"), ("JWT_TTL_HOURS", &max)]).unwrap();
        assert_eq!(config_at_max.jwt_ttl_hours, MAX_JWT_TTL_HOURS);

        let err = config(&[("JWT_SECRET", "s"), ("JWT_TTL_HOURS", "9223372036854775")])
            .unwrap_err();
        assert!(err.to_string().contains("JWT_TTL_HOURS"));
    }
}
