use std::net::SocketAddr;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub ttl_hours: i64,
    pub sweep_interval_secs: u64,
    pub cookie_secure: bool,
}

impl SessionConfig {
    pub fn ttl(&self) -> time::Duration {
        time::Duration::hours(self.ttl_hours)
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_hours * 60 * 60
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Postgres DSN. When unset the server keeps everything in memory.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub assets_dir: String,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let session = SessionConfig {
            ttl_hours: env_or("SESSION_TTL_HOURS", 24),
            sweep_interval_secs: env_or("SESSION_SWEEP_SECS", 300),
            cookie_secure: env_or("COOKIE_SECURE", false),
        };
        Ok(Self {
            database_url,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("APP_PORT", 8080),
            assets_dir: std::env::var("ASSETS_DIR")
                .unwrap_or_else(|_| "frontend/dist/assets".into()),
            session,
        })
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ttl_is_expressed_in_seconds() {
        let cfg = SessionConfig {
            ttl_hours: 24,
            sweep_interval_secs: 300,
            cookie_secure: false,
        };
        assert_eq!(cfg.ttl_seconds(), 86_400);
        assert_eq!(cfg.ttl(), time::Duration::days(1));
    }

    #[test]
    fn listen_addr_parses_host_and_port() {
        let cfg = AppConfig {
            database_url: None,
            db_max_connections: 1,
            host: "127.0.0.1".into(),
            port: 3000,
            assets_dir: "assets".into(),
            session: SessionConfig {
                ttl_hours: 1,
                sweep_interval_secs: 60,
                cookie_secure: false,
            },
        };
        assert_eq!(cfg.listen_addr().unwrap().port(), 3000);
    }
}
