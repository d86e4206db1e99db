use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use crate::auth::repo::{PgUserStore, UserStore};
use crate::config::AppConfig;
use crate::memory::MemoryStore;
use crate::sessions::repo::{PgSessionStore, SessionStore};
use crate::todos::repo::{PgTodoStore, TodoStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub todos: Arc<dyn TodoStore>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let Some(url) = config.database_url.clone() else {
            warn!("DATABASE_URL not set; using in-memory stores, data is lost on restart");
            return Ok(Self::in_memory(config));
        };

        let db = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&url)
            .await
            .context("connect to database")?;

        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .context("run migrations")?;
        info!("database ready");

        Ok(Self {
            config,
            users: Arc::new(PgUserStore::new(db.clone())),
            todos: Arc::new(PgTodoStore::new(db.clone())),
            sessions: Arc::new(PgSessionStore::new(db)),
        })
    }

    pub fn in_memory(config: Arc<AppConfig>) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            config,
            users: store.clone(),
            todos: store.clone(),
            sessions: store,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            database_url: None,
            db_max_connections: 1,
            host: "127.0.0.1".into(),
            port: 0,
            assets_dir: "assets".into(),
            session: crate::config::SessionConfig {
                ttl_hours: 24,
                sweep_interval_secs: 300,
                cookie_secure: false,
            },
        });
        Self::in_memory(config)
    }
}
