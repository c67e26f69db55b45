use tokio_postgres::{Config, NoTls};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};

use crate::config;
use crate::error::{self, Context};

const DEFAULT_MAX_SIZE: usize = 4;

pub fn from_config(config: &config::Config) -> error::Result<Pool> {
    let db = &config.settings.db;
    let mut pg_config = Config::new();

    pg_config.user(db.user.as_str());

    if let Some(password) = &db.password {
        pg_config.password(password.as_str());
    }

    pg_config.host(db.host.as_str());
    pg_config.port(db.port);
    pg_config.dbname(db.dbname.as_str());

    let manager_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };

    let manager = Manager::from_config(pg_config, NoTls, manager_config);

    tracing::debug!("creating database pool {}@{}:{}/{}", db.user, db.host, db.port, db.dbname);

    Pool::builder(manager)
        .max_size(db.max_size.unwrap_or(DEFAULT_MAX_SIZE))
        .build()
        .context("failed to create database connection pool")
}
