use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::model::error::DatabaseResult;

#[derive(Debug, Clone)]
pub struct DbConnection {
    pool: PgPool, // cloning is cheap, pool is just a wrapper around Arc<>
}

impl DbConnection {
    pub fn connect(connection_str: &str) -> DatabaseResult<Self> {
        let pool = PgPool::connect_lazy(connection_str)?;
        Ok(Self { pool })
    }

    /// Lazy pool that gives up on acquiring a connection after `timeout`.
    /// Used for best-effort stores that must not stall a request.
    pub fn connect_with_timeout(connection_str: &str, timeout: Duration) -> DatabaseResult<Self> {
        let pool = PgPoolOptions::new()
            .acquire_timeout(timeout)
            .connect_lazy(connection_str)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}
