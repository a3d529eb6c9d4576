use async_trait::async_trait;
use deadpool_postgres::{ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use tokio_postgres::{NoTls, Row};

use super::{LIST_LIMIT, NoteRepository, embedded::migrations};
use crate::{config::DatabaseConfig, error::DataAccessError, models::Note};

const LIST_RECENT: &str = "SELECT id, author, content, created_at FROM vault_notes \
     ORDER BY created_at DESC, id DESC LIMIT $1";
const GET_BY_ID: &str = "SELECT id, author, content, created_at FROM vault_notes WHERE id = $1";
const INSERT: &str = "INSERT INTO vault_notes (author, content) VALUES ($1, $2)";
const DELETE_BY_ID: &str = "DELETE FROM vault_notes WHERE id = $1";

/// PostgreSQL-backed repository sharing a deadpool connection pool.
#[derive(Clone)]
pub struct PgRepository {
    pool: Pool,
}

impl PgRepository {
    pub fn connect(config: &DatabaseConfig) -> Result<Self, DataAccessError> {
        let mut cfg = deadpool_postgres::Config::new();
        cfg.host = Some(config.host.clone());
        cfg.port = Some(config.port);
        cfg.user = Some(config.user.clone());
        cfg.password = Some(config.password.clone());
        cfg.dbname = Some(config.name.clone());
        cfg.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });
        if let Some(max_size) = config.max_connections {
            cfg.pool = Some(PoolConfig::new(max_size));
        }

        let pool = cfg.create_pool(Some(Runtime::Tokio1), NoTls)?;

        tracing::info!(
            "Connection pool created for {}:{}/{}",
            config.host,
            config.port,
            config.name
        );

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), DataAccessError> {
        let mut client = self.pool.get().await?;
        let migrations_report = migrations::runner().run_async(&mut **client).await?;

        let applied = migrations_report.applied_migrations();
        for migration in applied {
            tracing::info!("Applied migration V{} {}", migration.version(), migration.name());
        }

        tracing::info!("Schema up to date, {} migration(s) applied", applied.len());

        Ok(())
    }

    pub fn close(&self) {
        self.pool.close();
        tracing::info!("Connection pool closed");
    }

    async fn query_notes(
        &self,
        sql: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<Vec<Note>, DataAccessError> {
        let client = self.pool.get().await?;
        let stmt = client.prepare_cached(sql).await?;
        let rows = client.query(&stmt, params).await?;

        rows.iter()
            .map(note_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(Into::into)
    }
}

fn note_from_row(row: &Row) -> Result<Note, tokio_postgres::Error> {
    Ok(Note {
        id: row.try_get("id")?,
        author: row.try_get("author")?,
        content: row.try_get("content")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl NoteRepository for PgRepository {
    async fn list_recent(&self) -> Result<Vec<Note>, DataAccessError> {
        self.query_notes(LIST_RECENT, &[&LIST_LIMIT]).await
    }

    async fn get_by_id(&self, id: i64) -> Result<Vec<Note>, DataAccessError> {
        self.query_notes(GET_BY_ID, &[&id]).await
    }

    async fn insert(&self, author: &str, content: &str) -> Result<(), DataAccessError> {
        let client = self.pool.get().await?;
        let stmt = client.prepare_cached(INSERT).await?;
        client.execute(&stmt, &[&author, &content]).await?;

        Ok(())
    }

    async fn delete_by_id(&self, id: i64) -> Result<(), DataAccessError> {
        let client = self.pool.get().await?;
        let stmt = client.prepare_cached(DELETE_BY_ID).await?;
        let rows = client.execute(&stmt, &[&id]).await?;

        tracing::debug!("delete of note {id} affected {rows} row(s)");

        Ok(())
    }
}
