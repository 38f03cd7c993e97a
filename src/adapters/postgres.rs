//! Postgres unit of work shared by the ledger and payment note adapters.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction as SqlxTransaction};

use crate::ports::{RepositoryError, RepositoryResult, UnitOfWork};

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepositoryError::NotFound("row not found".to_string()),
            other => RepositoryError::Database(other.to_string()),
        }
    }
}

/// A database transaction. Rolled back by sqlx when dropped uncommitted.
pub struct PgUnitOfWork {
    tx: SqlxTransaction<'static, Postgres>,
}

impl PgUnitOfWork {
    pub async fn begin(pool: &PgPool) -> RepositoryResult<Self> {
        let tx = pool.begin().await?;
        Ok(Self { tx })
    }

    pub(crate) fn tx(&mut self) -> &mut SqlxTransaction<'static, Postgres> {
        &mut self.tx
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn commit(self) -> RepositoryResult<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> RepositoryResult<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
