//! PostgreSQL-backed `PasswordResetRepository` implementation using Diesel.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{
    PasswordReset, PasswordResetPersistenceError, PasswordResetRepository,
};

use super::models::{NewPasswordResetRow, PasswordResetRow};
use super::pool::{DbPool, PoolError};
use super::schema::password_resets;

#[derive(Clone)]
pub struct DieselPasswordResetRepository {
    pool: DbPool,
}

impl DieselPasswordResetRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PasswordResetPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            PasswordResetPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> PasswordResetPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(%other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            PasswordResetPersistenceError::connection("database connection error")
        }
        _ => PasswordResetPersistenceError::query("database error"),
    }
}

#[async_trait]
impl PasswordResetRepository for DieselPasswordResetRepository {
    async fn replace_for_email(
        &self,
        email: &str,
        token: &str,
        created_at: DateTime<Utc>,
    ) -> Result<(), PasswordResetPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                diesel::delete(password_resets::table.filter(password_resets::email.eq(email)))
                    .execute(conn)
                    .await?;
                diesel::insert_into(password_resets::table)
                    .values(&NewPasswordResetRow {
                        token,
                        email,
                        created_at,
                    })
                    .execute(conn)
                    .await?;
                Ok::<(), diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<PasswordReset>, PasswordResetPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PasswordResetRow> = password_resets::table
            .find(token)
            .select(PasswordResetRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(|row| PasswordReset {
            email: row.email,
            token: row.token,
            created_at: row.created_at,
        }))
    }

    async fn delete(&self, token: &str) -> Result<(), PasswordResetPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(password_resets::table.find(token))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }
}
