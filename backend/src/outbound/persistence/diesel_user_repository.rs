//! PostgreSQL-backed `UserRepository` implementation using Diesel.
//!
//! Owns the `users` and `auth_tokens` tables. Email uniqueness is enforced
//! on the lowercase form; the stored casing is preserved for display.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use pagination::PageParams;
use tracing::debug;

use crate::domain::ids::UserId;
use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::user::{Email, User, UserProfile, UserRole, Username};

use super::models::{AuthTokenRow, NewAuthTokenRow, NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{auth_tokens, users};

diesel::define_sql_function! {
    /// PostgreSQL `lower()`, used for case-insensitive email lookups.
    fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text
}

#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(%other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            match info.constraint_name() {
                Some(name) if name.contains("email") => UserPersistenceError::duplicate_email(),
                Some(name) if name.contains("username") => {
                    UserPersistenceError::duplicate_username()
                }
                _ => UserPersistenceError::query("unique constraint violated"),
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserPersistenceError::connection("database connection error")
        }
        _ => UserPersistenceError::query("database error"),
    }
}

fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let username = Username::new(row.username)
        .map_err(|e| UserPersistenceError::query(format!("corrupt username column: {e}")))?;
    let email = Email::new(row.email)
        .map_err(|e| UserPersistenceError::query(format!("corrupt email column: {e}")))?;
    let role: UserRole = row
        .role
        .parse()
        .map_err(|_| UserPersistenceError::query("corrupt role column"))?;
    Ok(User::from_parts(
        UserId::from_uuid(row.id),
        username,
        email,
        row.password_hash,
        role,
        row.is_active,
        row.is_staff,
        UserProfile {
            first_name: row.first_name,
            last_name: row.last_name,
            file: row.file,
            location: row.location,
            tel: row.tel,
            description: row.description,
            working_hours: row.working_hours,
        },
        row.created_at,
        row.updated_at,
    ))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let role = user.role().to_string();
        let row = NewUserRow {
            id: user.id().as_uuid(),
            username: user.username().as_str(),
            email: user.email().as_str(),
            password_hash: user.password_hash(),
            role: &role,
            is_active: user.is_active(),
            is_staff: user.is_staff(),
            created_at: user.created_at(),
            updated_at: user.updated_at(),
        };
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let profile = user.profile();
        let changes = UserChangeset {
            email: user.email().as_str(),
            password_hash: user.password_hash(),
            is_active: user.is_active(),
            first_name: profile.first_name.as_deref(),
            last_name: profile.last_name.as_deref(),
            file: profile.file.as_deref(),
            location: profile.location.as_deref(),
            tel: profile.tel.as_deref(),
            description: profile.description.as_deref(),
            working_hours: profile.working_hours.as_deref(),
            updated_at: user.updated_at(),
        };
        diesel::update(users::table.find(user.id().as_uuid()))
            .set(&changes)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(lower(users::email).eq(email.to_lowercase()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }

    async fn list_by_role(
        &self,
        role: UserRole,
        params: PageParams,
    ) -> Result<(Vec<User>, u64), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let role = role.to_string();

        let count: i64 = users::table
            .filter(users::role.eq(&role))
            .filter(users::is_active.eq(true))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let rows: Vec<UserRow> = users::table
            .filter(users::role.eq(&role))
            .filter(users::is_active.eq(true))
            .order(users::created_at.desc())
            .offset(params.offset() as i64)
            .limit(i64::from(params.page_size()))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let members = rows
            .into_iter()
            .map(row_to_user)
            .collect::<Result<Vec<_>, _>>()?;
        #[expect(clippy::cast_sign_loss, reason = "COUNT(*) is never negative")]
        Ok((members, count as u64))
    }

    async fn find_token(&self, user_id: UserId) -> Result<Option<String>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        auth_tokens::table
            .filter(auth_tokens::user_id.eq(user_id.as_uuid()))
            .select(auth_tokens::token)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)
    }

    async fn replace_token(
        &self,
        user_id: UserId,
        token: &str,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                diesel::delete(
                    auth_tokens::table.filter(auth_tokens::user_id.eq(user_id.as_uuid())),
                )
                .execute(conn)
                .await?;
                diesel::insert_into(auth_tokens::table)
                    .values(&NewAuthTokenRow {
                        token,
                        user_id: user_id.as_uuid(),
                        created_at: Utc::now(),
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
    ) -> Result<Option<(User, String)>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(UserRow, AuthTokenRow)> = auth_tokens::table
            .inner_join(users::table)
            .filter(auth_tokens::token.eq(token))
            .select((UserRow::as_select(), AuthTokenRow::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(|(user_row, token_row)| Ok((row_to_user(user_row)?, token_row.token)))
            .transpose()
    }
}
