//! Port abstraction for user and bearer-token persistence.
use async_trait::async_trait;
use pagination::PageParams;

use crate::domain::ids::UserId;
use crate::domain::user::{User, UserRole};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// The username is already taken.
        DuplicateUsername => "username is already taken",
        /// The email address is already registered.
        DuplicateEmail => "email address is already registered",
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user record. Fails with the duplicate variants when the
    /// username or email is already present.
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Persist changes to an existing user.
    async fn update(&self, user: &User) -> Result<(), UserPersistenceError>;

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    async fn find_by_username(&self, username: &str)
        -> Result<Option<User>, UserPersistenceError>;

    /// Lookup by case-insensitive email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserPersistenceError>;

    /// Page of active users with the given role, newest first, plus the total
    /// matching count.
    async fn list_by_role(
        &self,
        role: UserRole,
        params: PageParams,
    ) -> Result<(Vec<User>, u64), UserPersistenceError>;

    /// The user's current bearer token, if one has been issued.
    async fn find_token(&self, user_id: UserId) -> Result<Option<String>, UserPersistenceError>;

    /// Store `token` as the user's bearer token, replacing any previous one.
    async fn replace_token(
        &self,
        user_id: UserId,
        token: &str,
    ) -> Result<(), UserPersistenceError>;

    /// Resolve a bearer token to its user, along with the stored token key.
    async fn find_by_token(
        &self,
        token: &str,
    ) -> Result<Option<(User, String)>, UserPersistenceError>;
}
