//! Account lifecycle: registration, activation, login, password reset, and
//! profile management.
//!
//! All credential material is validated and hashed here; repositories only
//! ever see finished hashes and opaque tokens. Mail sends are spawned so a
//! slow or failing mailer never blocks the triggering request.

use std::sync::Arc;

use chrono::{Duration, Utc};
use pagination::{Page, PageParams};

use crate::domain::auth::{Actor, Credentials};
use crate::domain::authorization::{self, Action};
use crate::domain::error::Error;
use crate::domain::ids::UserId;
use crate::domain::ports::{
    Mailer, PasswordResetPersistenceError, PasswordResetRepository, UserPersistenceError,
    UserRepository,
};
use crate::domain::token::{
    self, RESET_TOKEN_MAX_AGE_HOURS, TokenSigner, decode_uid, encode_uid,
};
use crate::domain::user::{Email, ProfileUpdate, User, UserRole, Username};

/// Shortest password accepted at registration and reset.
pub const PASSWORD_MIN: usize = 8;

/// Raw registration input, validated field by field by [`IdentityService::register`].
#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub repeated_password: String,
    pub role: String,
}

/// A logged-in session: the bearer token plus the identity it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub token: String,
    pub username: String,
    pub email: String,
    pub user_id: UserId,
}

/// Outcome of following an activation link. Bad links collapse into
/// [`ActivationOutcome::InvalidLink`] without detail, so the endpoint leaks
/// nothing about which part failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationOutcome {
    Activated,
    AlreadyActive,
    InvalidLink,
}

/// Validity of a password-reset token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetTokenStatus {
    Valid,
    Invalid,
    Expired,
}

pub struct IdentityService {
    users: Arc<dyn UserRepository>,
    resets: Arc<dyn PasswordResetRepository>,
    mailer: Arc<dyn Mailer>,
    signer: TokenSigner,
    public_base_url: String,
}

impl IdentityService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        resets: Arc<dyn PasswordResetRepository>,
        mailer: Arc<dyn Mailer>,
        signer: TokenSigner,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            users,
            resets,
            mailer,
            signer,
            public_base_url: public_base_url.into(),
        }
    }

    fn map_user_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            UserPersistenceError::Query { message } => {
                Error::internal(format!("user repository error: {message}"))
            }
            UserPersistenceError::DuplicateUsername => {
                Error::invalid_request("username is already taken")
            }
            UserPersistenceError::DuplicateEmail => {
                Error::invalid_request("email address is already registered")
            }
        }
    }

    fn map_reset_error(error: PasswordResetPersistenceError) -> Error {
        match error {
            PasswordResetPersistenceError::Connection { message } => Error::service_unavailable(
                format!("password reset repository unavailable: {message}"),
            ),
            PasswordResetPersistenceError::Query { message } => {
                Error::internal(format!("password reset repository error: {message}"))
            }
        }
    }

    fn validate_password(password: &str) -> Result<(), Error> {
        if password.len() < PASSWORD_MIN {
            return Err(Error::invalid_request(format!(
                "password must be at least {PASSWORD_MIN} characters"
            )));
        }
        Ok(())
    }

    fn spawn_activation_mail(&self, user: &User) {
        let mailer = Arc::clone(&self.mailer);
        let recipient = user.email().as_str().to_owned();
        let username = user.username().as_str().to_owned();
        let url = format!(
            "{}/api/activate/{}/{}/",
            self.public_base_url,
            encode_uid(user.id()),
            self.signer.make_activation_token(user),
        );
        tokio::spawn(async move {
            if let Err(error) = mailer.send_activation(&recipient, &username, &url).await {
                tracing::error!(%error, %recipient, "activation mail failed");
            }
        });
    }

    fn spawn_reset_mail(&self, user: &User, reset_token: &str) {
        let mailer = Arc::clone(&self.mailer);
        let recipient = user.email().as_str().to_owned();
        let username = user.username().as_str().to_owned();
        let url = format!(
            "{}/password-reset/confirm/?token={reset_token}",
            self.public_base_url
        );
        tokio::spawn(async move {
            if let Err(error) = mailer.send_password_reset(&recipient, &username, &url).await {
                tracing::error!(%error, %recipient, "password reset mail failed");
            }
        });
    }

    /// Create an inactive account, issue its bearer token, and queue the
    /// activation mail.
    pub async fn register(&self, request: RegisterRequest) -> Result<AuthSession, Error> {
        let role: UserRole = request
            .role
            .parse()
            .map_err(|_| Error::invalid_request("role must be 'customer' or 'business'"))?;
        if request.password != request.repeated_password {
            return Err(Error::invalid_request("passwords do not match"));
        }
        Self::validate_password(&request.password)?;
        let username =
            Username::new(request.username).map_err(|e| Error::invalid_request(e.to_string()))?;
        let email = Email::new(request.email).map_err(|e| Error::invalid_request(e.to_string()))?;

        let password_hash = token::hash_password(&request.password);
        let user = User::register(username, email, password_hash, role);
        self.users
            .insert(&user)
            .await
            .map_err(Self::map_user_error)?;

        let bearer = token::generate_bearer_token();
        self.users
            .replace_token(user.id(), &bearer)
            .await
            .map_err(Self::map_user_error)?;

        self.spawn_activation_mail(&user);

        Ok(AuthSession {
            token: bearer,
            username: user.username().as_str().to_owned(),
            email: user.email().as_str().to_owned(),
            user_id: user.id(),
        })
    }

    /// Follow an activation link. Decode failures, unknown users, and stale
    /// or forged tokens all yield [`ActivationOutcome::InvalidLink`].
    pub async fn activate(
        &self,
        uid_encoded: &str,
        activation_token: &str,
    ) -> Result<ActivationOutcome, Error> {
        let Some(user_id) = decode_uid(uid_encoded) else {
            return Ok(ActivationOutcome::InvalidLink);
        };
        let Some(mut user) = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(Self::map_user_error)?
        else {
            return Ok(ActivationOutcome::InvalidLink);
        };
        if user.is_active() {
            // Idempotent: re-following a consumed link is not an error.
            return Ok(ActivationOutcome::AlreadyActive);
        }
        if !self.signer.check_activation_token(&user, activation_token) {
            return Ok(ActivationOutcome::InvalidLink);
        }
        user.activate();
        self.users
            .update(&user)
            .await
            .map_err(Self::map_user_error)?;
        Ok(ActivationOutcome::Activated)
    }

    /// Exchange credentials for the user's bearer token, minting one if the
    /// account has none yet.
    pub async fn login(&self, credentials: Credentials) -> Result<AuthSession, Error> {
        let invalid = || Error::unauthorized("invalid username or password");
        let Some(user) = self
            .users
            .find_by_username(credentials.username())
            .await
            .map_err(Self::map_user_error)?
        else {
            return Err(invalid());
        };
        if !token::verify_password(credentials.password(), user.password_hash()) {
            return Err(invalid());
        }

        let bearer = match self
            .users
            .find_token(user.id())
            .await
            .map_err(Self::map_user_error)?
        {
            Some(existing) => existing,
            None => {
                let fresh = token::generate_bearer_token();
                self.users
                    .replace_token(user.id(), &fresh)
                    .await
                    .map_err(Self::map_user_error)?;
                fresh
            }
        };

        Ok(AuthSession {
            token: bearer,
            username: user.username().as_str().to_owned(),
            email: user.email().as_str().to_owned(),
            user_id: user.id(),
        })
    }

    /// Resolve a presented bearer token to the caller it belongs to.
    pub async fn authenticate(&self, presented: &str) -> Result<(Actor, User), Error> {
        let Some((user, stored)) = self
            .users
            .find_by_token(presented)
            .await
            .map_err(Self::map_user_error)?
        else {
            return Err(Error::unauthorized("invalid authentication token"));
        };
        if !token::tokens_match(presented, &stored) {
            return Err(Error::unauthorized("invalid authentication token"));
        }
        Ok((Actor::from_user(&user), user))
    }

    /// Confirm that a client's cached token still matches server state.
    pub async fn verify_token(&self, actor: &Actor, presented: &str) -> Result<bool, Error> {
        let stored = self
            .users
            .find_token(actor.id)
            .await
            .map_err(Self::map_user_error)?;
        Ok(stored.is_some_and(|stored| token::tokens_match(presented, &stored)))
    }

    /// Record a fresh reset token for the account and queue the reset mail.
    /// Any previously outstanding token for the address is discarded.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), Error> {
        let email = Email::new(email).map_err(|e| Error::invalid_request(e.to_string()))?;
        let Some(user) = self
            .users
            .find_by_email(&email.normalized())
            .await
            .map_err(Self::map_user_error)?
        else {
            return Err(Error::not_found("no account found for this email address"));
        };

        let reset_token = token::generate_reset_token();
        self.resets
            .replace_for_email(&email.normalized(), &reset_token, Utc::now())
            .await
            .map_err(Self::map_reset_error)?;

        self.spawn_reset_mail(&user, &reset_token);
        Ok(())
    }

    pub async fn check_reset_token(&self, reset_token: &str) -> Result<ResetTokenStatus, Error> {
        let Some(row) = self
            .resets
            .find_by_token(reset_token)
            .await
            .map_err(Self::map_reset_error)?
        else {
            return Ok(ResetTokenStatus::Invalid);
        };
        if Utc::now() - row.created_at > Duration::hours(RESET_TOKEN_MAX_AGE_HOURS) {
            return Ok(ResetTokenStatus::Expired);
        }
        Ok(ResetTokenStatus::Valid)
    }

    /// Set a new password for the account behind a valid reset token and
    /// burn the token.
    pub async fn consume_reset_token(
        &self,
        reset_token: &str,
        new_password: &str,
    ) -> Result<(), Error> {
        Self::validate_password(new_password)?;
        match self.check_reset_token(reset_token).await? {
            ResetTokenStatus::Valid => {}
            ResetTokenStatus::Invalid => {
                return Err(Error::invalid_request("unknown or already used reset token"));
            }
            ResetTokenStatus::Expired => {
                return Err(Error::invalid_request("reset token has expired"));
            }
        }
        let row = self
            .resets
            .find_by_token(reset_token)
            .await
            .map_err(Self::map_reset_error)?
            .ok_or_else(|| Error::invalid_request("unknown or already used reset token"))?;
        let Some(mut user) = self
            .users
            .find_by_email(&row.email)
            .await
            .map_err(Self::map_user_error)?
        else {
            return Err(Error::not_found("no account found for this email address"));
        };

        user.set_password_hash(token::hash_password(new_password));
        self.users
            .update(&user)
            .await
            .map_err(Self::map_user_error)?;
        self.resets
            .delete(reset_token)
            .await
            .map_err(Self::map_reset_error)?;
        Ok(())
    }

    pub async fn get_profile(&self, user_id: UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await
            .map_err(Self::map_user_error)?
            .ok_or_else(|| Error::not_found("user not found"))
    }

    /// Patch profile fields; only the subject or staff may do so.
    pub async fn update_profile(
        &self,
        actor: &Actor,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> Result<User, Error> {
        authorization::require(actor, Action::UpdateProfile { subject_id: user_id })?;
        let mut user = self.get_profile(user_id).await?;
        user.apply_profile_update(update);
        self.users
            .update(&user)
            .await
            .map_err(Self::map_user_error)?;
        Ok(user)
    }

    pub async fn list_profiles(
        &self,
        role: UserRole,
        params: PageParams,
    ) -> Result<Page<User>, Error> {
        let (users, count) = self
            .users
            .list_by_role(role, params)
            .await
            .map_err(Self::map_user_error)?;
        Ok(Page::from_counted(users, count, params))
    }
}
