//! Credential material: password hashes, opaque bearer tokens, and signed
//! activation tokens.
//!
//! Password hashes use PBKDF2-SHA256 in the `pbkdf2:sha256:iterations$salt$hash`
//! encoding so existing records stay verifiable if the iteration count is
//! raised later. Activation tokens are not stored: they are HMACs over the
//! user's id and activation state, so flipping `is_active` invalidates every
//! previously issued token.

use chrono::{DateTime, Duration, Utc};
use constant_time_eq::constant_time_eq;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use super::ids::UserId;
use super::user::User;

type HmacSha256 = Hmac<Sha256>;

/// PBKDF2 iteration count applied to new hashes.
pub const PBKDF2_ITERATIONS: u32 = 390_000;

const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;
/// Bearer tokens are 20 random bytes rendered as 40 hex characters.
const BEARER_TOKEN_LEN: usize = 20;
/// Reset tokens are longer-lived than bearer tokens and get more entropy.
const RESET_TOKEN_LEN: usize = 32;

/// Validity window for signed activation tokens.
pub const ACTIVATION_TOKEN_MAX_AGE_HOURS: i64 = 72;

/// Validity window for stored password-reset tokens.
pub const RESET_TOKEN_MAX_AGE_HOURS: i64 = 24;

fn random_hex(len: usize) -> String {
    let mut bytes = vec![0_u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generate an opaque bearer token for authenticated calls.
#[must_use]
pub fn generate_bearer_token() -> String {
    random_hex(BEARER_TOKEN_LEN)
}

/// Generate an opaque password-reset token.
#[must_use]
pub fn generate_reset_token() -> String {
    random_hex(RESET_TOKEN_LEN)
}

/// Compare two opaque tokens without leaking the mismatch position.
#[must_use]
pub fn tokens_match(presented: &str, stored: &str) -> bool {
    constant_time_eq(presented.as_bytes(), stored.as_bytes())
}

/// Hash a password with a fresh random salt.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let mut salt = [0_u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    encode_hash(password, &salt, PBKDF2_ITERATIONS)
}

fn encode_hash(password: &str, salt: &[u8], iterations: u32) -> String {
    let mut out = [0_u8; HASH_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut out);
    format!(
        "pbkdf2:sha256:{iterations}${}${}",
        hex::encode(salt),
        hex::encode(out)
    )
}

/// Verify a password against a stored `pbkdf2:sha256:iterations$salt$hash`
/// string. Malformed stored values verify as `false` rather than erroring;
/// they can only result from direct database tampering.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((header, rest)) = stored.split_once('$') else {
        return false;
    };
    let Some((salt_hex, _hash_hex)) = rest.split_once('$') else {
        return false;
    };
    let mut header_parts = header.split(':');
    let (Some("pbkdf2"), Some("sha256"), Some(iterations)) = (
        header_parts.next(),
        header_parts.next(),
        header_parts.next(),
    ) else {
        return false;
    };
    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let recomputed = encode_hash(password, &salt, iterations);
    constant_time_eq(recomputed.as_bytes(), stored.as_bytes())
}

/// Encode a user id for inclusion in an activation link path segment.
#[must_use]
pub fn encode_uid(id: UserId) -> String {
    URL_SAFE_NO_PAD.encode(id.as_uuid().to_string().as_bytes())
}

/// Decode an activation link user id; any malformed input yields `None`.
#[must_use]
pub fn decode_uid(encoded: &str) -> Option<UserId> {
    let bytes = URL_SAFE_NO_PAD.decode(encoded).ok()?;
    let raw = String::from_utf8(bytes).ok()?;
    raw.parse().ok()
}

/// Issues and checks signed, time-windowed tokens bound to a user's state.
///
/// The MAC covers a purpose namespace, the user id, the current activation
/// flag, and the issue timestamp. Tokens therefore expire, cannot be
/// replayed across users or purposes, and stop verifying once the account
/// state they were bound to changes.
#[derive(Clone)]
pub struct TokenSigner {
    secret: Vec<u8>,
}

impl TokenSigner {
    /// Build a signer over the process-wide secret key.
    #[must_use]
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Issue an activation token for the user's current state.
    #[must_use]
    pub fn make_activation_token(&self, user: &User) -> String {
        self.make_token_at(user, Utc::now())
    }

    fn make_token_at(&self, user: &User, issued_at: DateTime<Utc>) -> String {
        let ts = issued_at.timestamp();
        let mac = self.signature(user, ts);
        format!("{ts:x}-{mac}")
    }

    /// Check an activation token against the user's current state.
    #[must_use]
    pub fn check_activation_token(&self, user: &User, token: &str) -> bool {
        self.check_token_at(user, token, Utc::now())
    }

    fn check_token_at(&self, user: &User, token: &str, now: DateTime<Utc>) -> bool {
        let Some((ts_hex, presented_mac)) = token.split_once('-') else {
            return false;
        };
        let Ok(ts) = i64::from_str_radix(ts_hex, 16) else {
            return false;
        };
        let expected = self.signature(user, ts);
        if !constant_time_eq(expected.as_bytes(), presented_mac.as_bytes()) {
            return false;
        }
        let age = now.timestamp() - ts;
        age >= 0 && age <= Duration::hours(ACTIVATION_TOKEN_MAX_AGE_HOURS).num_seconds()
    }

    fn signature(&self, user: &User, ts: i64) -> String {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
        let payload = format!("activation:{}:{}:{ts}", user.id(), user.is_active());
        mac.update(payload.as_bytes());
        let digest = mac.finalize().into_bytes();
        hex::encode(&digest[..16])
    }
}
