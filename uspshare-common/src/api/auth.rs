//! Credential primitives: password hashing and bearer tokens
//!
//! Framework-free: the HTTP layer wraps these in its own middleware.
//!
//! - Passwords are hashed with Argon2id (PHC string format).
//! - Tokens are HS256 JWTs carrying `userId` and `exp` claims.
//! - The signing secret comes from configuration, or is generated once and
//!   stored in the `settings` table so tokens survive restarts.

use crate::db::Store;
use crate::{Error, Result};
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Settings key holding the generated signing secret
pub const JWT_SECRET_SETTING: &str = "jwt_secret";

const GENERATED_SECRET_LEN: usize = 64;

/// Hash a password for storage
///
/// Argon2 is CPU and memory heavy, so the work runs on the blocking pool.
pub async fn hash_password(password: &str) -> Result<String> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || argon2_hash(&password))
        .await
        .map_err(|e| Error::Internal(format!("Password hashing task failed: {}", e)))?
}

/// Check a password against a stored hash on the blocking pool
///
/// Malformed hashes never verify.
pub async fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let password = password.to_owned();
    let stored_hash = stored_hash.to_owned();
    tokio::task::spawn_blocking(move || argon2_verify(&password, &stored_hash))
        .await
        .map_err(|e| Error::Internal(format!("Password verification task failed: {}", e)))
}

fn argon2_hash(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::rngs::OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))
}

fn argon2_verify(password: &str, stored_hash: &str) -> bool {
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// Token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    /// Expiry, seconds since the Unix epoch
    pub exp: i64,
}

/// Signing and verification keys derived from one shared secret
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_hours: i64,
}

impl std::fmt::Debug for TokenKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenKeys")
            .field("ttl_hours", &self.ttl_hours)
            .finish_non_exhaustive()
    }
}

impl TokenKeys {
    pub fn new(secret: &[u8], ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl_hours,
        }
    }

    /// Issue a token for `user_id` expiring after the configured TTL
    pub fn issue(&self, user_id: Uuid) -> Result<String> {
        let claims = Claims {
            user_id,
            exp: crate::time::epoch_seconds_after_hours(self.ttl_hours),
        };
        self.encode_claims(&claims)
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| Error::Internal(format!("Token encoding failed: {}", e)))
    }

    /// Validate signature and expiry and return the claims
    pub fn validate(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| Error::Auth(format!("Invalid token: {}", e)))
    }
}

/// Resolve the signing secret
///
/// A configured secret wins. Otherwise the secret stored in `settings` is
/// used, generating and storing a random one on first start.
pub async fn load_or_init_secret(store: &Store, configured: Option<&str>) -> Result<String> {
    if let Some(secret) = configured {
        return Ok(secret.to_string());
    }

    if let Some(existing) = store.get_setting(JWT_SECRET_SETTING).await? {
        return Ok(existing);
    }

    let generated: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_SECRET_LEN)
        .map(char::from)
        .collect();
    let stored = store.init_setting(JWT_SECRET_SETTING, &generated).await?;
    info!("Generated new token signing secret");
    Ok(stored)
}
