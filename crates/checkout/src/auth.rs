//! Password hashing and bearer tokens.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use domain::CustomerId;

/// Tokens are valid for a week.
pub const TOKEN_LIFETIME_DAYS: i64 = 7;

const PLACEHOLDER_PASSWORD_LEN: usize = 24;

/// Errors from hashing or token handling.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Access denied. No token provided.")]
    MissingToken,

    #[error("Invalid or expired token.")]
    InvalidToken,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Token encoding failed: {0}")]
    Encoding(String),
}

/// Argon2 password hashing.
#[derive(Clone, Default)]
pub struct PasswordHashing {
    argon: Argon2<'static>,
}

impl PasswordHashing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses custom Argon2 cost parameters (memory in KiB, iterations,
    /// parallelism).
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Result<Self, AuthError> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(Self {
            argon: Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params),
        })
    }

    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AuthError::Hashing(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// False for a wrong password and for a hash that cannot be parsed.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        self.argon
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

/// A random credential for accounts created by checkout.
pub fn placeholder_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(PLACEHOLDER_PASSWORD_LEN)
        .map(char::from)
        .collect()
}

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Customer ID
    pub sub: String,
    pub email: String,
    /// Issued at (Unix timestamp seconds)
    pub iat: usize,
    /// Expiration (Unix timestamp seconds)
    pub exp: usize,
}

impl Claims {
    pub fn customer_id(&self) -> Result<CustomerId, AuthError> {
        self.sub.parse().map_err(|_| AuthError::InvalidToken)
    }
}

/// Issues and verifies HS256 tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    lifetime: chrono::Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            lifetime: chrono::Duration::days(TOKEN_LIFETIME_DAYS),
        }
    }

    pub fn with_lifetime(mut self, lifetime: chrono::Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    pub fn issue(&self, customer_id: CustomerId, email: &str) -> Result<String, AuthError> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: customer_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp().max(0) as usize,
            exp: (now + self.lifetime).timestamp().max(0) as usize,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AuthError::Encoding(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("JWT validation failed: {e}");
                AuthError::InvalidToken
            })
    }
}
