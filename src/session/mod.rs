//! Logged-in session value object and its persistence.
//!
//! A session is built once from a login token, validated, and then passed explicitly to
//! whatever needs the user id or role. "Stay logged in" stores exactly three strings.

pub mod store;

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

use crate::attendance::types::UserId;

pub use store::{FileSessionStore, MemorySessionStore, SessionStore};

pub const TOKEN_KEY: &str = "token";
pub const USER_ID_KEY: &str = "userId";
pub const ROLE_KEY: &str = "role";
pub const SESSION_KEYS: [&str; 3] = [TOKEN_KEY, USER_ID_KEY, ROLE_KEY];

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid session: {0}")]
    Validation(String),
    #[error("token could not be decoded: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("session store error: {0}")]
    Store(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Admin,
    Employee(String),
}

impl Role {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            r if r.eq_ignore_ascii_case("admin") => Role::Admin,
            other => Role::Employee(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "admin",
            Role::Employee(name) => name,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct TokenClaims {
    data: TokenData,
}

#[derive(Debug, Deserialize)]
struct TokenData {
    user_id: Option<UserId>,
}

/// Read `data.user_id` from a login token.
///
/// With a secret the HS256 signature is checked; without one the token is treated as opaque
/// and only its payload is read. Expiry is left to the server.
pub fn user_id_from_token(token: &str, secret: Option<&str>) -> Result<UserId, SessionError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims = HashSet::new();

    let key = match secret {
        Some(secret) => DecodingKey::from_secret(secret.as_bytes()),
        None => {
            validation.insecure_disable_signature_validation();
            DecodingKey::from_secret(&[])
        }
    };

    let claims = decode::<TokenClaims>(token, &key, &validation)?.claims;
    match claims.data.user_id {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(SessionError::Validation("token payload has no user_id".to_string())),
    }
}

/// Authenticated user context
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
    user_id: UserId,
    role: Role,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("role", &self.role)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Session {
    pub fn new(token: String, user_id: UserId, role: Role) -> Result<Self, SessionError> {
        if token.trim().is_empty() {
            return Err(SessionError::Validation("empty token".to_string()));
        }
        if user_id.is_empty() {
            return Err(SessionError::Validation("empty user id".to_string()));
        }
        Ok(Self { token, user_id, role })
    }

    /// Build a session from a login token, taking the user id from its claims
    pub fn from_token(token: &str, role: &str, secret: Option<&str>) -> Result<Self, SessionError> {
        let user_id = user_id_from_token(token, secret)?;
        Self::new(token.to_string(), user_id, Role::parse(role))
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    /// Restore a persisted session. Partial leftovers count as no session.
    pub async fn restore<S>(store: &S) -> Result<Option<Self>, SessionError>
    where
        S: SessionStore + ?Sized,
    {
        let token = store.get(TOKEN_KEY).await?;
        let user_id = store.get(USER_ID_KEY).await?;
        let role = store.get(ROLE_KEY).await?;

        match (token, user_id, role) {
            (Some(token), Some(user_id), Some(role)) => {
                Self::new(token, UserId::new(user_id), Role::parse(&role)).map(Some)
            }
            _ => Ok(None),
        }
    }

    pub async fn persist<S>(&self, store: &S) -> Result<(), SessionError>
    where
        S: SessionStore + ?Sized,
    {
        store
            .set_many(&[
                (TOKEN_KEY, self.token.as_str()),
                (USER_ID_KEY, self.user_id.as_str()),
                (ROLE_KEY, self.role.as_str()),
            ])
            .await
    }

    pub async fn clear<S>(store: &S) -> Result<(), SessionError>
    where
        S: SessionStore + ?Sized,
    {
        store.remove_many(&SESSION_KEYS).await
    }
}
