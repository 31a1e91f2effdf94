use chrono::{TimeDelta, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod password;
pub mod permission;

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "jwt";

/// Longest session lifetime a token may be issued for (one year)
pub const MAX_EXPIRY_HOURS: u64 = 24 * 365;

/// Session token claims; the issuer is the authenticated user's id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Claims valid for `expiry_hours`, which must be in `1..=MAX_EXPIRY_HOURS`
    pub fn new(user_id: i64, expiry_hours: u64) -> Result<Self, JwtError> {
        if !(1..=MAX_EXPIRY_HOURS).contains(&expiry_hours) {
            return Err(JwtError::InvalidExpiry(expiry_hours));
        }

        let now = Utc::now();
        let exp = i64::try_from(expiry_hours)
            .ok()
            .and_then(TimeDelta::try_hours)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or(JwtError::InvalidExpiry(expiry_hours))?;

        Ok(Self {
            iss: user_id.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        })
    }

    /// Seconds between issue and expiry
    pub fn lifetime_secs(&self) -> i64 {
        self.exp - self.iat
    }

    pub fn user_id(&self) -> Result<i64, JwtError> {
        self.iss
            .parse()
            .map_err(|_| JwtError::InvalidSubject(self.iss.clone()))
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("JWT token expired")]
    Expired,

    #[error("JWT issuer is not a user id: {0}")]
    InvalidSubject(String),

    #[error("JWT expiry of {0} hours is outside 1..={max}", max = MAX_EXPIRY_HOURS)]
    InvalidExpiry(u64),
}

pub fn generate_jwt(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::default(), claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Verify signature and expiry, returning the claims
pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims, JwtError> {
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }
    if token.trim().is_empty() {
        return Err(JwtError::InvalidToken("empty token".to_string()));
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::InvalidToken(e.to_string()),
    })?;

    Ok(token_data.claims)
}
