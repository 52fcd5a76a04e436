//! JWT minting and verification for access and refresh tokens.

use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::Sha256;

use crate::config::Config;
use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

const ACCESS_TOKEN_TYPE: &str = "access";
const REFRESH_TOKEN_TYPE: &str = "refresh";

/// Random bytes in a token id before hex encoding.
const JTI_BYTES: usize = 16;

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "tokenType")]
    pub token_type: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims carried by a refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: String,
    #[serde(rename = "tokenType")]
    pub token_type: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly minted access/refresh token pair.
#[derive(Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signs and verifies session tokens.
///
/// Access and refresh tokens are signed with separate keys when a refresh
/// secret is configured. Every token carries a random `jti`, so two pairs
/// minted for the same user in the same second still differ.
pub struct TokenService {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    refresh_secret: Vec<u8>,
    access_token_minutes: u64,
    refresh_token_days: u64,
}

impl TokenService {
    pub fn new(
        access_secret: &str,
        refresh_secret: &str,
        access_token_minutes: u64,
        refresh_token_days: u64,
    ) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(refresh_secret.as_bytes()),
            refresh_secret: refresh_secret.as_bytes().to_vec(),
            access_token_minutes,
            refresh_token_days,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.jwt_secret,
            config.refresh_secret(),
            config.access_token_minutes,
            config.refresh_token_days,
        )
    }

    pub fn access_token_minutes(&self) -> u64 {
        self.access_token_minutes
    }

    pub fn refresh_token_days(&self) -> u64 {
        self.refresh_token_days
    }

    /// Mints a new access/refresh pair for a user.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if signing fails or no randomness is
    /// available for the token ids.
    pub fn mint_pair(&self, user_id: i64, user_name: &str) -> Result<TokenPair, AppError> {
        let now = Utc::now();

        let access_claims = AccessClaims {
            sub: user_id.to_string(),
            user_name: user_name.to_string(),
            token_type: ACCESS_TOKEN_TYPE.to_string(),
            jti: generate_jti()?,
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.access_token_minutes as i64)).timestamp(),
        };

        let refresh_claims = RefreshClaims {
            sub: user_id.to_string(),
            token_type: REFRESH_TOKEN_TYPE.to_string(),
            jti: generate_jti()?,
            iat: now.timestamp(),
            exp: (now + Duration::days(self.refresh_token_days as i64)).timestamp(),
        };

        let access_token = encode(&Header::default(), &access_claims, &self.access_encoding)
            .map_err(signing_error)?;
        let refresh_token = encode(&Header::default(), &refresh_claims, &self.refresh_encoding)
            .map_err(signing_error)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Verifies signature, expiry and type of an access token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] "Not authorized, token failed".
    pub fn verify_access(&self, token: &str) -> Result<AccessClaims, AppError> {
        let data = decode::<AccessClaims>(token, &self.access_decoding, &validation())
            .map_err(|e| token_failed(e.to_string()))?;

        if data.claims.token_type != ACCESS_TOKEN_TYPE {
            return Err(token_failed(format!(
                "unexpected token type '{}'",
                data.claims.token_type
            )));
        }

        Ok(data.claims)
    }

    /// Verifies signature, expiry and type of a refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unauthorized`] "Invalid refresh token".
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshClaims, AppError> {
        let data = decode::<RefreshClaims>(token, &self.refresh_decoding, &validation())
            .map_err(|e| invalid_refresh(e.to_string()))?;

        if data.claims.token_type != REFRESH_TOKEN_TYPE {
            return Err(invalid_refresh(format!(
                "unexpected token type '{}'",
                data.claims.token_type
            )));
        }

        Ok(data.claims)
    }

    /// Digest of a refresh token as stored in the database.
    ///
    /// HMAC-SHA256 keyed by the refresh secret, lowercase hex. A database
    /// leak alone does not let anyone replay a session.
    pub fn hash_refresh_token(&self, token: &str) -> Result<String, AppError> {
        let mut mac = HmacSha256::new_from_slice(&self.refresh_secret).map_err(|e| {
            AppError::internal("Invalid refresh secret", json!({ "reason": e.to_string() }))
        })?;
        mac.update(token.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

/// Parses the `sub` claim into a user id.
pub fn subject_id(sub: &str) -> Option<i64> {
    sub.parse().ok()
}

fn validation() -> Validation {
    Validation::new(Algorithm::HS256)
}

fn generate_jti() -> Result<String, AppError> {
    let mut buffer = [0u8; JTI_BYTES];
    getrandom::fill(&mut buffer).map_err(|e| {
        AppError::internal(
            "Failed to generate random bytes",
            json!({ "reason": e.to_string() }),
        )
    })?;
    Ok(hex::encode(buffer))
}

fn signing_error(e: jsonwebtoken::errors::Error) -> AppError {
    AppError::internal("Failed to sign token", json!({ "reason": e.to_string() }))
}

fn token_failed(reason: String) -> AppError {
    AppError::unauthorized("Not authorized, token failed", json!({ "reason": reason }))
}

fn invalid_refresh(reason: String) -> AppError {
    AppError::unauthorized("Invalid refresh token", json!({ "reason": reason }))
}
