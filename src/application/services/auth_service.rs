//! Registration, login and refresh-token session management.

use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use crate::application::services::token_service::{
    AccessClaims, TokenPair, TokenService, subject_id,
};
use crate::config::Config;
use crate::domain::entities::{NewUser, User, normalize_email};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::utils::password::{hash_password, verify_password};

const MISSING_REGISTRATION_FIELDS: &str = "Please provide name, email, and password";
const MISSING_LOGIN_FIELDS: &str = "Please provide email and password";
const EMAIL_TAKEN: &str = "User with this email already exists";
const USER_NOT_FOUND: &str = "User not found. Please register.";
const INVALID_PASSWORD: &str = "Invalid password";
const NO_REFRESH_TOKEN: &str = "No refresh token provided";
const INVALID_REFRESH_TOKEN: &str = "Invalid refresh token";

/// Registration input, checked after trimming and email normalization.
#[derive(Debug, Clone, Validate)]
pub struct Registration {
    #[validate(length(
        min = 3,
        max = 50,
        message = "Username should be between 3 and 50 characters."
    ))]
    pub user_name: String,
    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password should be at least 6 characters long"))]
    pub password: String,
}

/// The identity attached to an authenticated request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub user_name: String,
}

/// A user with a freshly minted token pair.
pub struct Session {
    pub user: User,
    pub tokens: TokenPair,
}

/// Service for account registration and token-based sessions.
///
/// Only an HMAC digest of the current refresh token is stored. Refresh is a
/// compare-and-swap on that digest: of two concurrent refreshes presenting the
/// same token, at most one succeeds.
pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        tokens: Arc<TokenService>,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            user_repository,
            tokens,
            bcrypt_cost,
        }
    }

    pub fn from_config(user_repository: Arc<dyn UserRepository>, config: &Config) -> Self {
        Self::new(
            user_repository,
            Arc::new(TokenService::from_config(config)),
            config.bcrypt_cost,
        )
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Creates an account and starts its first session.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if a field is missing or malformed
    /// - [`AppError::Conflict`] "User with this email already exists"
    pub async fn register(&self, registration: Registration) -> Result<Session, AppError> {
        if registration.user_name.trim().is_empty()
            || registration.email.trim().is_empty()
            || registration.password.is_empty()
        {
            return Err(AppError::bad_request(
                MISSING_REGISTRATION_FIELDS,
                json!({ "fields": ["userName", "email", "password"] }),
            ));
        }

        let registration = Registration {
            user_name: registration.user_name.trim().to_string(),
            email: normalize_email(&registration.email),
            password: registration.password,
        };
        registration.validate()?;

        if self
            .user_repository
            .find_by_email(&registration.email)
            .await?
            .is_some()
        {
            return Err(email_taken(&registration.email));
        }

        let password_hash = hash_password(registration.password, self.bcrypt_cost).await?;

        let user = self
            .user_repository
            .create(NewUser {
                user_name: registration.user_name,
                email: registration.email.clone(),
                password_hash,
            })
            .await
            .map_err(|e| match e {
                AppError::Conflict { .. } => email_taken(&registration.email),
                other => other,
            })?;

        tracing::info!(user_id = user.id, "User registered");

        self.start_session(user).await
    }

    /// Verifies credentials and starts a new session.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] if a field is missing
    /// - [`AppError::Unauthorized`] for an unknown email or a wrong password
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AppError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AppError::bad_request(
                MISSING_LOGIN_FIELDS,
                json!({ "fields": ["email", "password"] }),
            ));
        }

        let email = normalize_email(email);

        let user = self
            .user_repository
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::unauthorized(USER_NOT_FOUND, json!({})))?;

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            tracing::info!(user_id = user.id, "Login rejected: invalid password");
            return Err(AppError::unauthorized(
                INVALID_PASSWORD,
                json!({ "user_id": user.id }),
            ));
        }

        tracing::info!(user_id = user.id, "User logged in");

        self.start_session(user).await
    }

    /// Ends the caller's session by clearing the stored refresh digest.
    ///
    /// Anonymous callers and unknown users are a no-op.
    pub async fn logout(&self, user_id: Option<i64>) -> Result<(), AppError> {
        let Some(user_id) = user_id else {
            return Ok(());
        };

        if let Some(user) = self.user_repository.find_by_id(user_id).await? {
            self.user_repository.save_session(&user.end_session()).await?;
            tracing::info!(user_id, "User logged out");
        }

        Ok(())
    }

    /// Exchanges a refresh token for a new pair and invalidates the old one.
    ///
    /// # Errors
    ///
    /// - [`AppError::Unauthorized`] "No refresh token provided"
    /// - [`AppError::Unauthorized`] "Invalid refresh token" for a bad
    ///   signature, an expired token, an unknown user or a token that is no
    ///   longer the current one
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<Session, AppError> {
        let token = refresh_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::unauthorized(NO_REFRESH_TOKEN, json!({})))?;

        let claims = self.tokens.verify_refresh(token)?;

        let user_id = subject_id(&claims.sub)
            .ok_or_else(|| invalid_refresh(json!({ "reason": "malformed subject" })))?;

        let user = self
            .user_repository
            .find_by_id(user_id)
            .await
            .map_err(storage_failure)?
            .ok_or_else(|| invalid_refresh(json!({ "reason": "unknown user" })))?;

        let presented_hash = self.tokens.hash_refresh_token(token)?;

        if user.refresh_token_hash.as_deref() != Some(presented_hash.as_str()) {
            tracing::warn!(user_id, "Refresh token reuse or revoked session");
            return Err(invalid_refresh(json!({ "reason": "token is not current" })));
        }

        let tokens = self.tokens.mint_pair(user.id, &user.user_name)?;
        let new_hash = self.tokens.hash_refresh_token(&tokens.refresh_token)?;
        let session = user.start_session(new_hash, Utc::now());

        let user = self
            .user_repository
            .rotate_session(&presented_hash, &session)
            .await
            .map_err(storage_failure)?
            .ok_or_else(|| {
                tracing::warn!(user_id, "Concurrent refresh lost the rotation race");
                invalid_refresh(json!({ "reason": "token rotated concurrently" }))
            })?;

        tracing::debug!(user_id, "Refresh token rotated");

        Ok(Session { user, tokens })
    }

    /// Validates an access token and returns the caller's identity.
    ///
    /// No storage access: revocation takes effect when the access token
    /// expires.
    pub fn authenticate(&self, access_token: &str) -> Result<CurrentUser, AppError> {
        let AccessClaims { sub, user_name, .. } = self.tokens.verify_access(access_token)?;

        let id = subject_id(&sub).ok_or_else(|| {
            AppError::unauthorized(
                "Not authorized, token failed",
                json!({ "reason": "malformed subject" }),
            )
        })?;

        Ok(CurrentUser { id, user_name })
    }

    /// The caller's account.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the account no longer exists.
    pub async fn profile(&self, user_id: i64) -> Result<User, AppError> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found", json!({ "user_id": user_id })))
    }

    /// Mints a pair and persists the refresh digest and login time together.
    async fn start_session(&self, user: User) -> Result<Session, AppError> {
        let tokens = self.tokens.mint_pair(user.id, &user.user_name)?;
        let refresh_hash = self.tokens.hash_refresh_token(&tokens.refresh_token)?;
        let session = user.start_session(refresh_hash, Utc::now());

        let user = self
            .user_repository
            .save_session(&session)
            .await?
            .ok_or_else(|| {
                AppError::internal(
                    "User disappeared while starting session",
                    json!({ "user_id": user.id }),
                )
            })?;

        Ok(Session { user, tokens })
    }
}

fn email_taken(email: &str) -> AppError {
    AppError::conflict(EMAIL_TAKEN, json!({ "email": email }))
}

fn invalid_refresh(details: serde_json::Value) -> AppError {
    AppError::unauthorized(INVALID_REFRESH_TOKEN, details)
}

fn storage_failure(e: AppError) -> AppError {
    tracing::error!(error = %e, details = %e.details(), "Storage failure during refresh");
    invalid_refresh(json!({ "reason": "storage failure" }))
}
