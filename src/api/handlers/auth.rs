//! Handlers for registration, login and session endpoints.

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};

use crate::api::cookies::{REFRESH_COOKIE_NAME, read_cookie};
use crate::api::dto::auth::{
    LoginRequest, LoginResponse, ProfileResponse, PublicUser, RegisterRequest, RegisterResponse,
};
use crate::api::dto::envelope::MessageResponse;
use crate::api::extract::{ApiJson, MaybeUser};
use crate::application::services::CurrentUser;
use crate::error::AppError;
use crate::state::AppState;

/// Creates an account and signs the new user in.
///
/// # Endpoint
///
/// `POST /api/v1/auth/register`
///
/// # Request Body
///
/// ```json
/// { "userName": "alice", "email": "alice@example.com", "password": "secret1" }
/// ```
///
/// # Response
///
/// `201 Created` with session cookies and
/// `{ success, message, _id, userName, email }`.
///
/// # Errors
///
/// Returns 400 for missing or malformed fields, or an email that is
/// already registered.
pub async fn register_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.auth_service.register(payload.into()).await?;

    let body = RegisterResponse {
        success: true,
        message: "User registered successfully",
        id: session.user.id,
        user_name: session.user.user_name,
        email: session.user.email,
    };

    Ok((
        StatusCode::CREATED,
        state.cookies.session(&session.tokens),
        Json(body),
    ))
}

/// Signs a user in with email and password.
///
/// # Endpoint
///
/// `POST /api/v1/auth/login`
///
/// # Errors
///
/// - 400 "Please provide email and password"
/// - 401 "User not found. Please register."
/// - 401 "Invalid password"
pub async fn login_handler(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let email = payload.email.unwrap_or_default();
    let password = payload.password.unwrap_or_default();

    let session = state.auth_service.login(&email, &password).await?;

    Ok((
        state.cookies.session(&session.tokens),
        Json(LoginResponse {
            success: true,
            message: "User logged in successfully",
            user: PublicUser::from(session.user),
        }),
    ))
}

/// Ends the session.
///
/// # Endpoint
///
/// `POST /api/v1/auth/logout`
///
/// Always answers 200 and clears both cookies. If the caller is still
/// authenticated their stored refresh digest is cleared as well; a storage
/// failure there is logged, not reported.
pub async fn logout_handler(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> impl IntoResponse {
    let user_id = user.map(|u| u.id);

    if let Err(e) = state.auth_service.logout(user_id).await {
        tracing::error!(?user_id, error = %e, "Failed to clear session on logout");
    }

    (
        state.cookies.cleared(),
        Json(MessageResponse::new("User logged out successfully")),
    )
}

/// Exchanges the refresh cookie for a new token pair.
///
/// # Endpoints
///
/// - `POST /api/v1/auth/refresh`
/// - `POST /api/v1/auth/refresh-token`
///
/// # Errors
///
/// Returns 401 and clears both cookies when the refresh cookie is missing,
/// invalid, expired, or no longer the current one.
pub async fn refresh_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = read_cookie(&headers, REFRESH_COOKIE_NAME);

    match state.auth_service.refresh(token.as_deref()).await {
        Ok(session) => (
            state.cookies.session(&session.tokens),
            Json(MessageResponse::new("Token refreshed successfully")),
        )
            .into_response(),
        Err(e) => (state.cookies.cleared(), e).into_response(),
    }
}

/// The caller's public profile.
///
/// # Endpoint
///
/// `GET /api/v1/auth/profile`
pub async fn profile_handler(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = state.auth_service.profile(user.id).await?;

    Ok(Json(ProfileResponse {
        success: true,
        user: user.into(),
    }))
}
