use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use axum_extra::extract::CookieJar;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::state::AppState;

use super::{
    cookie::{clear_refresh_cookie, refresh_cookie, REFRESH_COOKIE_NAME},
    dto::{
        LoginRequest, LoginResponse, LogoutRequest, LogoutResponse, ProtectedResponse,
        RefreshResponse, RegisterRequest,
    },
    error::AuthError,
    extractors::AuthUser,
    jwt::TokenKeys,
    password::{hash_password, verify_password},
    repo::User,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user/register", post(register))
        .route("/user/login", post(login))
        .route("/user/logout", post(logout))
        .route("/user/protected", post(protected))
}

pub fn refresh_routes() -> Router<AppState> {
    Router::new().route("/refresh_token", post(refresh))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<StatusCode, AuthError> {
    // Emails are stored exactly as presented; only the shape is checked.
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AuthError::InvalidEmail);
    }

    if payload.password.len() < 8 {
        warn!("password too short");
        return Err(AuthError::PasswordTooShort);
    }

    let hash = hash_password(&payload.password)?;

    // No pre-check: the UNIQUE constraint decides, and a violation comes back
    // as EmailTaken through the error conversion.
    let user = User::create(&state.db, &payload.email, &hash).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(StatusCode::CREATED)
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, (StatusCode, Json<LoginResponse>)), AuthError> {
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(AuthError::InvalidEmail);
    }

    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            AuthError::UnknownEmail
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AuthError::BadPassword);
    }

    let keys = TokenKeys::from_ref(&state);
    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;

    // Overwrite: any previously issued refresh token is dead from here on.
    User::set_refresh_token(&state.db, user.id, &refresh_token).await?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    let jar = jar.add(refresh_cookie(refresh_token));
    Ok((
        jar,
        (
            StatusCode::CREATED,
            Json(LoginResponse {
                success: true,
                access_token,
                user_email: user.email,
            }),
        ),
    ))
}

#[instrument(skip(state, jar, payload))]
pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LogoutRequest>,
) -> (CookieJar, Result<Json<LogoutResponse>, AuthError>) {
    // The cookie is dropped no matter what happens server-side.
    let jar = jar.remove(clear_refresh_cookie());

    let result = match User::clear_refresh_token_by_email(&state.db, &payload.email).await {
        Ok(0) => Err(AuthError::Internal(anyhow::anyhow!(
            "logout for unknown email"
        ))),
        Ok(_) => {
            info!(email = %payload.email, "user logged out");
            Ok(Json(LogoutResponse {
                success: true,
                access_token: String::new(),
            }))
        }
        Err(e) => Err(e.into()),
    };

    (jar, result)
}

#[instrument(skip_all)]
pub async fn protected(AuthUser(user_id): AuthUser) -> Json<ProtectedResponse> {
    info!(user_id = %user_id, "protected route accessed");
    Json(ProtectedResponse {
        success: true,
        message: "You have access to protected route".to_string(),
    })
}

#[instrument(skip(state, jar))]
pub async fn refresh(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, (StatusCode, Json<RefreshResponse>)), AuthError> {
    let presented = jar
        .get(REFRESH_COOKIE_NAME)
        .map(|c| c.value().to_owned())
        .ok_or(AuthError::MissingRefreshToken)?;

    let keys = TokenKeys::from_ref(&state);

    // Fail closed: a token that does not verify never reaches the store.
    let claims = keys.verify_refresh(&presented).map_err(|e| {
        warn!(error = %e, "refresh token rejected");
        AuthError::TokenRejected
    })?;

    let user = User::find_by_id(&state.db, claims.sub)
        .await?
        .ok_or(AuthError::UnknownRefreshUser)?;

    // The stored value is the single source of truth. Anything else is a
    // superseded or stolen token; revoke the session so the holder of the
    // current token has to log in again.
    if user.refresh_token.as_deref() != Some(presented.as_str()) {
        warn!(user_id = %user.id, "refresh token mismatch, revoking session");
        User::clear_refresh_token(&state.db, user.id).await?;
        return Err(AuthError::RefreshTokenMismatch);
    }

    let access_token = keys.sign_access(user.id)?;
    let new_refresh_token = keys.sign_refresh(user.id)?;
    User::set_refresh_token(&state.db, user.id, &new_refresh_token).await?;

    info!(user_id = %user.id, "session refreshed");
    let jar = jar.add(refresh_cookie(new_refresh_token));
    Ok((
        jar,
        (
            StatusCode::CREATED,
            Json(RefreshResponse {
                success: true,
                access_token,
            }),
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_response_uses_camel_case_keys() {
        let response = LoginResponse {
            success: true,
            access_token: "abc".into(),
            user_email: "a@x.com".into(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""accessToken":"abc""#));
        assert!(json.contains(r#""userEmail":"a@x.com""#));
        assert!(json.contains(r#""success":true"#));
    }

    #[test]
    fn logout_response_blanks_access_token() {
        let response = LogoutResponse {
            success: true,
            access_token: String::new(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains(r#""accessToken":"""#));
    }

    #[test]
    fn email_shape_check() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("First.Last@example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("spaces in@x.com"));
        assert!(!is_valid_email("a@no-tld"));
    }
}
