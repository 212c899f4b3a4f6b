use serde::{Deserialize, Serialize};

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for logout.
#[derive(Debug, Deserialize)]
pub struct LogoutRequest {
    pub email: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub access_token: String,
    pub user_email: String,
}

/// Response returned on logout; the access token is blanked so clients drop it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    pub success: bool,
    pub access_token: String,
}

/// Response for the protected probe route.
#[derive(Debug, Serialize)]
pub struct ProtectedResponse {
    pub success: bool,
    pub message: String,
}

/// Response returned after a successful token refresh.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub success: bool,
    pub access_token: String,
}
