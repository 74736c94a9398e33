use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "jane.doe@example.com")]
    pub email: String,
    #[schema(example = "password123")]
    pub password: String,
    pub remember_me: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// 登录响应: 闸门放行时带令牌, 否则只有跳转目标 (如支付页)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub redirect: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<AuthTokens>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateAdminRequest {
    #[schema(example = "ops-admin")]
    pub username: String,
    #[schema(example = "admin@example.com")]
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminUserResponse {
    pub user_id: String,
    pub user_name: String,
    pub email: String,
}
