use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::IdentityConfig;
use crate::error::{AppError, AppResult};

const IDENTITY_TIMEOUT: Duration = Duration::from_secs(10);

/// 身份提供方的主体记录 (本服务只消费, 不实现账号/口令存储)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Principal {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub user_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct CreateUserBody<'a> {
    email: &'a str,
    user_name: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct SignInBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct AddClaimBody<'a> {
    claim_type: &'a str,
    claim_value: &'a str,
}

#[derive(Debug, Deserialize)]
struct RolesResponse {
    roles: Vec<String>,
}

#[derive(Clone)]
pub struct IdentityApi {
    client: Client,
    config: IdentityConfig,
}

impl IdentityApi {
    pub fn new(config: IdentityConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// 按邮箱查主体, 不存在返回 None
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Principal>> {
        let url = format!("{}/api/users/by-email", self.config.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(IDENTITY_TIMEOUT)
            .bearer_auth(&self.config.api_key)
            .query(&[("email", email)])
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let principal: Principal = response.json().await?;
                Ok(Some(principal))
            }
            _ => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(AppError::ExternalApiError(format!(
                    "Identity lookup failed: {}",
                    error_text
                )))
            }
        }
    }

    pub async fn create_user(
        &self,
        email: &str,
        user_name: &str,
        password: &str,
    ) -> AppResult<Principal> {
        let url = format!("{}/api/users", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .timeout(IDENTITY_TIMEOUT)
            .bearer_auth(&self.config.api_key)
            .json(&CreateUserBody {
                email,
                user_name,
                password,
            })
            .send()
            .await?;

        if response.status().is_success() {
            let principal: Principal = response.json().await?;
            Ok(principal)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(AppError::ExternalApiError(format!(
                "Identity create user failed: {}",
                error_text
            )))
        }
    }

    /// 口令校验; 凭据错误返回 Ok(false), 传输失败才报错
    pub async fn sign_in(&self, email: &str, password: &str) -> AppResult<bool> {
        let url = format!("{}/api/sessions", self.config.base_url);

        let response = self
            .client
            .post(&url)
            .timeout(IDENTITY_TIMEOUT)
            .bearer_auth(&self.config.api_key)
            .json(&SignInBody { email, password })
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(false),
            _ => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(AppError::ExternalApiError(format!(
                    "Identity sign-in failed: {}",
                    error_text
                )))
            }
        }
    }

    pub async fn get_roles(&self, principal_id: &str) -> AppResult<Vec<String>> {
        let url = format!("{}/api/users/{}/roles", self.config.base_url, principal_id);

        let response = self
            .client
            .get(&url)
            .timeout(IDENTITY_TIMEOUT)
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        if response.status().is_success() {
            let roles: RolesResponse = response.json().await?;
            Ok(roles.roles)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(AppError::ExternalApiError(format!(
                "Identity role lookup failed: {}",
                error_text
            )))
        }
    }

    /// 给主体追加声明 (角色声明 / display_username 等)
    pub async fn add_claim(
        &self,
        principal_id: &str,
        claim_type: &str,
        claim_value: &str,
    ) -> AppResult<()> {
        let url = format!("{}/api/users/{}/claims", self.config.base_url, principal_id);

        let response = self
            .client
            .post(&url)
            .timeout(IDENTITY_TIMEOUT)
            .bearer_auth(&self.config.api_key)
            .json(&AddClaimBody {
                claim_type,
                claim_value,
            })
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(AppError::ExternalApiError(format!(
                "Identity add claim failed: {}",
                error_text
            )))
        }
    }
}
