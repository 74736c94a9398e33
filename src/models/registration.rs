use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::utils::{validate_email, validate_mobile};

/// 注册表单提交
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegistrationRequest {
    #[schema(example = "jane.doe@example.com")]
    pub email: String,
    #[schema(example = "Jane")]
    pub first_name: String,
    pub middle_name: Option<String>,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "United States")]
    pub country: String,
    pub street_line1: String,
    pub street_line2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_postal: String,
    #[schema(example = "+12345678901")]
    pub mobile: String,
    pub home: Option<String>,
}

/// 会话中暂存的待定注册资料。
/// 只在流程会话里存在, 支付成功时提升为 lottery_users 行,
/// 尝试次数耗尽时随会话一起丢弃, 不会直接落库。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRegistration {
    pub email: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub country: String,
    pub street_line1: String,
    pub street_line2: String,
    pub city: String,
    pub state: String,
    pub zip_postal: String,
    pub mobile: String,
    pub home: String,
}

impl RegistrationRequest {
    /// 校验必填字段并归一化 (邮箱转小写, 可选字段空值归一为空串)
    pub fn normalize(self) -> AppResult<PendingRegistration> {
        fn required(value: &str, field: &str) -> AppResult<String> {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(AppError::ValidationError(format!("{field} is required.")));
            }
            Ok(trimmed.to_string())
        }
        fn optional(value: Option<String>) -> String {
            value.map(|v| v.trim().to_string()).unwrap_or_default()
        }

        let email = required(&self.email, "Email")?.to_lowercase();
        validate_email(&email)?;
        let mobile = required(&self.mobile, "Mobile")?;
        validate_mobile(&mobile)?;

        Ok(PendingRegistration {
            email,
            first_name: required(&self.first_name, "First name")?,
            middle_name: optional(self.middle_name),
            last_name: required(&self.last_name, "Last name")?,
            country: required(&self.country, "Country")?,
            street_line1: required(&self.street_line1, "Street Line 1")?,
            street_line2: optional(self.street_line2),
            city: required(&self.city, "City")?,
            state: required(&self.state, "State")?,
            zip_postal: required(&self.zip_postal, "Zip/Postal Code")?,
            mobile,
            home: optional(self.home),
        })
    }
}

impl PendingRegistration {
    /// 展示用姓名: "First Last"
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// 流程会话状态: 支付尝试计数 + 待定注册资料
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowState {
    pub payment_attempts: i32,
    pub pending_registration: Option<PendingRegistration>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegistrationResponse {
    pub redirect: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegistrationRequest {
        RegistrationRequest {
            email: "Jane.Doe@Example.com".to_string(),
            first_name: " Jane ".to_string(),
            middle_name: None,
            last_name: "Doe".to_string(),
            country: "United States".to_string(),
            street_line1: "1 Main St".to_string(),
            street_line2: None,
            city: "Springfield".to_string(),
            state: "IL".to_string(),
            zip_postal: "62704".to_string(),
            mobile: "+12345678901".to_string(),
            home: None,
        }
    }

    #[test]
    fn test_normalize_lowercases_email_and_fills_optionals() {
        let pending = request().normalize().unwrap();
        assert_eq!(pending.email, "jane.doe@example.com");
        assert_eq!(pending.first_name, "Jane");
        assert_eq!(pending.middle_name, "");
        assert_eq!(pending.street_line2, "");
        assert_eq!(pending.home, "");
    }

    #[test]
    fn test_normalize_rejects_missing_required_fields() {
        let mut req = request();
        req.city = "  ".to_string();
        assert!(req.normalize().is_err());

        let mut req = request();
        req.email = "not-an-email".to_string();
        assert!(req.normalize().is_err());
    }
}
