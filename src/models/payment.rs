use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{payment_entity as payments, PaymentStatus};

/// 支付提交请求体 (前端 Stripe Elements 拿到 paymentMethodId 后提交)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPaymentRequest {
    #[schema(example = "pm_card_visa")]
    pub payment_method_id: Option<String>,
    /// 恢复流程用: 已注册未支付用户的身份主体ID
    pub user_id: Option<String>,
    /// 前端展示金额, 仅回写入流水行; 实际扣款金额取活动配置
    pub amount: Option<String>,
}

/// 支付流程响应: 成功/耗尽返回 redirect, 可重试失败返回 error
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentFlowResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PaymentFlowResponse {
    pub fn redirect(target: impl Into<String>) -> Self {
        Self {
            redirect: Some(target.into()),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            redirect: None,
            error: Some(message.into()),
        }
    }
}

/// 支付页上下文
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentContextResponse {
    pub attempt_count: i32,
    pub event_id: Option<i64>,
    pub event_name: Option<String>,
    pub amount_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentRecordResponse {
    pub id: i64,
    pub users_id: i64,
    pub event_id: Option<i64>,
    pub payment_status: PaymentStatus,
    pub transaction_ref: String,
    pub amount_cents: i64,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<payments::Model> for PaymentRecordResponse {
    fn from(record: payments::Model) -> Self {
        Self {
            id: record.id,
            users_id: record.users_id,
            event_id: record.event_id,
            payment_status: record.payment_status,
            transaction_ref: record.transaction_ref,
            amount_cents: record.amount_cents,
            created_at: record.created_at,
        }
    }
}

/// 管理端每参与者一行的支付概览
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ParticipantPaymentSummary {
    pub user_id: i64,
    pub user_name: String,
    pub event_name: String,
    pub winner_announcement_date: Option<NaiveDate>,
    /// "Paid" / "Failed" / "Not Paid" 哨兵
    pub payment_status: String,
    pub amount_cents: i64,
    pub paid_on: Option<DateTime<Utc>>,
}

/// 无流水时的状态哨兵
pub fn status_label(status: Option<PaymentStatus>) -> String {
    match status {
        Some(s) => s.to_string(),
        None => "Not Paid".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_label_sentinel() {
        assert_eq!(status_label(Some(PaymentStatus::Paid)), "Paid");
        assert_eq!(status_label(Some(PaymentStatus::Failed)), "Failed");
        assert_eq!(status_label(None), "Not Paid");
    }

    #[test]
    fn test_flow_response_shapes() {
        let ok = PaymentFlowResponse::redirect("/account/login");
        assert!(ok.redirect.is_some() && ok.error.is_none());

        let err = PaymentFlowResponse::error("Payment failed: card_declined");
        assert!(err.redirect.is_none() && err.error.is_some());
    }
}
