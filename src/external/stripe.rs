use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::StripeConfig;
use crate::error::{AppError, AppResult};

/// 网关调用超时: 超时按拒绝处理, 与显式拒绝走同一条失败路径
const GATEWAY_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub status: String,
    pub amount: i64,
}

/// 单次扣款的三态结果。
/// InvalidInput 表示尚未联系网关 (无交易号, 不计入失败流水);
/// 传输异常与网关拒绝统一折叠为 Declined。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChargeOutcome {
    Succeeded {
        transaction_id: String,
    },
    Declined {
        transaction_id: Option<String>,
        reason: String,
    },
    InvalidInput {
        reason: String,
    },
}

#[derive(Clone)]
pub struct StripeGateway {
    client: Client,
    config: StripeConfig,
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// 创建 PaymentIntent (automatic payment methods, 禁用跳转类支付方式)
    pub async fn create_intent(&self, amount_cents: i64, currency: &str) -> AppResult<PaymentIntent> {
        let url = "https://api.stripe.com/v1/payment_intents";

        let amount = amount_cents.to_string();
        let params = [
            ("amount", amount.as_str()),
            ("currency", currency),
            ("automatic_payment_methods[enabled]", "true"),
            ("automatic_payment_methods[allow_redirects]", "never"),
        ];

        let response = self
            .client
            .post(url)
            .timeout(GATEWAY_TIMEOUT)
            .bearer_auth(&self.config.secret_key)
            .form(&params)
            .send()
            .await?;

        if response.status().is_success() {
            let payment_intent: PaymentIntent = response.json().await?;
            Ok(payment_intent)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(AppError::ExternalApiError(format!(
                "Failed to create payment intent: {}",
                error_text
            )))
        }
    }

    /// 以支付方式确认 PaymentIntent
    pub async fn confirm_intent(
        &self,
        intent_id: &str,
        payment_method_id: &str,
    ) -> AppResult<PaymentIntent> {
        let url = format!(
            "https://api.stripe.com/v1/payment_intents/{}/confirm",
            intent_id
        );

        let params = [("payment_method", payment_method_id)];

        let response = self
            .client
            .post(&url)
            .timeout(GATEWAY_TIMEOUT)
            .bearer_auth(&self.config.secret_key)
            .form(&params)
            .send()
            .await?;

        if response.status().is_success() {
            let payment_intent: PaymentIntent = response.json().await?;
            Ok(payment_intent)
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(AppError::ExternalApiError(format!(
                "Failed to confirm payment intent: {}",
                error_text
            )))
        }
    }

    /// 一次性扣款: 建意图 → 确认。
    /// 每次调用都会发起一笔新的扣款, 这里不做去重: 重试上限由流程层的
    /// 尝试计数器控制。
    pub async fn charge(&self, payment_method_id: &str, amount_cents: i64) -> ChargeOutcome {
        if payment_method_id.trim().is_empty() {
            return ChargeOutcome::InvalidInput {
                reason: "No payment method provided.".to_string(),
            };
        }

        let intent = match self.create_intent(amount_cents, &self.config.currency).await {
            Ok(intent) => intent,
            Err(e) => {
                return ChargeOutcome::Declined {
                    transaction_id: None,
                    reason: e.to_string(),
                };
            }
        };

        match self.confirm_intent(&intent.id, payment_method_id).await {
            Ok(confirmed) if confirmed.status == "succeeded" => ChargeOutcome::Succeeded {
                transaction_id: confirmed.id,
            },
            Ok(confirmed) => ChargeOutcome::Declined {
                transaction_id: Some(confirmed.id),
                reason: format!("Payment failed: {}", confirmed.status),
            },
            Err(e) => ChargeOutcome::Declined {
                transaction_id: None,
                reason: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_payment_method_short_circuits() {
        let gateway = StripeGateway::new(StripeConfig {
            secret_key: "sk_test_123".to_string(),
            currency: "usd".to_string(),
        });

        // 空支付方式不应联系网关
        let outcome = gateway.charge("", 50000).await;
        assert_eq!(
            outcome,
            ChargeOutcome::InvalidInput {
                reason: "No payment method provided.".to_string()
            }
        );

        let outcome = gateway.charge("   ", 50000).await;
        assert!(matches!(outcome, ChargeOutcome::InvalidInput { .. }));
    }
}
