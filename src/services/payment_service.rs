use crate::entities::{lottery_event_entity as events, lottery_user_entity as users, PaymentStatus};
use crate::error::AppResult;
use crate::external::{ChargeOutcome, MailerService, StripeGateway};
use crate::models::{
    FlowState, PaymentContextResponse, PaymentFlowResponse, SubmitPaymentRequest,
};
use crate::services::gate_service::SIGN_IN_PAGE;
use crate::services::{EventService, FlowSessionService, LedgerService, RegistrationService};

/// 同一会话内支付重试上限 (固定策略常量)
pub const MAX_PAYMENT_ATTEMPTS: i32 = 3;

/// 尝试计数器检查: 达到上限后不再联系网关
fn attempts_exhausted(attempts: i32) -> bool {
    attempts >= MAX_PAYMENT_ATTEMPTS
}

/// 扣款结果到流程动作的转移 (纯函数, 方便单测)
#[derive(Debug, Clone, PartialEq, Eq)]
enum FlowAction {
    /// 入参错误: 不计数, 不落账, 直接把原因返回给前端
    RejectInput { reason: String },
    /// 成功: 清零计数, 落 Paid 行
    Complete { transaction_id: String },
    /// 拒绝但还可重试: 计数+1, 落 Failed 行
    RetryableFailure {
        transaction_id: Option<String>,
        reason: String,
    },
    /// 第三次拒绝: 计数+1, 落 Failed 行, 丢弃待定注册并终止流程
    TerminalFailure {
        transaction_id: Option<String>,
        reason: String,
    },
}

fn next_action(attempts_before: i32, outcome: ChargeOutcome) -> FlowAction {
    match outcome {
        ChargeOutcome::InvalidInput { reason } => FlowAction::RejectInput { reason },
        ChargeOutcome::Succeeded { transaction_id } => FlowAction::Complete { transaction_id },
        ChargeOutcome::Declined {
            transaction_id,
            reason,
        } => {
            if attempts_exhausted(attempts_before + 1) {
                FlowAction::TerminalFailure {
                    transaction_id,
                    reason,
                }
            } else {
                FlowAction::RetryableFailure {
                    transaction_id,
                    reason,
                }
            }
        }
    }
}

/// 注册→支付→开通 流程的支付环节。
/// 每次请求顺序执行: 会话读取 → 计数检查 → 网关扣款 → 账本追加,
/// 两次 I/O 不并发; 跨请求不提供顺序保证 (见账本与中奖提交的不变式)。
#[derive(Clone)]
pub struct PaymentService {
    gateway: StripeGateway,
    sessions: FlowSessionService,
    registration: RegistrationService,
    events: EventService,
    ledger: LedgerService,
    mailer: MailerService,
}

impl PaymentService {
    pub fn new(
        gateway: StripeGateway,
        sessions: FlowSessionService,
        registration: RegistrationService,
        events: EventService,
        ledger: LedgerService,
        mailer: MailerService,
    ) -> Self {
        Self {
            gateway,
            sessions,
            registration,
            events,
            ledger,
            mailer,
        }
    }

    /// 支付页上下文: 当前会话的尝试次数 + 活动金额
    pub async fn payment_context(
        &self,
        session_id: Option<&str>,
    ) -> AppResult<PaymentContextResponse> {
        let attempts = match session_id {
            Some(id) => self
                .sessions
                .load(id)
                .await?
                .map(|s| s.payment_attempts)
                .unwrap_or(0),
            None => 0,
        };

        let active_event = self.events.active_event().await?;
        Ok(match active_event {
            Some(event) => PaymentContextResponse {
                attempt_count: attempts,
                event_id: Some(event.id),
                event_name: Some(event.event_name),
                amount_cents: event.amount_cents,
            },
            None => PaymentContextResponse {
                attempt_count: attempts,
                event_id: None,
                event_name: None,
                amount_cents: 0,
            },
        })
    }

    /// 提交一次支付。
    /// 返回 (会话ID, 流程响应): 成功/耗尽 → redirect, 可重试失败 → error。
    pub async fn submit(
        &self,
        session_id: Option<&str>,
        request: SubmitPaymentRequest,
    ) -> AppResult<(String, PaymentFlowResponse)> {
        let (sid, mut state) = self.load_or_create(session_id).await?;

        // 尝试耗尽: 不联系网关, 丢弃待定注册, 终止本次流程。
        // 计数留在会话里, 后续提交继续短路, 直到会话自然过期
        if attempts_exhausted(state.payment_attempts) {
            if state.pending_registration.take().is_some() {
                self.sessions.save(&sid, &state).await?;
            }
            return Ok((sid, PaymentFlowResponse::redirect(SIGN_IN_PAGE)));
        }

        let Some(active_event) = self.events.active_event().await? else {
            return Ok((
                sid,
                PaymentFlowResponse::error("No active event is open for payment."),
            ));
        };

        // 扣款前先确定归属用户, 无法归属就不扣款
        let Some(user) = self.resolve_user(&request, &state).await? else {
            return Ok((
                sid,
                PaymentFlowResponse::error(
                    "We could not match your payment to a registration.",
                ),
            ));
        };

        let payment_method_id = request.payment_method_id.clone().unwrap_or_default();

        // 实际扣款金额取活动配置; 客户端金额仅回写入流水行
        let ledger_amount = request
            .amount
            .as_deref()
            .and_then(|a| a.parse::<i64>().ok())
            .unwrap_or(active_event.amount_cents);

        let outcome = self
            .gateway
            .charge(&payment_method_id, active_event.amount_cents)
            .await;

        match next_action(state.payment_attempts, outcome) {
            FlowAction::RejectInput { reason } => {
                // 未联系网关, 不计数不落账
                Ok((sid, PaymentFlowResponse::error(reason)))
            }
            FlowAction::Complete { transaction_id } => {
                self.complete(&sid, user, &active_event, transaction_id, ledger_amount)
                    .await?;
                Ok((sid, PaymentFlowResponse::redirect(SIGN_IN_PAGE)))
            }
            FlowAction::RetryableFailure {
                transaction_id,
                reason,
            } => {
                state.payment_attempts += 1;
                self.ledger
                    .record_outcome(
                        user.id,
                        Some(active_event.id),
                        PaymentStatus::Failed,
                        transaction_id,
                        ledger_amount,
                    )
                    .await?;
                self.sessions.save(&sid, &state).await?;
                Ok((sid, PaymentFlowResponse::error(reason)))
            }
            FlowAction::TerminalFailure {
                transaction_id,
                reason,
            } => {
                log::warn!(
                    "Payment attempts exhausted for user {}: {}",
                    user.id,
                    reason
                );
                state.payment_attempts += 1;
                self.ledger
                    .record_outcome(
                        user.id,
                        Some(active_event.id),
                        PaymentStatus::Failed,
                        transaction_id,
                        ledger_amount,
                    )
                    .await?;
                // 丢弃待定注册; 计数写回会话, 保证后续提交全部短路
                state.pending_registration = None;
                self.sessions.save(&sid, &state).await?;
                Ok((sid, PaymentFlowResponse::redirect(SIGN_IN_PAGE)))
            }
        }
    }

    async fn complete(
        &self,
        sid: &str,
        user: users::Model,
        event: &events::Model,
        transaction_id: String,
        ledger_amount: i64,
    ) -> AppResult<()> {
        self.ledger
            .record_outcome(
                user.id,
                Some(event.id),
                PaymentStatus::Paid,
                Some(transaction_id),
                ledger_amount,
            )
            .await?;

        // 身份主体补全失败不回滚支付: 款已入账, 记错误留给人工处理
        let user = match self.registration.ensure_principal(&user).await {
            Ok(updated) => updated,
            Err(e) => {
                log::error!(
                    "Failed to provision identity principal for user {}: {}",
                    user.id,
                    e
                );
                user
            }
        };

        // 待定注册已消费, 丢弃会话
        self.sessions.delete(sid).await?;

        // 回执邮件: 发送方自己已记日志, 这里降级为警告继续
        let subject = format!("Payment received - {}", event.event_name);
        let body = format!(
            "<p>Hi {},</p><p>Your entry payment of {:.2} for {} has been received. Good luck!</p>",
            user.first_name,
            ledger_amount as f64 / 100.0,
            event.event_name
        );
        if let Err(e) = self.mailer.send(&user.email, &subject, &body).await {
            log::warn!("Receipt mail not sent for user {}: {}", user.id, e);
        }

        Ok(())
    }

    /// 会话: 有效则沿用, 否则开新会话 (计数从0开始)
    async fn load_or_create(&self, session_id: Option<&str>) -> AppResult<(String, FlowState)> {
        if let Some(id) = session_id {
            if let Some(state) = self.sessions.load(id).await? {
                return Ok((id.to_string(), state));
            }
        }
        let state = FlowState::default();
        let id = self.sessions.create(&state).await?;
        Ok((id, state))
    }

    /// 归属用户解析: userId 参数 (流程恢复) 优先, 其次会话里的待定注册邮箱
    async fn resolve_user(
        &self,
        request: &SubmitPaymentRequest,
        state: &FlowState,
    ) -> AppResult<Option<users::Model>> {
        if let Some(auth_id) = request.user_id.as_deref().filter(|s| !s.is_empty()) {
            if let Some(user) = self.registration.find_by_auth_id(auth_id).await? {
                return Ok(Some(user));
            }
        }

        if let Some(pending) = &state.pending_registration {
            return self.registration.find_by_email(&pending.email).await;
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declined(reason: &str) -> ChargeOutcome {
        ChargeOutcome::Declined {
            transaction_id: Some("pi_test".to_string()),
            reason: reason.to_string(),
        }
    }

    #[test]
    fn test_attempt_cap_short_circuits_fourth_attempt() {
        // 三次失败后计数为3, 第四次提交必须在网关调用前短路
        let mut attempts = 0;
        for _ in 0..3 {
            assert!(!attempts_exhausted(attempts));
            match next_action(attempts, declined("card_declined")) {
                FlowAction::RetryableFailure { .. } | FlowAction::TerminalFailure { .. } => {
                    attempts += 1;
                }
                other => panic!("unexpected action: {other:?}"),
            }
        }
        assert_eq!(attempts, 3);
        assert!(attempts_exhausted(attempts));
    }

    #[test]
    fn test_third_decline_is_terminal() {
        assert!(matches!(
            next_action(0, declined("card_declined")),
            FlowAction::RetryableFailure { .. }
        ));
        assert!(matches!(
            next_action(1, declined("card_declined")),
            FlowAction::RetryableFailure { .. }
        ));
        assert!(matches!(
            next_action(2, declined("card_declined")),
            FlowAction::TerminalFailure { .. }
        ));
    }

    #[test]
    fn test_success_completes_with_transaction_id() {
        let action = next_action(
            2,
            ChargeOutcome::Succeeded {
                transaction_id: "pi_123".to_string(),
            },
        );
        assert_eq!(
            action,
            FlowAction::Complete {
                transaction_id: "pi_123".to_string()
            }
        );
    }

    #[test]
    fn test_input_error_neither_counts_nor_records() {
        // 缺支付方式: 不应转成失败计数
        let action = next_action(
            0,
            ChargeOutcome::InvalidInput {
                reason: "No payment method provided.".to_string(),
            },
        );
        assert_eq!(
            action,
            FlowAction::RejectInput {
                reason: "No payment method provided.".to_string()
            }
        );
    }
}
