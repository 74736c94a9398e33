use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::entities::{lottery_user_entity as users, PaymentStatus};
use crate::error::AppResult;
use crate::middlewares::AuthContext;
use crate::services::{EventService, LedgerService};

/// 登录页 / 支付页 / 仪表盘跳转目标
pub const SIGN_IN_PAGE: &str = "/account/login";
pub const PAYMENT_PAGE: &str = "/account/payment";
pub const DASHBOARD_PAGE: &str = "/dashboard";

/// 受保护页面入口的放行决定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// 未认证 → 登录页
    SignIn,
    /// "user" 角色未支付 → 支付页, 携带身份主体ID便于流程恢复
    Payment { user_id: Option<String> },
    /// "admin" 角色完全绕过支付检查
    Admin,
    /// 放行
    Granted,
}

impl GateDecision {
    pub fn redirect_target(&self) -> String {
        match self {
            GateDecision::SignIn => SIGN_IN_PAGE.to_string(),
            GateDecision::Payment { user_id: Some(id) } => {
                format!("{PAYMENT_PAGE}?user_id={id}")
            }
            GateDecision::Payment { user_id: None } => PAYMENT_PAGE.to_string(),
            GateDecision::Admin | GateDecision::Granted => DASHBOARD_PAGE.to_string(),
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, GateDecision::Admin | GateDecision::Granted)
    }
}

/// 账户/资料闸门。
/// 纯检查, 无副作用, 每次受保护请求都重新评估: 不在会话里缓存
/// "已支付" 标记, 支付状态永远以账本最新行为准。
#[derive(Clone)]
pub struct GateService {
    pool: DatabaseConnection,
    events: EventService,
    ledger: LedgerService,
}

impl GateService {
    pub fn new(pool: DatabaseConnection, events: EventService, ledger: LedgerService) -> Self {
        Self {
            pool,
            events,
            ledger,
        }
    }

    /// 评估当前主体能否进入受保护区域
    pub async fn evaluate(&self, ctx: Option<&AuthContext>) -> AppResult<GateDecision> {
        let Some(ctx) = ctx else {
            return Ok(GateDecision::SignIn);
        };

        if ctx.is_admin() {
            return Ok(GateDecision::Admin);
        }

        let user = self.find_lottery_user(ctx).await?;
        let status = match &user {
            Some(user) => {
                let active_event = self.events.active_event().await?;
                self.ledger
                    .current_status(user.id, active_event.map(|e| e.id))
                    .await?
            }
            None => None,
        };

        Ok(decide(
            &ctx.role,
            user.is_some().then(|| ctx.principal_id.clone()),
            status,
        ))
    }

    /// 主体ID优先, 邮箱兜底 (历史数据里 auth_user_id 可能尚未回填)
    async fn find_lottery_user(&self, ctx: &AuthContext) -> AppResult<Option<users::Model>> {
        let by_auth_id = users::Entity::find()
            .filter(users::Column::AuthUserId.eq(ctx.principal_id.clone()))
            .one(&self.pool)
            .await?;
        if by_auth_id.is_some() {
            return Ok(by_auth_id);
        }

        let by_email = users::Entity::find()
            .filter(users::Column::Email.eq(ctx.email.to_lowercase()))
            .one(&self.pool)
            .await?;
        Ok(by_email)
    }
}

/// 决策核心 (纯函数):
/// - admin 直通
/// - user 角色: 无用户行或最新流水非 Paid → 支付页, 否则放行
fn decide(
    role: &str,
    known_user_id: Option<String>,
    status: Option<PaymentStatus>,
) -> GateDecision {
    if role == "admin" {
        return GateDecision::Admin;
    }

    match (known_user_id, status) {
        (Some(_), Some(PaymentStatus::Paid)) => GateDecision::Granted,
        (known, _) => GateDecision::Payment { user_id: known },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unpaid_user_always_routed_to_payment() {
        // 无任何流水
        let d = decide("user", Some("p-1".to_string()), None);
        assert_eq!(
            d,
            GateDecision::Payment {
                user_id: Some("p-1".to_string())
            }
        );

        // 最新流水是 Failed
        let d = decide("user", Some("p-1".to_string()), Some(PaymentStatus::Failed));
        assert!(!d.is_granted());

        // 用户行不存在
        let d = decide("user", None, None);
        assert_eq!(d, GateDecision::Payment { user_id: None });
    }

    #[test]
    fn test_paid_user_granted() {
        let d = decide("user", Some("p-1".to_string()), Some(PaymentStatus::Paid));
        assert_eq!(d, GateDecision::Granted);
    }

    #[test]
    fn test_admin_bypasses_payment_gate() {
        // 管理员即使没有流水也直通
        let d = decide("admin", None, None);
        assert_eq!(d, GateDecision::Admin);
        assert!(d.is_granted());
    }

    #[test]
    fn test_redirect_targets() {
        assert_eq!(GateDecision::SignIn.redirect_target(), "/account/login");
        assert_eq!(
            GateDecision::Payment {
                user_id: Some("p-9".to_string())
            }
            .redirect_target(),
            "/account/payment?user_id=p-9"
        );
        assert_eq!(GateDecision::Granted.redirect_target(), "/dashboard");
    }
}
