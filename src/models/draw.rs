use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 已支付参与者 (每用户至多出现一次, 与流水行数无关)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaidParticipant {
    pub user_id: i64,
    pub user_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WinnerResponse {
    pub user_id: i64,
    pub user_name: String,
    pub email: String,
    pub event_id: i64,
    pub declared_by: String,
    pub declared_on: Option<DateTime<Utc>>,
}

/// 开奖结果: 服务端已落库的中奖者, 前端只做揭晓动画
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DrawRunResponse {
    pub winner: WinnerResponse,
    pub participant_count: usize,
}
