use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::ParticipantPaymentSummary;

/// 普通用户仪表盘视图
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDashboard {
    pub event_name: String,
    pub winner_announcement_date: Option<NaiveDate>,
    pub payment_status: String,
    /// 公布日期已过才填充
    pub winner_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardResponse {
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_view: Option<UserDashboard>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<ParticipantPaymentSummary>>,
}

/// 中奖者只在公布日期当天及之后展示
pub fn winner_visible(event_date: NaiveDate, today: NaiveDate) -> bool {
    event_date <= today
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winner_visible_only_from_announcement_date() {
        let event: NaiveDate = "2025-05-01".parse().unwrap();
        assert!(!winner_visible(event, "2025-04-30".parse().unwrap()));
        assert!(winner_visible(event, "2025-05-01".parse().unwrap()));
        assert!(winner_visible(event, "2025-06-15".parse().unwrap()));
    }
}
