use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::lottery_event_entity as events;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateEventRequest {
    #[schema(example = "Spring Lottery 2025")]
    pub event_name: String,
    /// 报名费 (美分), 必须大于 0
    #[schema(example = 50000)]
    pub amount_cents: i64,
    /// 开奖公布日期 (YYYY-MM-DD)
    #[schema(example = "2025-05-01")]
    pub event_date: NaiveDate,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateEventRequest {
    pub event_name: Option<String>,
    pub amount_cents: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EventResponse {
    pub id: i64,
    pub event_name: String,
    pub amount_cents: i64,
    pub event_date: NaiveDate,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<events::Model> for EventResponse {
    fn from(event: events::Model) -> Self {
        Self {
            id: event.id,
            event_name: event.event_name,
            amount_cents: event.amount_cents,
            event_date: event.event_date,
            is_active: event.is_active,
            created_at: event.created_at,
        }
    }
}
