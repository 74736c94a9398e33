use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::lottery_user_entity as users;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LotteryUserResponse {
    pub id: i64,
    pub auth_user_id: Option<String>,
    pub email: String,
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub country: String,
    pub city: String,
    pub state: String,
    pub mobile: String,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<users::Model> for LotteryUserResponse {
    fn from(user: users::Model) -> Self {
        Self {
            id: user.id,
            auth_user_id: user.auth_user_id,
            email: user.email,
            user_name: user.user_name,
            first_name: user.first_name,
            last_name: user.last_name,
            country: user.country,
            city: user.city,
            state: user.state,
            mobile: user.mobile,
            created_at: user.created_at,
        }
    }
}
