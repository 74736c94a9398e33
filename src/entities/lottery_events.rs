use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 抽奖活动实体
/// event_date 为开奖公布日期; is_active 同一时刻只允许一行为 true,
/// 由 EventService 在写入事务内保证
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "lottery_events")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub event_name: String,
    /// 报名费 (美分)
    pub amount_cents: i64,
    pub event_date: NaiveDate,
    pub is_active: bool,
    pub created_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_by: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
