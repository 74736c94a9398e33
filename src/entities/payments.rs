use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 支付结果状态, 数据库只存这两种; "未支付" 用 Option::None 表达
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(None)")]
pub enum PaymentStatus {
    #[sea_orm(string_value = "Paid")]
    Paid,
    #[sea_orm(string_value = "Failed")]
    Failed,
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatus::Paid => write!(f, "Paid"),
            PaymentStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// 支付流水实体
/// 说明:
/// - 只追加不更新: 重试失败后的再次支付会新增一行而不是改旧行
/// - "当前状态" 定义为 (users_id, event_id) 下按 created_at desc, id desc
///   排序后的第一行状态
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// 所属用户 (lottery_users.id)
    pub users_id: i64,
    /// 关联活动, 可为空 (历史数据无活动标记)
    pub event_id: Option<i64>,
    pub payment_status: PaymentStatus,
    /// 网关交易号; 网关未返回时回落为本地生成的 uuid
    pub transaction_ref: String,
    pub amount_cents: i64,
    pub created_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
