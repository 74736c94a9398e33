use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 抽奖参与用户实体
/// 说明:
/// - 与身份提供方的主体是两套记录, auth_user_id 保存主体ID, 可为空
///   (注册流程在支付成功时才落库, 此时身份主体可能尚未创建)
/// - email 全小写存储, 表上有唯一索引
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "lottery_users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// 身份提供方主体ID
    pub auth_user_id: Option<String>,
    pub email: String,
    pub user_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub country: String,
    pub street_line1: String,
    pub street_line2: String,
    pub city: String,
    pub state: String,
    pub zip_postal: String,
    pub mobile: String,
    pub home: Option<String>,
    pub created_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
