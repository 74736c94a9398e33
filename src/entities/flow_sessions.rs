use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 注册/支付流程会话实体
/// data 列保存序列化后的 FlowState (支付尝试计数 + 待定注册资料);
/// 过期行在读取时过滤, 由 FlowSessionService 顺带清理
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "flow_sessions")]
pub struct Model {
    #[sea_orm(primary_key, column_type = "Text", auto_increment = false)]
    pub id: String,
    pub data: Json,
    pub expiry_date: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
