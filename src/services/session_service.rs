use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use uuid::Uuid;

use crate::entities::flow_session_entity as sessions;
use crate::error::AppResult;
use crate::models::FlowState;

/// 注册/支付流程会话存储。
/// 会话状态 (支付尝试计数 + 待定注册资料) 按会话ID落在 flow_sessions 表,
/// 作为显式参数传入各流程, 不用进程内全局变量。
/// 过期行读取时过滤, 新建会话时顺带清理: 本服务不起后台任务。
#[derive(Clone)]
pub struct FlowSessionService {
    pool: DatabaseConnection,
    ttl_minutes: i64,
}

impl FlowSessionService {
    pub fn new(pool: DatabaseConnection, ttl_minutes: i64) -> Self {
        Self { pool, ttl_minutes }
    }

    /// 新建会话, 返回会话ID
    pub async fn create(&self, state: &FlowState) -> AppResult<String> {
        // 顺带清掉已过期的会话行
        self.delete_expired().await?;

        let id = Uuid::new_v4().to_string();
        sessions::ActiveModel {
            id: Set(id.clone()),
            data: Set(serde_json::to_value(state)?),
            expiry_date: Set(Utc::now() + Duration::minutes(self.ttl_minutes)),
        }
        .insert(&self.pool)
        .await?;

        Ok(id)
    }

    /// 读取会话状态; 不存在或已过期返回 None (过期行顺带删除)
    pub async fn load(&self, id: &str) -> AppResult<Option<FlowState>> {
        let Some(model) = sessions::Entity::find_by_id(id).one(&self.pool).await? else {
            return Ok(None);
        };

        if model.expiry_date <= Utc::now() {
            sessions::Entity::delete_by_id(id).exec(&self.pool).await?;
            return Ok(None);
        }

        let state: FlowState = serde_json::from_value(model.data)?;
        Ok(Some(state))
    }

    /// 写回会话状态并顺延过期时间 (空闲TTL)
    pub async fn save(&self, id: &str, state: &FlowState) -> AppResult<()> {
        let expiry = Utc::now() + Duration::minutes(self.ttl_minutes);
        let data = serde_json::to_value(state)?;

        match sessions::Entity::find_by_id(id).one(&self.pool).await? {
            Some(existing) => {
                let mut am = existing.into_active_model();
                am.data = Set(data);
                am.expiry_date = Set(expiry);
                am.update(&self.pool).await?;
            }
            None => {
                sessions::ActiveModel {
                    id: Set(id.to_string()),
                    data: Set(data),
                    expiry_date: Set(expiry),
                }
                .insert(&self.pool)
                .await?;
            }
        }

        Ok(())
    }

    /// 删除会话 (支付成功或尝试耗尽时丢弃流程状态)
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        sessions::Entity::delete_by_id(id).exec(&self.pool).await?;
        Ok(())
    }

    /// 清理所有已过期会话, 返回删除行数
    pub async fn delete_expired(&self) -> AppResult<u64> {
        let result = sessions::Entity::delete_many()
            .filter(sessions::Column::ExpiryDate.lte(Utc::now()))
            .exec(&self.pool)
            .await?;
        Ok(result.rows_affected)
    }
}
