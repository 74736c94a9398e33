use chrono::{NaiveDate, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use crate::entities::lottery_event_entity as events;
use crate::error::{AppError, AppResult};
use crate::models::{CreateEventRequest, EventResponse, UpdateEventRequest};

/// 活动管理。
/// "当前活动" 的选取规则全仓库只有一条: is_active 且 event_date 未过,
/// 按 event_date 最新者优先 (id 兜底排序)。同一时刻至多一行 is_active,
/// 由创建/激活的写入事务保证。
#[derive(Clone)]
pub struct EventService {
    pool: DatabaseConnection,
}

impl EventService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 创建活动并立即激活 (其余活动在同一事务内下线)
    pub async fn create_event(
        &self,
        request: CreateEventRequest,
        created_by: &str,
    ) -> AppResult<EventResponse> {
        if request.event_name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Event name is required.".to_string(),
            ));
        }
        if request.amount_cents <= 0 {
            return Err(AppError::ValidationError(
                "Amount must be greater than 0".to_string(),
            ));
        }

        let txn = self.pool.begin().await?;

        Self::deactivate_all(&txn).await?;

        let event = events::ActiveModel {
            event_name: Set(request.event_name.trim().to_string()),
            amount_cents: Set(request.amount_cents),
            event_date: Set(request.event_date),
            is_active: Set(true),
            created_by: Set(Some(created_by.to_string())),
            created_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        Ok(event.into())
    }

    /// 编辑活动名称/金额
    pub async fn update_event(
        &self,
        event_id: i64,
        request: UpdateEventRequest,
        updated_by: &str,
    ) -> AppResult<EventResponse> {
        let event = events::Entity::find_by_id(event_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        if let Some(amount) = request.amount_cents {
            if amount <= 0 {
                return Err(AppError::ValidationError(
                    "Amount must be greater than 0".to_string(),
                ));
            }
        }

        let mut am = event.into_active_model();
        if let Some(name) = &request.event_name {
            if name.trim().is_empty() {
                return Err(AppError::ValidationError(
                    "Event name is required.".to_string(),
                ));
            }
            am.event_name = Set(name.trim().to_string());
        }
        if let Some(amount) = request.amount_cents {
            am.amount_cents = Set(amount);
        }
        am.updated_by = Set(Some(updated_by.to_string()));
        am.updated_at = Set(Some(Utc::now()));

        let updated = am.update(&self.pool).await?;
        Ok(updated.into())
    }

    /// 激活指定活动, 其余全部下线 (单活动不变式)
    pub async fn activate_event(&self, event_id: i64, updated_by: &str) -> AppResult<EventResponse> {
        let txn = self.pool.begin().await?;

        let event = events::Entity::find_by_id(event_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        Self::deactivate_all(&txn).await?;

        let mut am = event.into_active_model();
        am.is_active = Set(true);
        am.updated_by = Set(Some(updated_by.to_string()));
        am.updated_at = Set(Some(Utc::now()));
        let updated = am.update(&txn).await?;

        txn.commit().await?;

        Ok(updated.into())
    }

    pub async fn list_events(&self) -> AppResult<Vec<EventResponse>> {
        let list = events::Entity::find()
            .order_by_desc(events::Column::EventDate)
            .order_by_desc(events::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }

    /// 当前可报名/收款的活动
    pub async fn active_event(&self) -> AppResult<Option<events::Model>> {
        let candidates = events::Entity::find()
            .filter(events::Column::IsActive.eq(true))
            .all(&self.pool)
            .await?;
        Ok(pick_active(candidates, Utc::now().date_naive()))
    }

    async fn deactivate_all(txn: &sea_orm::DatabaseTransaction) -> AppResult<()> {
        events::Entity::update_many()
            .col_expr(events::Column::IsActive, Expr::value(false))
            .filter(events::Column::IsActive.eq(true))
            .exec(txn)
            .await?;
        Ok(())
    }
}

/// 选取规则的纯函数实现: 过滤掉开奖日已过的行,
/// 按 (event_date, id) 取最新。写入侧保证了单活动,
/// 这里仍兜底处理多行 is_active 的历史数据。
pub(crate) fn pick_active(
    candidates: Vec<events::Model>,
    today: NaiveDate,
) -> Option<events::Model> {
    candidates
        .into_iter()
        .filter(|e| e.event_date >= today)
        .max_by_key(|e| (e.event_date, e.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: i64, date: &str, is_active: bool) -> events::Model {
        events::Model {
            id,
            event_name: format!("Event {id}"),
            amount_cents: 50000,
            event_date: date.parse().unwrap(),
            is_active,
            created_by: None,
            created_at: None,
            updated_by: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_pick_active_filters_past_dates() {
        let today: NaiveDate = "2025-05-01".parse().unwrap();
        let picked = pick_active(
            vec![event(1, "2025-04-30", true), event(2, "2025-05-10", true)],
            today,
        )
        .unwrap();
        assert_eq!(picked.id, 2);

        // 全部已过期
        assert!(pick_active(vec![event(1, "2025-04-30", true)], today).is_none());
    }

    #[test]
    fn test_pick_active_prefers_latest_date_then_id() {
        let today: NaiveDate = "2025-05-01".parse().unwrap();
        let picked = pick_active(
            vec![
                event(1, "2025-06-01", true),
                event(2, "2025-07-01", true),
                event(3, "2025-07-01", true),
            ],
            today,
        )
        .unwrap();
        // 同日取 id 更大者
        assert_eq!(picked.id, 3);
    }
}
