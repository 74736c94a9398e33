use chrono::Utc;
use rand::Rng;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::entities::{
    lottery_user_entity as users, payment_entity as payments, winner_entity as winners,
    PaymentStatus,
};
use crate::error::{AppError, AppResult};
use crate::models::{DrawRunResponse, PaidParticipant, WinnerResponse};

/// 开奖引擎。
/// 随机选取在服务端完成: 前端只拿已落库的中奖者做揭晓动画,
/// 公平性不依赖客户端代码。
#[derive(Clone)]
pub struct DrawService {
    pool: DatabaseConnection,
}

impl DrawService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 已支付参与者集合。
    /// 以 (用户, 活动) 最新一条流水为准, 每个用户至多出现一次,
    /// 与其名下流水行数无关。
    pub async fn list_paid_participants(&self, event_id: i64) -> AppResult<Vec<PaidParticipant>> {
        // 按新到旧读出该活动全部流水, 每用户首见行即最新行
        let records = payments::Entity::find()
            .filter(payments::Column::EventId.eq(event_id))
            .order_by_desc(payments::Column::CreatedAt)
            .order_by_desc(payments::Column::Id)
            .all(&self.pool)
            .await?;

        let ids = paid_user_ids(&records);
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let mut user_rows = users::Entity::find()
            .filter(users::Column::Id.is_in(ids))
            .all(&self.pool)
            .await?;
        user_rows.sort_by_key(|u| u.id);

        Ok(user_rows
            .into_iter()
            .map(|u| PaidParticipant {
                user_id: u.id,
                user_name: u.user_name,
                email: u.email,
            })
            .collect())
    }

    /// 开奖: 服务端均匀随机选出中奖者并在同一管理动作内落库。
    /// 该活动已有中奖者时返回冲突, 不会追加第二行。
    pub async fn run_draw(&self, event_id: i64, declared_by: &str) -> AppResult<DrawRunResponse> {
        let participants = self.list_paid_participants(event_id).await?;
        if participants.is_empty() {
            return Err(AppError::ValidationError(
                "No paid participants for this event.".to_string(),
            ));
        }

        let winner = {
            let mut rng = rand::thread_rng();
            pick_uniform(&participants, &mut rng)
                .cloned()
                // 上面已排除空池
                .ok_or_else(|| AppError::InternalError("Empty draw pool".to_string()))?
        };

        let record = self
            .commit_winner(event_id, winner.user_id, declared_by)
            .await?;

        Ok(DrawRunResponse {
            winner: WinnerResponse {
                user_id: winner.user_id,
                user_name: winner.user_name,
                email: winner.email,
                event_id,
                declared_by: record.declared_by,
                declared_on: record.created_at,
            },
            participant_count: participants.len(),
        })
    }

    /// 落库一名中奖者。
    /// 事务内先检查该活动是否已有中奖者 (唯一索引兜底并发竞争),
    /// 再校验人选仍在已支付池中。
    pub async fn commit_winner(
        &self,
        event_id: i64,
        winner_user_id: i64,
        declared_by: &str,
    ) -> AppResult<winners::Model> {
        let txn = self.pool.begin().await?;

        let existing = winners::Entity::find()
            .filter(winners::Column::EventId.eq(event_id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(
                "A winner has already been declared for this event.".to_string(),
            ));
        }

        // 人选必须出自已支付池
        let latest = payments::Entity::find()
            .filter(payments::Column::UsersId.eq(winner_user_id))
            .filter(payments::Column::EventId.eq(event_id))
            .order_by_desc(payments::Column::CreatedAt)
            .order_by_desc(payments::Column::Id)
            .one(&txn)
            .await?;
        if latest.map(|r| r.payment_status) != Some(PaymentStatus::Paid) {
            return Err(AppError::ValidationError(
                "Selected user is not a paid participant of this event.".to_string(),
            ));
        }

        let record = winners::ActiveModel {
            users_id: Set(winner_user_id),
            event_id: Set(event_id),
            declared_by: Set(declared_by.to_string()),
            created_at: Set(Some(Utc::now())),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        txn.commit().await?;

        log::info!(
            "Winner declared for event {}: user {} (by {})",
            event_id,
            winner_user_id,
            declared_by
        );

        Ok(record)
    }

    /// 已提交的中奖者 (揭晓动画从这里取数据)
    pub async fn current_winner(&self, event_id: i64) -> AppResult<Option<WinnerResponse>> {
        let Some(record) = winners::Entity::find()
            .filter(winners::Column::EventId.eq(event_id))
            .filter(winners::Column::IsActive.eq(true))
            .one(&self.pool)
            .await?
        else {
            return Ok(None);
        };

        let user = users::Entity::find_by_id(record.users_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Winner user not found".to_string()))?;

        Ok(Some(WinnerResponse {
            user_id: user.id,
            user_name: user.user_name,
            email: user.email,
            event_id,
            declared_by: record.declared_by,
            declared_on: record.created_at,
        }))
    }
}

/// 最新行语义下的已支付用户ID集合。
/// 入参必须按新到旧排好序; 每个用户以首见行为准。
pub(crate) fn paid_user_ids(records_newest_first: &[payments::Model]) -> Vec<i64> {
    let mut seen = std::collections::HashSet::new();
    let mut paid = Vec::new();
    for record in records_newest_first {
        if !seen.insert(record.users_id) {
            continue;
        }
        if record.payment_status == PaymentStatus::Paid {
            paid.push(record.users_id);
        }
    }
    paid
}

/// 均匀随机选取: 每个参与者概率恰为 1/N
pub(crate) fn pick_uniform<'a, T>(pool: &'a [T], rng: &mut impl Rng) -> Option<&'a T> {
    if pool.is_empty() {
        return None;
    }
    Some(&pool[rng.gen_range(0..pool.len())])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn record(id: i64, users_id: i64, created_at: &str, status: PaymentStatus) -> payments::Model {
        payments::Model {
            id,
            users_id,
            event_id: Some(1),
            payment_status: status,
            transaction_ref: format!("txn-{id}"),
            amount_cents: 50000,
            created_by: None,
            created_at: Some(created_at.parse::<DateTime<Utc>>().unwrap()),
            is_active: status == PaymentStatus::Paid,
        }
    }

    #[test]
    fn test_paid_pool_uses_latest_record_per_user() {
        // 用户1: 先失败后成功 → 入池; 用户2: 先成功后失败 → 出池;
        // 用户3: 两条 Paid → 只出现一次
        let rows = vec![
            record(6, 3, "2025-05-03T10:00:00Z", PaymentStatus::Paid),
            record(5, 2, "2025-05-03T09:00:00Z", PaymentStatus::Failed),
            record(4, 1, "2025-05-02T10:00:00Z", PaymentStatus::Paid),
            record(3, 3, "2025-05-02T09:00:00Z", PaymentStatus::Paid),
            record(2, 2, "2025-05-01T10:00:00Z", PaymentStatus::Paid),
            record(1, 1, "2025-05-01T09:00:00Z", PaymentStatus::Failed),
        ];
        let ids = paid_user_ids(&rows);
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&1));
        assert!(ids.contains(&3));
        assert!(!ids.contains(&2));
    }

    #[test]
    fn test_pick_uniform_empty_pool() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool: Vec<i64> = vec![];
        assert!(pick_uniform(&pool, &mut rng).is_none());
    }

    #[test]
    fn test_draw_fairness_chi_square() {
        // 5名参与者抽1万次, 卡方统计量应低于 df=4, p=0.001 的临界值 18.47
        let pool: Vec<i64> = vec![1, 2, 3, 4, 5];
        let draws = 10_000usize;
        let mut rng = StdRng::seed_from_u64(42);

        let mut counts = std::collections::HashMap::new();
        for _ in 0..draws {
            let picked = pick_uniform(&pool, &mut rng).copied().unwrap();
            *counts.entry(picked).or_insert(0usize) += 1;
        }

        // 每个参与者都被抽到过
        assert_eq!(counts.len(), pool.len());

        let expected = draws as f64 / pool.len() as f64;
        let chi_square: f64 = pool
            .iter()
            .map(|id| {
                let observed = *counts.get(id).unwrap_or(&0) as f64;
                (observed - expected).powi(2) / expected
            })
            .sum();

        assert!(
            chi_square < 18.47,
            "chi-square {chi_square} exceeds critical value"
        );
    }
}
