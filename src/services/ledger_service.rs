use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::{
    lottery_event_entity as events, lottery_user_entity as users, payment_entity as payments,
    PaymentStatus,
};
use crate::error::AppResult;
use crate::models::{
    status_label, PaginatedResponse, PaginationParams, ParticipantPaymentSummary,
    PaymentRecordResponse,
};

/// Append-only payment ledger. A retry after failure appends a new row;
/// nothing here updates a row in place. "Current status" is defined as the
/// newest row by (created_at, id) for a (user, event) pair, with `None`
/// standing in for the "Not Paid" sentinel.
#[derive(Clone)]
pub struct LedgerService {
    pool: DatabaseConnection,
}

impl LedgerService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// Append one outcome row. Never fails for business reasons; storage
    /// errors propagate. A missing gateway transaction id (declined charge
    /// with no intent) falls back to a locally generated uuid.
    pub async fn record_outcome(
        &self,
        users_id: i64,
        event_id: Option<i64>,
        status: PaymentStatus,
        transaction_ref: Option<String>,
        amount_cents: i64,
    ) -> AppResult<payments::Model> {
        let record = payments::ActiveModel {
            users_id: Set(users_id),
            event_id: Set(event_id),
            payment_status: Set(status),
            transaction_ref: Set(
                transaction_ref.unwrap_or_else(|| Uuid::new_v4().to_string())
            ),
            amount_cents: Set(amount_cents),
            created_by: Set(Some(users_id.to_string())),
            created_at: Set(Some(Utc::now())),
            is_active: Set(status == PaymentStatus::Paid),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        Ok(record)
    }

    /// Newest row for the pair, explicit id tiebreak for equal timestamps.
    pub async fn latest_record(
        &self,
        users_id: i64,
        event_id: Option<i64>,
    ) -> AppResult<Option<payments::Model>> {
        let mut query = payments::Entity::find().filter(payments::Column::UsersId.eq(users_id));
        if let Some(event_id) = event_id {
            query = query.filter(payments::Column::EventId.eq(event_id));
        }

        let record = query
            .order_by_desc(payments::Column::CreatedAt)
            .order_by_desc(payments::Column::Id)
            .one(&self.pool)
            .await?;

        Ok(record)
    }

    /// `None` is the "Not Paid" sentinel.
    pub async fn current_status(
        &self,
        users_id: i64,
        event_id: Option<i64>,
    ) -> AppResult<Option<PaymentStatus>> {
        Ok(self
            .latest_record(users_id, event_id)
            .await?
            .map(|r| r.payment_status))
    }

    /// Payment history for one user, newest first.
    pub async fn history(
        &self,
        users_id: i64,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<PaymentRecordResponse>> {
        let base_query = payments::Entity::find().filter(payments::Column::UsersId.eq(users_id));

        let total = base_query.clone().count(&self.pool).await? as i64;

        let items = base_query
            .order_by_desc(payments::Column::CreatedAt)
            .order_by_desc(payments::Column::Id)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        Ok(PaginatedResponse::new(
            items.into_iter().map(Into::into).collect(),
            params.page.unwrap_or(1),
            params.get_limit(),
            total,
        ))
    }

    /// Admin overview: one row per participant with the latest payment state,
    /// newest users first.
    pub async fn participant_summaries(
        &self,
        active_event: Option<&events::Model>,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<ParticipantPaymentSummary>> {
        let event_name = active_event
            .map(|e| e.event_name.clone())
            .unwrap_or_else(|| "No Active Event".to_string());
        let announcement_date = active_event.map(|e| e.event_date);

        let base_query = users::Entity::find().filter(users::Column::IsActive.eq(true));

        let total = base_query.clone().count(&self.pool).await? as i64;

        let page_users = base_query
            .order_by_desc(users::Column::Id)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;

        let mut rows = Vec::with_capacity(page_users.len());
        for user in page_users {
            let latest = self.latest_record(user.id, None).await?;
            rows.push(ParticipantPaymentSummary {
                user_id: user.id,
                user_name: user.user_name,
                event_name: event_name.clone(),
                winner_announcement_date: announcement_date,
                payment_status: status_label(latest.as_ref().map(|r| r.payment_status)),
                amount_cents: latest.as_ref().map(|r| r.amount_cents).unwrap_or(0),
                paid_on: latest.and_then(|r| r.created_at).or(user.created_at),
            });
        }

        Ok(PaginatedResponse::new(
            rows,
            params.page.unwrap_or(1),
            params.get_limit(),
            total,
        ))
    }
}

/// Reduction used by the ledger contract: the newest row by
/// (created_at, id) wins, regardless of input order.
pub(crate) fn latest_of(records: &[payments::Model]) -> Option<&payments::Model> {
    records.iter().max_by_key(|r| (r.created_at, r.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn record(id: i64, created_at: &str, status: PaymentStatus) -> payments::Model {
        payments::Model {
            id,
            users_id: 1,
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
    fn test_latest_record_wins_regardless_of_input_order() {
        // 旧 Paid + 新 Failed: 当前状态必须反映新行
        let rows = vec![
            record(2, "2025-05-02T10:00:00Z", PaymentStatus::Failed),
            record(1, "2025-05-01T10:00:00Z", PaymentStatus::Paid),
        ];
        assert_eq!(
            latest_of(&rows).map(|r| r.payment_status),
            Some(PaymentStatus::Failed)
        );

        // 新行一旦存在, 旧行不再可见
        let rows = vec![
            record(1, "2025-05-01T10:00:00Z", PaymentStatus::Failed),
            record(2, "2025-05-02T10:00:00Z", PaymentStatus::Paid),
            record(3, "2025-05-03T10:00:00Z", PaymentStatus::Paid),
        ];
        assert_eq!(
            latest_of(&rows).map(|r| r.payment_status),
            Some(PaymentStatus::Paid)
        );
    }

    #[test]
    fn test_latest_record_id_tiebreak() {
        // created_at 相同, id 大者胜
        let rows = vec![
            record(5, "2025-05-01T10:00:00Z", PaymentStatus::Failed),
            record(6, "2025-05-01T10:00:00Z", PaymentStatus::Paid),
        ];
        assert_eq!(latest_of(&rows).map(|r| r.id), Some(6));
    }

    #[test]
    fn test_empty_ledger_is_not_paid() {
        assert!(latest_of(&[]).is_none());
    }
}
