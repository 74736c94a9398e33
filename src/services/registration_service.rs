use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};

use crate::entities::lottery_user_entity as users;
use crate::error::{AppError, AppResult};
use crate::external::IdentityApi;
use crate::models::{FlowState, PendingRegistration, RegistrationRequest, RegistrationResponse};
use crate::services::gate_service::PAYMENT_PAGE;
use crate::services::FlowSessionService;

#[derive(Clone)]
pub struct RegistrationService {
    pool: DatabaseConnection,
    identity: IdentityApi,
    sessions: FlowSessionService,
}

impl RegistrationService {
    pub fn new(
        pool: DatabaseConnection,
        identity: IdentityApi,
        sessions: FlowSessionService,
    ) -> Self {
        Self {
            pool,
            identity,
            sessions,
        }
    }

    /// 注册表单提交:
    /// 1. 校验并归一化输入
    /// 2. 邮箱在身份提供方与 lottery_users 两边都必须未被占用
    /// 3. 立即创建用户行 (auth_user_id 此时为空, 身份主体在支付成功后创建并回填)
    /// 4. 新建流程会话暂存待定注册资料, 引导进入支付步骤
    pub async fn begin_registration(
        &self,
        request: RegistrationRequest,
    ) -> AppResult<(String, RegistrationResponse)> {
        let pending = request.normalize()?;

        if self.identity.find_by_email(&pending.email).await?.is_some() {
            return Err(AppError::ValidationError(
                "An account with this email already exists.".to_string(),
            ));
        }
        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(pending.email.clone()))
            .one(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AppError::ValidationError(
                "An account with this email already exists in the lottery system.".to_string(),
            ));
        }

        self.insert_user(&pending).await?;

        let state = FlowState {
            payment_attempts: 0,
            pending_registration: Some(pending),
        };
        let session_id = self.sessions.create(&state).await?;

        Ok((
            session_id,
            RegistrationResponse {
                redirect: PAYMENT_PAGE.to_string(),
            },
        ))
    }

    /// 幂等落库: 并发双提交时第二次插入失败则回读既有行,
    /// 邮箱唯一索引保证不会出现两个同邮箱用户
    async fn insert_user(&self, pending: &PendingRegistration) -> AppResult<users::Model> {
        let inserted = users::ActiveModel {
            auth_user_id: Set(None),
            email: Set(pending.email.clone()),
            user_name: Set(pending.display_name()),
            first_name: Set(pending.first_name.clone()),
            middle_name: Set(pending.middle_name.clone()),
            last_name: Set(pending.last_name.clone()),
            country: Set(pending.country.clone()),
            street_line1: Set(pending.street_line1.clone()),
            street_line2: Set(pending.street_line2.clone()),
            city: Set(pending.city.clone()),
            state: Set(pending.state.clone()),
            zip_postal: Set(pending.zip_postal.clone()),
            mobile: Set(pending.mobile.clone()),
            home: Set(Some(pending.home.clone())),
            created_by: Set(None),
            created_at: Set(Some(Utc::now())),
            is_active: Set(true),
            ..Default::default()
        }
        .insert(&self.pool)
        .await;

        match inserted {
            Ok(model) => Ok(model),
            Err(e) => {
                // 唯一索引冲突: 回读既有行而不是报错
                if let Some(existing) = self.find_by_email(&pending.email).await? {
                    return Ok(existing);
                }
                Err(AppError::DatabaseError(e))
            }
        }
    }

    pub async fn find_by_id(&self, id: i64) -> AppResult<Option<users::Model>> {
        let user = users::Entity::find_by_id(id).one(&self.pool).await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<users::Model>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email.to_lowercase()))
            .one(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_auth_id(&self, auth_user_id: &str) -> AppResult<Option<users::Model>> {
        let user = users::Entity::find()
            .filter(users::Column::AuthUserId.eq(auth_user_id))
            .one(&self.pool)
            .await?;
        Ok(user)
    }

    /// 支付成功后的身份主体补全:
    /// 身份提供方无此邮箱则创建主体 (初始口令随机, 用户走身份系统的重置流程),
    /// 追加 "user" 角色声明, 并把主体ID回填到用户行。
    /// 已有主体时只做缺失的回填: 重复调用无副作用。
    pub async fn ensure_principal(&self, user: &users::Model) -> AppResult<users::Model> {
        if user.auth_user_id.is_some() {
            return Ok(user.clone());
        }

        let principal = match self.identity.find_by_email(&user.email).await? {
            Some(principal) => principal,
            None => {
                let temp_password = uuid::Uuid::new_v4().to_string();
                let principal = self
                    .identity
                    .create_user(&user.email, &user.user_name, &temp_password)
                    .await?;
                self.identity.add_claim(&principal.id, "role", "user").await?;
                self.identity
                    .add_claim(&principal.id, "display_username", &user.user_name)
                    .await?;
                principal
            }
        };

        let mut am = user.clone().into_active_model();
        am.auth_user_id = Set(Some(principal.id));
        let updated = am.update(&self.pool).await?;
        Ok(updated)
    }
}
