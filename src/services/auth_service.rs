use sea_orm::{ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter};

use crate::entities::lottery_user_entity as users;
use crate::error::{AppError, AppResult};
use crate::external::IdentityApi;
use crate::middlewares::AuthContext;
use crate::models::{
    AdminUserResponse, AuthTokens, CreateAdminRequest, LoginRequest, LoginResponse,
};
use crate::services::gate_service::DASHBOARD_PAGE;
use crate::services::{GateDecision, GateService};
use crate::utils::{validate_email, JwtService};

#[derive(Clone)]
pub struct AuthService {
    pool: DatabaseConnection,
    identity: IdentityApi,
    jwt_service: JwtService,
    gate: GateService,
}

impl AuthService {
    pub fn new(
        pool: DatabaseConnection,
        identity: IdentityApi,
        jwt_service: JwtService,
        gate: GateService,
    ) -> Self {
        Self {
            pool,
            identity,
            jwt_service,
            gate,
        }
    }

    /// 登录。
    /// "user" 角色先过闸门: 当前活动未支付时不发令牌, 只给支付页跳转
    /// (口令校验之前就拦, 与闸门 "每次进入都重查账本" 的语义一致)。
    pub async fn login(&self, request: LoginRequest) -> AppResult<LoginResponse> {
        let email = request.email.trim().to_lowercase();

        let principal = self
            .identity
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::AuthError("No account found with this email.".to_string()))?;

        let roles = self.identity.get_roles(&principal.id).await?;
        let role = if roles.iter().any(|r| r == "admin") {
            "admin"
        } else {
            "user"
        };

        if role == "user" {
            let ctx = AuthContext {
                principal_id: principal.id.clone(),
                email: email.clone(),
                role: role.to_string(),
            };
            let decision = self.gate.evaluate(Some(&ctx)).await?;
            if let GateDecision::Payment { .. } = decision {
                // 未支付: 引导去支付, 不签发令牌
                return Ok(LoginResponse {
                    redirect: decision.redirect_target(),
                    tokens: None,
                });
            }
        }

        if !self.identity.sign_in(&email, &request.password).await? {
            return Err(AppError::AuthError("Password is wrong.".to_string()));
        }

        log::info!("User logged in: {}", principal.id);

        Ok(LoginResponse {
            redirect: DASHBOARD_PAGE.to_string(),
            tokens: Some(self.issue_tokens(&principal.id, &email, role)?),
        })
    }

    /// 刷新令牌换新令牌对
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        self.issue_tokens(&claims.sub, &claims.email, &claims.role)
    }

    fn issue_tokens(&self, principal_id: &str, email: &str, role: &str) -> AppResult<AuthTokens> {
        Ok(AuthTokens {
            access_token: self
                .jwt_service
                .generate_access_token(principal_id, email, role)?,
            refresh_token: self
                .jwt_service
                .generate_refresh_token(principal_id, email, role)?,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }

    /// 管理员开管理员账号。
    /// 用户名与邮箱都要跨身份提供方和 lottery_users 查重;
    /// 管理员不建 lottery_users 行 (不参与抽奖)。
    pub async fn create_admin(&self, request: CreateAdminRequest) -> AppResult<AdminUserResponse> {
        let username = request.username.trim().to_string();
        let email = request.email.trim().to_lowercase();

        if username.len() < 3 || username.len() > 32 {
            return Err(AppError::ValidationError(
                "The Username must be at least 3 and at max 32 characters long.".to_string(),
            ));
        }
        validate_email(&email)?;
        if request.password != request.confirm_password {
            return Err(AppError::ValidationError(
                "The password and confirmation password do not match.".to_string(),
            ));
        }
        if request.password.len() < 8 {
            return Err(AppError::ValidationError(
                "Passwords must be at least 8 characters.".to_string(),
            ));
        }

        if self.identity.find_by_email(&email).await?.is_some() {
            return Err(AppError::ValidationError(
                "Email is already registered.".to_string(),
            ));
        }
        let taken = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Email.eq(email.clone()))
                    .add(users::Column::UserName.eq(username.clone())),
            )
            .one(&self.pool)
            .await?;
        if taken.is_some() {
            return Err(AppError::ValidationError(
                "Username or email is already taken.".to_string(),
            ));
        }

        let principal = self
            .identity
            .create_user(&email, &username, &request.password)
            .await?;
        self.identity
            .add_claim(&principal.id, "role", "admin")
            .await?;
        self.identity
            .add_claim(&principal.id, "display_username", &username)
            .await?;

        log::info!("Admin user created: {}", principal.id);

        Ok(AdminUserResponse {
            user_id: principal.id,
            user_name: username,
            email,
        })
    }

    /// 启动播种: 配置的引导管理员不存在则创建。
    /// 外部身份服务不可用时调用方只记错误, 不阻塞启动。
    pub async fn seed_admin(&self, email: &str, password: &str, username: &str) -> AppResult<()> {
        if self.identity.find_by_email(email).await?.is_some() {
            return Ok(());
        }

        let principal = self.identity.create_user(email, username, password).await?;
        self.identity
            .add_claim(&principal.id, "role", "admin")
            .await?;
        self.identity
            .add_claim(&principal.id, "display_username", username)
            .await?;

        log::info!("Seeded bootstrap admin: {}", principal.id);
        Ok(())
    }
}
