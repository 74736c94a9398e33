use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::error::AppError;
use crate::middlewares::AuthContext;
use crate::models::*;
use crate::services::{AuthService, EventService, LedgerService, RegistrationService};

fn require_admin(req: &HttpRequest) -> Result<AuthContext, AppError> {
    match req.extensions().get::<AuthContext>().cloned() {
        Some(ctx) if ctx.is_admin() => Ok(ctx),
        Some(_) => Err(AppError::PermissionDenied),
        None => Err(AppError::AuthError("Missing access token".to_string())),
    }
}

#[utoipa::path(
    post,
    path = "/admin/users",
    tag = "admin",
    request_body = CreateAdminRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "管理员账号创建成功", body = AdminUserResponse),
        (status = 400, description = "字段校验失败或邮箱/用户名已被占用"),
        (status = 403, description = "非管理员")
    )
)]
/// 创建管理员账号 (身份主体 + admin 角色声明 + display_username 声明)
pub async fn create_admin(
    auth_service: web::Data<AuthService>,
    req: HttpRequest,
    request: web::Json<CreateAdminRequest>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    match auth_service.create_admin(request.into_inner()).await {
        Ok(admin) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": admin,
            "message": "Admin user created successfully."
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/payments",
    tag = "admin",
    params(
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("page_size" = Option<u32>, Query, description = "每页数量 (默认10)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "每参与者一行的支付概览 (新用户在前)", body = PaginatedResponse<ParticipantPaymentSummary>),
        (status = 403, description = "非管理员")
    )
)]
/// 参与者支付明细: 每用户取最新一条流水, 无流水显示 "Not Paid"
pub async fn list_payments(
    ledger: web::Data<LedgerService>,
    events: web::Data<EventService>,
    req: HttpRequest,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }

    let active_event = match events.active_event().await {
        Ok(event) => event,
        Err(e) => return Ok(e.error_response()),
    };

    match ledger
        .participant_summaries(active_event.as_ref(), &query.into_inner())
        .await
    {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": page }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/payments/{user_id}",
    tag = "admin",
    params(
        ("user_id" = i64, Path, description = "用户ID"),
        ("page" = Option<u32>, Query, description = "页码 (默认1)"),
        ("page_size" = Option<u32>, Query, description = "每页数量 (默认10)")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "单个参与者的完整支付历史 (新流水在前)"),
        (status = 404, description = "用户不存在"),
        (status = 403, description = "非管理员")
    )
)]
/// 单参与者下钻: 用户资料 + 按时间倒序的全部流水
pub async fn get_user_payments(
    ledger: web::Data<LedgerService>,
    registration: web::Data<RegistrationService>,
    req: HttpRequest,
    path: web::Path<i64>,
    query: web::Query<PaginationParams>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }

    let user_id = path.into_inner();
    let user = match registration.find_by_id(user_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return Ok(AppError::NotFound("User not found".to_string()).error_response());
        }
        Err(e) => return Ok(e.error_response()),
    };

    match ledger.history(user_id, &query.into_inner()).await {
        Ok(page) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": {
                "user": LotteryUserResponse::from(user),
                "payments": page
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/users", web::post().to(create_admin))
            .route("/payments", web::get().to(list_payments))
            .route("/payments/{user_id}", web::get().to(get_user_payments)),
    );
}
