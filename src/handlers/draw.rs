use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::error::AppError;
use crate::middlewares::AuthContext;
use crate::models::*;
use crate::services::DrawService;

fn require_admin(req: &HttpRequest) -> Result<AuthContext, AppError> {
    match req.extensions().get::<AuthContext>().cloned() {
        Some(ctx) if ctx.is_admin() => Ok(ctx),
        Some(_) => Err(AppError::PermissionDenied),
        None => Err(AppError::AuthError("Missing access token".to_string())),
    }
}

#[utoipa::path(
    get,
    path = "/admin/draw/{event_id}/participants",
    tag = "draw",
    params(
        ("event_id" = i64, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已支付参与者集合 (每用户至多一条)", body = [PaidParticipant]),
        (status = 403, description = "非管理员")
    )
)]
pub async fn list_participants(
    service: web::Data<DrawService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    match service.list_paid_participants(path.into_inner()).await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/draw/{event_id}/run",
    tag = "draw",
    params(
        ("event_id" = i64, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "开奖成功, 中奖者已落库", body = DrawRunResponse),
        (status = 400, description = "没有已支付参与者"),
        (status = 409, description = "该活动已有中奖者"),
        (status = 403, description = "非管理员")
    )
)]
/// 开奖: 服务端在已支付池内均匀随机选取并落库。
/// 前端只负责对返回的中奖者播放揭晓动画, 不参与选取。
/// 重复触发返回 409, 不会产生第二名中奖者。
pub async fn run_draw(
    service: web::Data<DrawService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let ctx = match require_admin(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };
    match service.run_draw(path.into_inner(), &ctx.principal_id).await {
        Ok(result) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": result }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/draw/{event_id}/winner",
    tag = "draw",
    params(
        ("event_id" = i64, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "已提交的中奖者 (无则 data 为 null)", body = WinnerResponse),
        (status = 403, description = "非管理员")
    )
)]
pub async fn get_winner(
    service: web::Data<DrawService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    match service.current_winner(path.into_inner()).await {
        Ok(winner) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": winner }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn draw_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin/draw")
            .route("/{event_id}/participants", web::get().to(list_participants))
            .route("/{event_id}/run", web::post().to(run_draw))
            .route("/{event_id}/winner", web::get().to(get_winner)),
    );
}
