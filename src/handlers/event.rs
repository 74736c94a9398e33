use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::error::AppError;
use crate::middlewares::AuthContext;
use crate::models::*;
use crate::services::EventService;

/// 管理端点: 非 admin 角色一律拒绝
fn require_admin(req: &HttpRequest) -> Result<AuthContext, AppError> {
    match req.extensions().get::<AuthContext>().cloned() {
        Some(ctx) if ctx.is_admin() => Ok(ctx),
        Some(_) => Err(AppError::PermissionDenied),
        None => Err(AppError::AuthError("Missing access token".to_string())),
    }
}

#[utoipa::path(
    get,
    path = "/admin/events",
    tag = "events",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "活动列表 (按开奖日期倒序)", body = [EventResponse]),
        (status = 403, description = "非管理员")
    )
)]
pub async fn list_events(
    service: web::Data<EventService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    if let Err(e) = require_admin(&req) {
        return Ok(e.error_response());
    }
    match service.list_events().await {
        Ok(list) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/events",
    tag = "events",
    request_body = CreateEventRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "创建成功并激活 (其余活动自动下线)", body = EventResponse),
        (status = 400, description = "字段校验失败"),
        (status = 403, description = "非管理员")
    )
)]
/// 创建活动。新活动立即成为唯一的当前活动。
pub async fn create_event(
    service: web::Data<EventService>,
    req: HttpRequest,
    request: web::Json<CreateEventRequest>,
) -> Result<HttpResponse> {
    let ctx = match require_admin(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };
    match service
        .create_event(request.into_inner(), &ctx.principal_id)
        .await
    {
        Ok(event) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": event }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    put,
    path = "/admin/events/{event_id}",
    tag = "events",
    params(
        ("event_id" = i64, Path, description = "活动ID")
    ),
    request_body = UpdateEventRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "编辑成功", body = EventResponse),
        (status = 404, description = "活动不存在"),
        (status = 403, description = "非管理员")
    )
)]
pub async fn update_event(
    service: web::Data<EventService>,
    req: HttpRequest,
    path: web::Path<i64>,
    request: web::Json<UpdateEventRequest>,
) -> Result<HttpResponse> {
    let ctx = match require_admin(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };
    match service
        .update_event(path.into_inner(), request.into_inner(), &ctx.principal_id)
        .await
    {
        Ok(event) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": event }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/events/{event_id}/activate",
    tag = "events",
    params(
        ("event_id" = i64, Path, description = "活动ID")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "激活成功 (其余活动自动下线)", body = EventResponse),
        (status = 404, description = "活动不存在"),
        (status = 403, description = "非管理员")
    )
)]
pub async fn activate_event(
    service: web::Data<EventService>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> Result<HttpResponse> {
    let ctx = match require_admin(&req) {
        Ok(ctx) => ctx,
        Err(e) => return Ok(e.error_response()),
    };
    match service
        .activate_event(path.into_inner(), &ctx.principal_id)
        .await
    {
        Ok(event) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": event }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn event_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin/events")
            .route("", web::get().to(list_events))
            .route("", web::post().to(create_event))
            .route("/{event_id}", web::put().to(update_event))
            .route("/{event_id}/activate", web::post().to(activate_event)),
    );
}
