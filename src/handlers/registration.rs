use actix_web::{HttpResponse, ResponseError, Result, cookie::Cookie, web};
use serde_json::json;

use crate::models::*;
use crate::services::RegistrationService;

/// 流程会话 Cookie 名 (注册与支付两步共用)
pub const FLOW_COOKIE: &str = "lottery_flow";

pub fn flow_cookie(session_id: &str) -> Cookie<'static> {
    Cookie::build(FLOW_COOKIE, session_id.to_string())
        .path("/")
        .http_only(true)
        .finish()
}

#[utoipa::path(
    post,
    path = "/registration",
    tag = "registration",
    request_body = RegistrationRequest,
    responses(
        (status = 200, description = "注册资料已暂存, 引导进入支付步骤", body = RegistrationResponse),
        (status = 400, description = "字段校验失败或邮箱已被占用")
    )
)]
/// 提交注册表单:
/// 校验 → 邮箱查重 → 建用户行 → 待定注册入流程会话 → 跳支付页。
/// 响应会种下流程会话 Cookie, 支付步骤靠它取回尝试计数与待定资料。
pub async fn register(
    service: web::Data<RegistrationService>,
    request: web::Json<RegistrationRequest>,
) -> Result<HttpResponse> {
    match service.begin_registration(request.into_inner()).await {
        Ok((session_id, response)) => Ok(HttpResponse::Ok()
            .cookie(flow_cookie(&session_id))
            .json(json!({ "success": true, "data": response }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn registration_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/registration", web::post().to(register));
}
