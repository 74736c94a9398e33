use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};
use serde_json::json;

use crate::handlers::registration::{FLOW_COOKIE, flow_cookie};
use crate::models::*;
use crate::services::PaymentService;

fn session_id_from_request(req: &HttpRequest) -> Option<String> {
    req.cookie(FLOW_COOKIE).map(|c| c.value().to_string())
}

#[utoipa::path(
    get,
    path = "/payment/context",
    tag = "payment",
    responses(
        (status = 200, description = "当前会话尝试次数与活动金额", body = PaymentContextResponse)
    )
)]
/// 支付页上下文 (尝试计数 + 当前活动金额)
pub async fn payment_context(
    service: web::Data<PaymentService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let session_id = session_id_from_request(&req);
    match service.payment_context(session_id.as_deref()).await {
        Ok(context) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": context }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/payment/submit",
    tag = "payment",
    request_body = SubmitPaymentRequest,
    responses(
        (status = 200, description = "成功/耗尽返回 {redirect}, 可重试失败返回 {error}", body = PaymentFlowResponse)
    )
)]
/// 提交一次支付。
/// 响应体不走通用信封: 前端按 {redirect}/{error} 两种形状处理。
pub async fn submit_payment(
    service: web::Data<PaymentService>,
    req: HttpRequest,
    request: web::Json<SubmitPaymentRequest>,
) -> Result<HttpResponse> {
    let session_id = session_id_from_request(&req);
    match service
        .submit(session_id.as_deref(), request.into_inner())
        .await
    {
        Ok((session_id, response)) => Ok(HttpResponse::Ok()
            .cookie(flow_cookie(&session_id))
            .json(response)),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn payment_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/payment")
            .route("/context", web::get().to(payment_context))
            .route("/submit", web::post().to(submit_payment)),
    );
}
