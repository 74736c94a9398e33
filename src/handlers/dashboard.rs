use actix_web::{HttpMessage, HttpRequest, HttpResponse, ResponseError, Result, web};
use chrono::Utc;
use serde_json::json;

use crate::middlewares::AuthContext;
use crate::models::*;
use crate::services::{
    DrawService, EventService, GateService, LedgerService, RegistrationService,
};

fn get_auth_context(req: &HttpRequest) -> Option<AuthContext> {
    req.extensions().get::<AuthContext>().cloned()
}

#[utoipa::path(
    get,
    path = "/dashboard",
    tag = "dashboard",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "仪表盘数据; 闸门未放行时返回 {redirect}", body = DashboardResponse),
        (status = 401, description = "未授权")
    )
)]
/// 受保护区域入口。
/// 每次进入都重新过闸门 (支付状态查账本, 不走缓存);
/// 未放行时与支付端点同形状返回 {redirect}。
pub async fn dashboard(
    gate: web::Data<GateService>,
    events: web::Data<EventService>,
    ledger: web::Data<LedgerService>,
    draw: web::Data<DrawService>,
    registration: web::Data<RegistrationService>,
    req: HttpRequest,
) -> Result<HttpResponse> {
    let ctx = get_auth_context(&req);

    let decision = match gate.evaluate(ctx.as_ref()).await {
        Ok(decision) => decision,
        Err(e) => return Ok(e.error_response()),
    };
    if !decision.is_granted() {
        return Ok(HttpResponse::Ok().json(json!({ "redirect": decision.redirect_target() })));
    }

    // 闸门已放行, ctx 必然存在
    let Some(ctx) = ctx else {
        return Ok(HttpResponse::Ok().json(json!({ "redirect": "/account/login" })));
    };

    if ctx.is_admin() {
        let active_event = match events.active_event().await {
            Ok(event) => event,
            Err(e) => return Ok(e.error_response()),
        };
        let participants = match ledger
            .participant_summaries(active_event.as_ref(), &PaginationParams::default())
            .await
        {
            Ok(page) => page.data,
            Err(e) => return Ok(e.error_response()),
        };
        return Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": DashboardResponse {
                is_admin: true,
                user_view: None,
                participants: Some(participants),
            }
        })));
    }

    match user_view(&ctx, &events, &ledger, &draw, &registration).await {
        Ok(view) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": DashboardResponse {
                is_admin: false,
                user_view: Some(view),
                participants: None,
            }
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

async fn user_view(
    ctx: &AuthContext,
    events: &EventService,
    ledger: &LedgerService,
    draw: &DrawService,
    registration: &RegistrationService,
) -> crate::error::AppResult<UserDashboard> {
    let active_event = events.active_event().await?;

    let user = match registration.find_by_auth_id(&ctx.principal_id).await? {
        Some(user) => Some(user),
        None => registration.find_by_email(&ctx.email).await?,
    };

    let status = match &user {
        Some(user) => {
            ledger
                .current_status(user.id, active_event.as_ref().map(|e| e.id))
                .await?
        }
        None => None,
    };

    let (event_name, announcement_date, winner_name) = match &active_event {
        Some(event) => {
            // 公布日期已过才揭晓中奖者
            let winner_name = if winner_visible(event.event_date, Utc::now().date_naive()) {
                draw.current_winner(event.id).await?.map(|w| w.user_name)
            } else {
                None
            };
            (event.event_name.clone(), Some(event.event_date), winner_name)
        }
        None => ("No Active Event".to_string(), None, None),
    };

    Ok(UserDashboard {
        event_name,
        winner_announcement_date: announcement_date,
        payment_status: status_label(status),
        winner_name,
    })
}

pub fn dashboard_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/dashboard", web::get().to(dashboard));
}
