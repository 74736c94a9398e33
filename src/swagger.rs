use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::PaymentStatus;
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login,
        handlers::auth::refresh,
        handlers::auth::logout,
        handlers::registration::register,
        handlers::payment::payment_context,
        handlers::payment::submit_payment,
        handlers::dashboard::dashboard,
        handlers::event::list_events,
        handlers::event::create_event,
        handlers::event::update_event,
        handlers::event::activate_event,
        handlers::draw::list_participants,
        handlers::draw::run_draw,
        handlers::draw::get_winner,
        handlers::admin::create_admin,
        handlers::admin::list_payments,
        handlers::admin::get_user_payments,
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            AuthTokens,
            CreateAdminRequest,
            AdminUserResponse,
            RegistrationRequest,
            RegistrationResponse,
            SubmitPaymentRequest,
            PaymentFlowResponse,
            PaymentContextResponse,
            PaymentRecordResponse,
            PaymentStatus,
            ParticipantPaymentSummary,
            LotteryUserResponse,
            CreateEventRequest,
            UpdateEventRequest,
            EventResponse,
            PaidParticipant,
            WinnerResponse,
            DrawRunResponse,
            UserDashboard,
            DashboardResponse,
            PaginationParams,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "登录/令牌"),
        (name = "registration", description = "注册流程"),
        (name = "payment", description = "支付流程"),
        (name = "dashboard", description = "受保护区域入口"),
        (name = "events", description = "活动管理 (admin)"),
        (name = "draw", description = "开奖 (admin)"),
        (name = "admin", description = "管理员账号与支付明细 (admin)"),
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    );
}
