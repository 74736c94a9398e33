use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter

use lottery_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::{IdentityApi, MailerService, StripeGateway},
    handlers,
    middlewares::{AuthMiddleware, create_cors},
    services::*,
    swagger::swagger_config,
    utils::JwtService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // 创建JWT服务
    let jwt_service = JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expires_in,
        config.jwt.refresh_token_expires_in,
    );

    // 创建外部服务
    let identity_api = IdentityApi::new(config.identity.clone());
    let stripe_gateway = StripeGateway::new(config.stripe.clone());
    let mailer_service = MailerService::new(config.mailer.clone());

    // 创建服务
    let session_service =
        FlowSessionService::new(pool.clone(), config.lottery.session_ttl_minutes);
    let event_service = EventService::new(pool.clone());
    let ledger_service = LedgerService::new(pool.clone());
    let gate_service = GateService::new(
        pool.clone(),
        event_service.clone(),
        ledger_service.clone(),
    );
    let registration_service = RegistrationService::new(
        pool.clone(),
        identity_api.clone(),
        session_service.clone(),
    );
    let payment_service = PaymentService::new(
        stripe_gateway,
        session_service.clone(),
        registration_service.clone(),
        event_service.clone(),
        ledger_service.clone(),
        mailer_service,
    );
    let draw_service = DrawService::new(pool.clone());
    let auth_service = AuthService::new(
        pool.clone(),
        identity_api.clone(),
        jwt_service.clone(),
        gate_service.clone(),
    );

    // 播种引导管理员 (身份服务不可用时记错误, 不阻塞启动)
    if let (Some(email), Some(password)) = (
        config.identity.admin_email.clone(),
        config.identity.admin_password.clone(),
    ) {
        let username = config
            .identity
            .admin_username
            .clone()
            .unwrap_or_else(|| "admin".to_string());
        if let Err(e) = auth_service.seed_admin(&email, &password, &username).await {
            log::error!("Bootstrap admin seeding failed: {:?}", e);
        }
    }

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .wrap(AuthMiddleware::new(jwt_service.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(registration_service.clone()))
            .app_data(web::Data::new(payment_service.clone()))
            .app_data(web::Data::new(event_service.clone()))
            .app_data(web::Data::new(ledger_service.clone()))
            .app_data(web::Data::new(gate_service.clone()))
            .app_data(web::Data::new(draw_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::auth_config)
                    .configure(handlers::registration_config)
                    .configure(handlers::payment_config)
                    .configure(handlers::dashboard_config)
                    // /admin/events 与 /admin/draw 必须先于 /admin 注册,
                    // scope 按注册顺序做前缀匹配
                    .configure(handlers::event_config)
                    .configure(handlers::draw_config)
                    .configure(handlers::admin_config),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
