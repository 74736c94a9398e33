pub mod admin;
pub mod auth;
pub mod dashboard;
pub mod draw;
pub mod event;
pub mod payment;
pub mod registration;

pub use admin::admin_config;
pub use auth::auth_config;
pub use dashboard::dashboard_config;
pub use draw::draw_config;
pub use event::event_config;
pub use payment::payment_config;
pub use registration::registration_config;
