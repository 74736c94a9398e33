pub mod auth;
pub mod common;
pub mod dashboard;
pub mod draw;
pub mod event;
pub mod pagination;
pub mod payment;
pub mod registration;
pub mod user;

pub use auth::*;
pub use common::*;
pub use dashboard::*;
pub use draw::*;
pub use event::*;
pub use pagination::*;
pub use payment::*;
pub use registration::*;
pub use user::*;
