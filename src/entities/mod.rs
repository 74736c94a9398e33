pub mod flow_sessions;
pub mod lottery_events;
pub mod lottery_users;
pub mod payments;
pub mod winners;

pub use flow_sessions as flow_session_entity;
pub use lottery_events as lottery_event_entity;
pub use lottery_users as lottery_user_entity;
pub use payments as payment_entity;
pub use payments::PaymentStatus;
pub use winners as winner_entity;
