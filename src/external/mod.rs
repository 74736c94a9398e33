pub mod identity;
pub mod mailer;
pub mod stripe;

pub use identity::*;
pub use mailer::*;
pub use stripe::*;
