pub mod health;
pub mod notifications;
pub mod v2;
pub mod ws;
