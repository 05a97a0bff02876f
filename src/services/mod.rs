pub mod auth;
pub mod generator;
pub mod grid;
pub mod notification_hub;
pub mod notifier;
pub mod publisher;
pub mod schedule_time;

pub use auth::{AuthService, Claims};
pub use notification_hub::NotificationHub;
pub use notifier::NotificationService;
