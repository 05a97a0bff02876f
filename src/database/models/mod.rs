pub mod document;
pub(crate) mod macros;
pub mod notification;
pub mod schedule;
pub mod shift;
pub mod time_off;
pub mod user;

// Re-export all models for easy importing
pub use document::*;
pub use notification::*;
pub use schedule::*;
pub use shift::*;
pub use time_off::*;
pub use user::*;
