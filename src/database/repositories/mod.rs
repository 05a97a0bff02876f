use std::sync::Arc;

use sqlx::PgPool;

use crate::database::memory::MemoryStore;

pub mod document;
pub mod notification;
pub mod schedule;
pub mod shift;
pub mod time_off;
pub mod user;

// Re-export all repositories for easy importing
pub use document::{DocumentRepository, PgDocumentRepository};
pub use notification::{NotificationRepository, PgNotificationRepository};
pub use schedule::{PgScheduleRepository, ScheduleRepository};
pub use shift::{PgShiftRepository, ShiftRepository};
pub use time_off::{PgTimeOffRepository, TimeOffRepository};
pub use user::{PgUserRepository, UserRepository};

/// One handle per storage concern, shared across workers.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub schedules: Arc<dyn ScheduleRepository>,
    pub shifts: Arc<dyn ShiftRepository>,
    pub time_off: Arc<dyn TimeOffRepository>,
    pub documents: Arc<dyn DocumentRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            schedules: Arc::new(PgScheduleRepository::new(pool.clone())),
            shifts: Arc::new(PgShiftRepository::new(pool.clone())),
            time_off: Arc::new(PgTimeOffRepository::new(pool.clone())),
            documents: Arc::new(PgDocumentRepository::new(pool.clone())),
            notifications: Arc::new(PgNotificationRepository::new(pool)),
        }
    }

    /// Every repository backed by the same process-local store.
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::default());
        Self {
            users: store.clone(),
            schedules: store.clone(),
            shifts: store.clone(),
            time_off: store.clone(),
            documents: store.clone(),
            notifications: store,
        }
    }
}
